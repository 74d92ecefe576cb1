//! Admin runtime for the sample_app models.
//!
//! Model metadata lives here; the declarative per-model configuration is in
//! [`options`], the registry in [`site`], and the queries behind the admin
//! pages in [`store`].

pub mod actions;
pub mod display;
pub mod export;
pub mod filters;
pub mod forms;
pub mod options;
pub mod site;
pub mod store;

use crate::orm::{author_clones, authors, choices, questions};
use chrono::NaiveDateTime;

/// Storage kind of a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    AutoPk,
    Char { max_length: usize },
    Integer,
    DateTime,
    ForeignKey { to: &'static str },
}

/// One declared field of a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    /// Scalar fields carry a value of their own: not the primary key, not a relation.
    pub fn is_scalar(&self) -> bool {
        !matches!(self.kind, FieldKind::AutoPk | FieldKind::ForeignKey { .. })
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::ForeignKey { .. })
    }
}

/// Static description of a record type, in declared field order.
#[derive(Debug, PartialEq, Eq)]
pub struct ModelMeta {
    pub app_label: &'static str,
    pub model_name: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub fields: &'static [FieldDef],
}

impl ModelMeta {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields written by the CSV export, in declared order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.is_scalar())
    }

    /// `/admin/<app_label>/<model_name>/`
    pub fn changelist_url(&self) -> String {
        format!("/admin/{}/{}/", self.app_label, self.model_name)
    }

    pub fn change_url(&self, pk: i32) -> String {
        format!("/admin/{}/{}/{}/change/", self.app_label, self.model_name, pk)
    }

    pub fn add_url(&self) -> String {
        format!("/admin/{}/{}/add/", self.app_label, self.model_name)
    }
}

/// A field value read off a record.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Export rendering; datetimes as `DD/MM/YYYY HH:MM`.
    pub fn to_export_string(&self) -> String {
        match self {
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::DateTime(dt) => dt.format(EXPORT_DATETIME_FORMAT).to_string(),
        }
    }
}

pub const EXPORT_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Record types the admin can read generically.
pub trait AdminRecord {
    fn meta() -> &'static ModelMeta;
    fn pk(&self) -> i32;
    /// Value of a declared field, `None` for unknown names.
    fn value(&self, field: &str) -> Option<FieldValue>;
    /// Human label of the record, used for links and `__str__` columns.
    fn label(&self) -> String;
}

const NAME_AND_DATES: [FieldDef; 4] = [
    FieldDef {
        name: "id",
        verbose_name: "ID",
        kind: FieldKind::AutoPk,
    },
    FieldDef {
        name: "name",
        verbose_name: "name",
        kind: FieldKind::Char { max_length: 200 },
    },
    FieldDef {
        name: "created_date",
        verbose_name: "created date",
        kind: FieldKind::DateTime,
    },
    FieldDef {
        name: "updated_date",
        verbose_name: "updated date",
        kind: FieldKind::DateTime,
    },
];

pub static AUTHOR_META: ModelMeta = ModelMeta {
    app_label: "sample_app",
    model_name: "author",
    verbose_name: "author",
    verbose_name_plural: "authors",
    fields: &NAME_AND_DATES,
};

pub static AUTHOR_CLONE_META: ModelMeta = ModelMeta {
    app_label: "sample_app",
    model_name: "authorclone",
    verbose_name: "author clone",
    verbose_name_plural: "author clones",
    fields: &NAME_AND_DATES,
};

pub static QUESTION_META: ModelMeta = ModelMeta {
    app_label: "sample_app",
    model_name: "question",
    verbose_name: "question",
    verbose_name_plural: "questions",
    fields: &[
        FieldDef {
            name: "id",
            verbose_name: "ID",
            kind: FieldKind::AutoPk,
        },
        FieldDef {
            name: "question_text",
            verbose_name: "question text",
            kind: FieldKind::Char { max_length: 200 },
        },
        FieldDef {
            name: "pub_date",
            verbose_name: "date published",
            kind: FieldKind::DateTime,
        },
        FieldDef {
            name: "created_date",
            verbose_name: "created date",
            kind: FieldKind::DateTime,
        },
        FieldDef {
            name: "updated_date",
            verbose_name: "updated date",
            kind: FieldKind::DateTime,
        },
        FieldDef {
            name: "ref_author",
            verbose_name: "ref author",
            kind: FieldKind::ForeignKey { to: "author" },
        },
    ],
};

pub static CHOICE_META: ModelMeta = ModelMeta {
    app_label: "sample_app",
    model_name: "choice",
    verbose_name: "choice",
    verbose_name_plural: "choices",
    fields: &[
        FieldDef {
            name: "id",
            verbose_name: "ID",
            kind: FieldKind::AutoPk,
        },
        FieldDef {
            name: "choice_text",
            verbose_name: "choice text",
            kind: FieldKind::Char { max_length: 200 },
        },
        FieldDef {
            name: "votes",
            verbose_name: "votes",
            kind: FieldKind::Integer,
        },
        FieldDef {
            name: "created_date",
            verbose_name: "created date",
            kind: FieldKind::DateTime,
        },
        FieldDef {
            name: "updated_date",
            verbose_name: "updated date",
            kind: FieldKind::DateTime,
        },
        FieldDef {
            name: "question",
            verbose_name: "question",
            kind: FieldKind::ForeignKey { to: "question" },
        },
    ],
};

impl AdminRecord for authors::Model {
    fn meta() -> &'static ModelMeta {
        &AUTHOR_META
    }

    fn pk(&self) -> i32 {
        self.id
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Int(self.id.into())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "created_date" => Some(FieldValue::DateTime(self.created_date)),
            "updated_date" => Some(FieldValue::DateTime(self.updated_date)),
            _ => None,
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl AdminRecord for author_clones::Model {
    fn meta() -> &'static ModelMeta {
        &AUTHOR_CLONE_META
    }

    fn pk(&self) -> i32 {
        self.id
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Int(self.id.into())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "created_date" => Some(FieldValue::DateTime(self.created_date)),
            "updated_date" => Some(FieldValue::DateTime(self.updated_date)),
            _ => None,
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl AdminRecord for questions::Model {
    fn meta() -> &'static ModelMeta {
        &QUESTION_META
    }

    fn pk(&self) -> i32 {
        self.id
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Int(self.id.into())),
            "question_text" => Some(FieldValue::Text(self.question_text.clone())),
            "pub_date" => Some(FieldValue::DateTime(self.pub_date)),
            "created_date" => Some(FieldValue::DateTime(self.created_date)),
            "updated_date" => Some(FieldValue::DateTime(self.updated_date)),
            "ref_author" => Some(FieldValue::Int(self.ref_author_id.into())),
            _ => None,
        }
    }

    fn label(&self) -> String {
        self.question_text.clone()
    }
}

impl AdminRecord for choices::Model {
    fn meta() -> &'static ModelMeta {
        &CHOICE_META
    }

    fn pk(&self) -> i32 {
        self.id
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Int(self.id.into())),
            "choice_text" => Some(FieldValue::Text(self.choice_text.clone())),
            "votes" => Some(FieldValue::Int(self.votes.into())),
            "created_date" => Some(FieldValue::DateTime(self.created_date)),
            "updated_date" => Some(FieldValue::DateTime(self.updated_date)),
            "question" => Some(FieldValue::Int(self.question_id.into())),
            _ => None,
        }
    }

    fn label(&self) -> String {
        self.choice_text.clone()
    }
}

/// The four record types of sample_app, for `match`-based dispatch in handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Author,
    Question,
    Choice,
    AuthorClone,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Author,
        ModelKind::Question,
        ModelKind::Choice,
        ModelKind::AuthorClone,
    ];

    pub fn meta(self) -> &'static ModelMeta {
        match self {
            ModelKind::Author => &AUTHOR_META,
            ModelKind::Question => &QUESTION_META,
            ModelKind::Choice => &CHOICE_META,
            ModelKind::AuthorClone => &AUTHOR_CLONE_META,
        }
    }

    pub fn from_path(app_label: &str, model_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            let meta = kind.meta();
            meta.app_label == app_label && meta.model_name == model_name
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_scalar_fields_skip_pk_and_relations() {
        let names: Vec<&str> = QUESTION_META.scalar_fields().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["question_text", "pub_date", "created_date", "updated_date"]
        );

        let names: Vec<&str> = CHOICE_META.scalar_fields().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["choice_text", "votes", "created_date", "updated_date"]
        );
    }

    #[test]
    fn test_export_datetime_format() {
        let dt = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            FieldValue::DateTime(dt).to_export_string(),
            "01/01/2023 10:00"
        );
    }

    #[test]
    fn test_model_kind_from_path() {
        assert_eq!(
            ModelKind::from_path("sample_app", "authorclone"),
            Some(ModelKind::AuthorClone)
        );
        assert_eq!(ModelKind::from_path("auth", "user"), None);
        assert_eq!(ModelKind::from_path("sample_app", "poll"), None);
    }

    #[test]
    fn test_urls() {
        assert_eq!(QUESTION_META.changelist_url(), "/admin/sample_app/question/");
        assert_eq!(
            CHOICE_META.change_url(7),
            "/admin/sample_app/choice/7/change/"
        );
    }
}
