//! Add/change forms: typed form data, validation and the field layout
//! handed to the change form template.

use super::display::LIST_DATETIME_FORMAT;
use super::options::ModelAdmin;
use super::{AdminRecord, FieldKind, FieldValue, ModelMeta};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use validator::{Validate, ValidationErrors};

/// Value format of `<input type="datetime-local">`.
pub const INPUT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Field name to error messages.
pub type FormErrors = BTreeMap<String, Vec<String>>;

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ACCEPTED_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn add_error(errors: &mut FormErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_owned())
        .or_default()
        .push(message.into());
}

/// Turns `validator` length failures into admin messages.
fn collect_length_errors(result: Result<(), ValidationErrors>, values: &[(&str, &str)]) -> FormErrors {
    let mut errors = FormErrors::new();
    if let Err(e) = result {
        for (field, _) in e.field_errors() {
            let value = values
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, v)| *v)
                .unwrap_or("");
            if value.trim().is_empty() {
                add_error(&mut errors, field, REQUIRED_MESSAGE);
            } else {
                add_error(
                    &mut errors,
                    field,
                    format!(
                        "Ensure this value has at most 200 characters (it has {}).",
                        value.chars().count()
                    ),
                );
            }
        }
    }
    for (field, value) in values {
        if value.trim().is_empty() && !errors.contains_key(*field) {
            add_error(&mut errors, field, REQUIRED_MESSAGE);
        }
    }
    errors
}

fn parse_required_datetime(errors: &mut FormErrors, field: &str, value: &str) -> Option<NaiveDateTime> {
    if value.trim().is_empty() {
        add_error(errors, field, REQUIRED_MESSAGE);
        return None;
    }
    let parsed = parse_datetime(value);
    if parsed.is_none() {
        add_error(errors, field, "Enter a valid date/time.");
    }
    parsed
}

fn parse_required_int(errors: &mut FormErrors, field: &str, value: &str) -> Option<i32> {
    if value.trim().is_empty() {
        add_error(errors, field, REQUIRED_MESSAGE);
        return None;
    }
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        add_error(errors, field, "Enter a whole number.");
    }
    parsed
}

fn parse_required_fk(errors: &mut FormErrors, field: &str, value: &str) -> Option<i32> {
    if value.trim().is_empty() {
        add_error(errors, field, REQUIRED_MESSAGE);
        return None;
    }
    let parsed = value.trim().parse().ok().filter(|id: &i32| *id > 0);
    if parsed.is_none() {
        add_error(
            errors,
            field,
            "Select a valid choice. That choice is not one of the available choices.",
        );
    }
    parsed
}

/// Submit buttons shared by every change form.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitFlags {
    #[serde(rename = "_continue")]
    pub continue_editing: Option<String>,
    #[serde(rename = "_addanother")]
    pub add_another: Option<String>,
}

/// Author and AuthorClone share this form.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthorForm {
    pub csrf_token: String,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedAuthor {
    pub name: String,
}

impl AuthorForm {
    pub fn clean(&self) -> Result<CleanedAuthor, FormErrors> {
        let errors = collect_length_errors(self.validate(), &[("name", self.name.as_str())]);
        if errors.is_empty() {
            Ok(CleanedAuthor {
                name: self.name.trim().to_owned(),
            })
        } else {
            Err(errors)
        }
    }

    pub fn values(&self) -> HashMap<String, String> {
        HashMap::from([("name".to_owned(), self.name.clone())])
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuestionForm {
    pub csrf_token: String,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub pub_date: String,
    #[serde(default)]
    pub ref_author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedQuestion {
    pub question_text: String,
    pub pub_date: NaiveDateTime,
    pub ref_author_id: i32,
}

impl QuestionForm {
    pub fn clean(&self) -> Result<CleanedQuestion, FormErrors> {
        let mut errors = collect_length_errors(
            self.validate(),
            &[("question_text", self.question_text.as_str())],
        );
        let pub_date = parse_required_datetime(&mut errors, "pub_date", &self.pub_date);
        let ref_author_id = parse_required_fk(&mut errors, "ref_author", &self.ref_author);

        match (pub_date, ref_author_id) {
            (Some(pub_date), Some(ref_author_id)) if errors.is_empty() => Ok(CleanedQuestion {
                question_text: self.question_text.trim().to_owned(),
                pub_date,
                ref_author_id,
            }),
            _ => Err(errors),
        }
    }

    pub fn values(&self) -> HashMap<String, String> {
        HashMap::from([
            ("question_text".to_owned(), self.question_text.clone()),
            ("pub_date".to_owned(), self.pub_date.clone()),
            ("ref_author".to_owned(), self.ref_author.clone()),
        ])
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChoiceForm {
    pub csrf_token: String,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub choice_text: String,
    #[serde(default)]
    pub votes: String,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedChoice {
    pub choice_text: String,
    pub votes: i32,
    pub question_id: i32,
}

impl ChoiceForm {
    pub fn clean(&self) -> Result<CleanedChoice, FormErrors> {
        let mut errors =
            collect_length_errors(self.validate(), &[("choice_text", self.choice_text.as_str())]);
        // Blank votes fall back to the column default.
        let votes = if self.votes.trim().is_empty() {
            Some(0)
        } else {
            parse_required_int(&mut errors, "votes", &self.votes)
        };
        let question_id = parse_required_fk(&mut errors, "question", &self.question);

        match (votes, question_id) {
            (Some(votes), Some(question_id)) if errors.is_empty() => Ok(CleanedChoice {
                choice_text: self.choice_text.trim().to_owned(),
                votes,
                question_id,
            }),
            _ => Err(errors),
        }
    }

    pub fn values(&self) -> HashMap<String, String> {
        HashMap::from([
            ("choice_text".to_owned(), self.choice_text.clone()),
            ("votes".to_owned(), self.votes.clone()),
            ("question".to_owned(), self.question.clone()),
        ])
    }
}

/// Checks one `list_editable` text value against the field's declared length.
pub fn clean_list_editable(meta: &ModelMeta, field: &str, value: &str) -> Result<String, String> {
    let max_length = match meta.field(field).map(|f| f.kind) {
        Some(FieldKind::Char { max_length }) => max_length,
        _ => return Err(format!("{} is not editable", field)),
    };
    let value = value.trim();
    if value.is_empty() {
        return Err(REQUIRED_MESSAGE.to_owned());
    }
    let len = value.chars().count();
    if len > max_length {
        return Err(format!(
            "Ensure this value has at most {} characters (it has {}).",
            max_length, len
        ));
    }
    Ok(value.to_owned())
}

/// Current values of a record, formatted for form inputs.
pub fn record_values<R: AdminRecord>(record: &R) -> HashMap<String, String> {
    R::meta()
        .fields
        .iter()
        .filter_map(|f| {
            record.value(f.name).map(|v| {
                let text = match v {
                    FieldValue::DateTime(dt) => dt.format(INPUT_DATETIME_FORMAT).to_string(),
                    other => other.to_export_string(),
                };
                (f.name.to_owned(), text)
            })
        })
        .collect()
}

/// Readonly values of a record, formatted for display.
pub fn record_display_values<R: AdminRecord>(record: &R) -> HashMap<String, String> {
    R::meta()
        .fields
        .iter()
        .filter_map(|f| {
            record.value(f.name).map(|v| {
                let text = match v {
                    FieldValue::DateTime(dt) => dt.format(LIST_DATETIME_FORMAT).to_string(),
                    other => other.to_export_string(),
                };
                (f.name.to_owned(), text)
            })
        })
        .collect()
}

/// `<option>` of a foreign key select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One field as rendered on the change form.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `number`, `datetime-local`, `select`, `autocomplete` or `readonly`.
    pub input_type: &'static str,
    pub value: String,
    pub max_length: usize,
    pub options: Vec<SelectOption>,
    /// For autocomplete widgets: where to fetch choices from.
    pub autocomplete_url: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FieldsetView {
    pub name: &'static str,
    pub collapse: bool,
    pub fields: Vec<FormField>,
}

/// Inputs needed to lay out a change form.
pub struct FormContext<'a> {
    /// Submitted or stored input values.
    pub values: &'a HashMap<String, String>,
    /// Display text of readonly fields, absent on the add form.
    pub readonly_values: &'a HashMap<String, String>,
    pub errors: &'a FormErrors,
    /// Choices for foreign key fields, keyed by field name.
    pub fk_choices: &'a HashMap<&'static str, Vec<(i32, String)>>,
}

pub fn build_fieldsets(admin: &ModelAdmin, ctx: &FormContext<'_>) -> Vec<FieldsetView> {
    admin
        .fieldsets
        .iter()
        .map(|fieldset| FieldsetView {
            name: fieldset.name,
            collapse: fieldset.collapse,
            fields: fieldset
                .fields
                .iter()
                .filter_map(|name| admin.meta.field(name))
                .map(|field| build_field(admin, field, ctx))
                .collect(),
        })
        .collect()
}

fn build_field(admin: &ModelAdmin, field: &'static super::FieldDef, ctx: &FormContext<'_>) -> FormField {
    let value = ctx.values.get(field.name).cloned().unwrap_or_default();
    let errors = ctx.errors.get(field.name).cloned().unwrap_or_default();
    let mut form_field = FormField {
        name: field.name,
        label: field.verbose_name,
        input_type: "text",
        value,
        max_length: 0,
        options: Vec::new(),
        autocomplete_url: String::new(),
        errors,
    };

    let is_auto = matches!(field.name, "created_date" | "updated_date");
    if admin.is_readonly(field.name) || is_auto {
        form_field.input_type = "readonly";
        form_field.value = ctx
            .readonly_values
            .get(field.name)
            .cloned()
            .unwrap_or_else(|| admin.empty_value_display.to_owned());
        return form_field;
    }

    match field.kind {
        FieldKind::Char { max_length } => {
            form_field.max_length = max_length;
        }
        FieldKind::Integer => form_field.input_type = "number",
        FieldKind::DateTime => form_field.input_type = "datetime-local",
        FieldKind::ForeignKey { .. } => {
            let choices = ctx.fk_choices.get(field.name);
            let selected = |id: &i32| form_field.value == id.to_string();
            let options: Vec<SelectOption> = choices
                .map(|c| {
                    c.iter()
                        .map(|(id, label)| SelectOption {
                            value: id.to_string(),
                            label: label.clone(),
                            selected: selected(id),
                        })
                        .collect()
                })
                .unwrap_or_default();
            form_field.options = options;
            if admin.uses_autocomplete(field.name) {
                form_field.input_type = "autocomplete";
                form_field.autocomplete_url = format!(
                    "/admin/autocomplete/?app_label={}&model_name={}&field_name={}",
                    admin.meta.app_label, admin.meta.model_name, field.name
                );
            } else {
                form_field.input_type = "select";
            }
        }
        FieldKind::AutoPk => form_field.input_type = "readonly",
    }

    form_field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::options::Fieldset;
    use crate::admin::QUESTION_META;

    #[test]
    fn test_parse_datetime_formats() {
        for input in [
            "2023-01-01T10:00",
            "2023-01-01T10:00:00",
            "2023-01-01 10:00",
            " 2023-01-01 10:00:00 ",
        ] {
            assert_eq!(
                parse_datetime(input).unwrap().to_string(),
                "2023-01-01 10:00:00",
                "input {:?}",
                input
            );
        }
        assert!(parse_datetime("01/01/2023 10:00").is_none());
    }

    #[test]
    fn test_author_form_requires_name() {
        for name in ["", "   "] {
            let form = AuthorForm {
                csrf_token: String::new(),
                name: name.to_string(),
            };
            let errors = form.clean().unwrap_err();
            assert_eq!(errors["name"], vec![REQUIRED_MESSAGE.to_string()]);
        }
    }

    #[test]
    fn test_author_form_too_long() {
        let form = AuthorForm {
            csrf_token: String::new(),
            name: "x".repeat(201),
        };
        let errors = form.clean().unwrap_err();
        assert!(errors["name"][0].contains("at most 200 characters (it has 201)"));
    }

    #[test]
    fn test_question_form_collects_every_error() {
        let form = QuestionForm {
            csrf_token: String::new(),
            question_text: String::new(),
            pub_date: "yesterday".to_string(),
            ref_author: "abc".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["pub_date", "question_text", "ref_author"]
        );
    }

    #[test]
    fn test_question_form_clean() {
        let form = QuestionForm {
            csrf_token: String::new(),
            question_text: " Test? ".to_string(),
            pub_date: "2023-01-01T10:00".to_string(),
            ref_author: "4".to_string(),
        };
        let cleaned = form.clean().unwrap();
        assert_eq!(cleaned.question_text, "Test?");
        assert_eq!(cleaned.ref_author_id, 4);
        assert_eq!(cleaned.pub_date.to_string(), "2023-01-01 10:00:00");
    }

    #[test]
    fn test_choice_form_blank_votes_default_to_zero() {
        let form = ChoiceForm {
            csrf_token: String::new(),
            choice_text: "Yes".to_string(),
            votes: String::new(),
            question: "1".to_string(),
        };
        assert_eq!(form.clean().unwrap().votes, 0);

        let form = ChoiceForm {
            votes: "many".to_string(),
            ..form
        };
        assert_eq!(
            form.clean().unwrap_err()["votes"],
            vec!["Enter a whole number.".to_string()]
        );
    }

    #[test]
    fn test_clean_list_editable() {
        assert_eq!(
            clean_list_editable(&QUESTION_META, "question_text", " Why? "),
            Ok("Why?".to_string())
        );
        assert_eq!(
            clean_list_editable(&QUESTION_META, "question_text", ""),
            Err(REQUIRED_MESSAGE.to_string())
        );
        assert!(clean_list_editable(&QUESTION_META, "pub_date", "x").is_err());
    }

    #[test]
    fn test_build_fieldsets_widgets() {
        let admin = ModelAdmin {
            fieldsets: vec![
                Fieldset::new("Question information", vec!["question_text", "pub_date"]),
                Fieldset::new("The author", vec!["ref_author"]).collapsed(),
            ],
            autocomplete_fields: vec!["ref_author"],
            ..ModelAdmin::new(&QUESTION_META)
        };
        let values = HashMap::from([("ref_author".to_string(), "2".to_string())]);
        let readonly = HashMap::new();
        let errors = FormErrors::new();
        let fk_choices = HashMap::from([(
            "ref_author",
            vec![(1, "jane".to_string()), (2, "john".to_string())],
        )]);
        let ctx = FormContext {
            values: &values,
            readonly_values: &readonly,
            errors: &errors,
            fk_choices: &fk_choices,
        };

        let fieldsets = build_fieldsets(&admin, &ctx);
        assert_eq!(fieldsets.len(), 2);
        assert_eq!(fieldsets[0].fields[0].input_type, "text");
        assert_eq!(fieldsets[0].fields[0].max_length, 200);
        assert_eq!(fieldsets[0].fields[1].input_type, "datetime-local");
        assert!(fieldsets[1].collapse);

        let author = &fieldsets[1].fields[0];
        assert_eq!(author.input_type, "autocomplete");
        assert!(author.autocomplete_url.contains("field_name=ref_author"));
        assert!(author.options[1].selected);
        assert!(!author.options[0].selected);
    }
}
