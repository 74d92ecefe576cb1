//! Declarative per-model admin configuration.
//!
//! A `ModelAdmin` is plain data. Handlers and the store read it to decide
//! what to list, search, filter and which actions to offer:
//!
//! ```rust,ignore
//! let admin = ModelAdmin {
//!     list_display: vec!["name", "created_date"],
//!     search_fields: vec!["name"],
//!     ..ModelAdmin::new(&AUTHOR_META)
//! };
//! ```

use super::filters::ListFilter;
use super::ModelMeta;

/// A titled group of fields on the change form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fieldset {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
    /// Rendered folded until the user expands it.
    pub collapse: bool,
}

impl Fieldset {
    pub fn new(name: &'static str, fields: Vec<&'static str>) -> Self {
        Self {
            name,
            fields,
            collapse: false,
        }
    }

    pub fn collapsed(mut self) -> Self {
        self.collapse = true;
        self
    }
}

/// Child records listed on the parent's change page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InlineAdmin {
    pub model: &'static ModelMeta,
    /// Foreign key on the child pointing at the parent.
    pub fk_name: &'static str,
}

/// Bulk actions available on a changelist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    DeleteSelected,
    MakePublished,
    ExportToCsv,
    MakePublishedCustom,
}

impl Action {
    /// Form value of the `action` select.
    pub fn name(&self) -> &'static str {
        match self {
            Action::DeleteSelected => "delete_selected",
            Action::MakePublished => "make_published",
            Action::ExportToCsv => "export_to_csv",
            Action::MakePublishedCustom => "make_published_custom",
        }
    }

    pub fn description(&self, meta: &ModelMeta) -> String {
        match self {
            Action::DeleteSelected => format!("Delete selected {}", meta.verbose_name_plural),
            Action::MakePublished => "Mark selected questions as published".to_string(),
            Action::ExportToCsv => "Export to CSV".to_string(),
            Action::MakePublishedCustom => "Make published custom".to_string(),
        }
    }
}

/// Restricts the records an admin sees at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryScope {
    NameStartsWith(&'static str),
}

/// Admin options for one registered model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelAdmin {
    pub meta: &'static ModelMeta,
    pub fieldsets: Vec<Fieldset>,
    pub list_display: Vec<&'static str>,
    pub list_display_links: Vec<&'static str>,
    pub list_editable: Vec<&'static str>,
    pub list_filter: Vec<ListFilter>,
    pub list_select_related: Vec<&'static str>,
    pub search_fields: Vec<&'static str>,
    pub readonly_fields: Vec<&'static str>,
    pub autocomplete_fields: Vec<&'static str>,
    pub date_hierarchy: Option<&'static str>,
    pub inlines: Vec<InlineAdmin>,
    pub actions: Vec<Action>,
    pub empty_value_display: &'static str,
    pub list_per_page: Option<u64>,
    pub scope: Option<QueryScope>,
}

impl ModelAdmin {
    /// Defaults: every non-pk field in one unnamed fieldset, `__str__`-like
    /// single column, delete action only.
    pub fn new(meta: &'static ModelMeta) -> Self {
        let fields: Vec<&'static str> = meta
            .fields
            .iter()
            .filter(|f| f.kind != super::FieldKind::AutoPk)
            .map(|f| f.name)
            .collect();
        Self {
            meta,
            fieldsets: vec![Fieldset::new("", fields)],
            list_display: vec!["__str__"],
            list_display_links: Vec::new(),
            list_editable: Vec::new(),
            list_filter: Vec::new(),
            list_select_related: Vec::new(),
            search_fields: Vec::new(),
            readonly_fields: Vec::new(),
            autocomplete_fields: Vec::new(),
            date_hierarchy: None,
            inlines: Vec::new(),
            actions: Vec::new(),
            empty_value_display: "-",
            list_per_page: None,
            scope: None,
        }
    }

    /// The delete action is always offered first, then the configured ones.
    pub fn available_actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::DeleteSelected];
        actions.extend(
            self.actions
                .iter()
                .copied()
                .filter(|a| *a != Action::DeleteSelected),
        );
        actions
    }

    pub fn action(&self, name: &str) -> Option<Action> {
        self.available_actions()
            .into_iter()
            .find(|a| a.name() == name)
    }

    /// Columns that link to the change page. Defaults to the first column.
    pub fn is_link_column(&self, column: &str) -> bool {
        if self.list_display_links.is_empty() {
            self.list_display.first() == Some(&column)
        } else {
            self.list_display_links.contains(&column)
        }
    }

    pub fn is_readonly(&self, field: &str) -> bool {
        self.readonly_fields.contains(&field)
    }

    pub fn is_editable_in_list(&self, column: &str) -> bool {
        self.list_editable.contains(&column)
    }

    pub fn uses_autocomplete(&self, field: &str) -> bool {
        self.autocomplete_fields.contains(&field)
    }
}
