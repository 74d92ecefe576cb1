//! Changelist cell rendering and the computed display columns.

use crate::orm::questions;
use chrono::NaiveDateTime;

/// Format used for datetimes on admin pages.
pub const LIST_DATETIME_FORMAT: &str = "%b %-d, %Y, %H:%M";

/// One rendered changelist cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    /// Markup produced by this crate, emitted unescaped.
    Html(String),
    Bool(bool),
    /// A `list_editable` text input named `form-<pk>-<field>`.
    Editable { name: String, value: String },
    Empty,
}

impl Cell {
    pub fn datetime(dt: NaiveDateTime) -> Self {
        Cell::Text(dt.format(LIST_DATETIME_FORMAT).to_string())
    }

    pub fn text_or_empty(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Cell::Text(v),
            _ => Cell::Empty,
        }
    }
}

/// Header and the "Choices" link column on the question changelist.
pub const GO_TO_CHOICES_LABEL: &str = "Choices";

/// Link to the choice changelist filtered by this question.
pub fn go_to_choices(question: &questions::Model) -> String {
    format!(
        "<a class=\"button\" href=\"/admin/sample_app/choice/?question__id__exact={}\" target=\"blank\">Choices</a>&nbsp;",
        question.id
    )
}

pub const HAS_BEEN_PUBLISHED_LABEL: &str = "Published?";

/// Compares calendar dates only, so a question published earlier today is not yet "published".
pub fn has_been_published(question: &questions::Model, now: NaiveDateTime) -> bool {
    question.pub_date.date() < now.date()
}
