//! Bulk actions run against the selected records of a changelist.

use super::ModelKind;
use crate::orm::{author_clones, authors, choices, questions};
use chrono::{Duration, NaiveDateTime};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};

/// Publication timestamp written by the publish actions: one day before `now`.
pub fn published_timestamp(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::days(1)
}

/// Sets `pub_date` of the selected questions to a day before `now` in one
/// batch update. Returns the number of rows changed.
pub async fn make_published<C>(db: &C, ids: &[i32], now: NaiveDateTime) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let result = questions::Entity::update_many()
        .col_expr(
            questions::Column::PubDate,
            Expr::value(published_timestamp(now)),
        )
        .filter(questions::Column::Id.is_in(ids.to_vec()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// State of the publish-with-confirmation action for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Render the confirmation page; nothing is changed.
    Prompt,
    /// Apply the change and redirect back.
    Confirmed,
}

impl Confirmation {
    /// The confirmation page posts back with an `apply` field.
    pub fn from_apply_flag(apply: bool) -> Self {
        if apply {
            Confirmation::Confirmed
        } else {
            Confirmation::Prompt
        }
    }
}

/// Message shown after the confirmed publish action.
pub fn published_message(count: u64) -> String {
    format!("Changed to published on {} questions", count)
}

/// Message shown after the plain publish action.
pub fn marked_published_message(count: u64) -> String {
    match count {
        1 => "1 question was successfully marked as published.".to_owned(),
        n => format!("{} questions were successfully marked as published.", n),
    }
}

pub fn deleted_message(count: u64, verbose_name_plural: &str) -> String {
    format!("Successfully deleted {} {}.", count, verbose_name_plural)
}

pub const NO_SELECTION_MESSAGE: &str =
    "Items must be selected in order to perform actions on them. No items have been changed.";

pub const NO_ACTION_MESSAGE: &str = "No action selected.";

/// Dependent rows removed along with a deletion, per related model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub questions: u64,
    pub choices: u64,
}

async fn question_ids_of_authors<C: ConnectionTrait>(
    db: &C,
    author_ids: &[i32],
) -> Result<Vec<i32>, DbErr> {
    let rows = questions::Entity::find()
        .filter(questions::Column::RefAuthorId.is_in(author_ids.to_vec()))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|q| q.id).collect())
}

/// Counts what `delete_selected` would remove besides the records themselves.
pub async fn deletion_summary(
    db: &DatabaseConnection,
    kind: ModelKind,
    ids: &[i32],
) -> Result<DeletionSummary, DbErr> {
    let question_ids = match kind {
        ModelKind::Author => question_ids_of_authors(db, ids).await?,
        ModelKind::Question => ids.to_vec(),
        ModelKind::Choice | ModelKind::AuthorClone => return Ok(DeletionSummary::default()),
    };

    let choice_count = if question_ids.is_empty() {
        0
    } else {
        choices::Entity::find()
            .filter(choices::Column::QuestionId.is_in(question_ids.clone()))
            .count(db)
            .await? as u64
    };

    let question_count = if kind == ModelKind::Author {
        question_ids.len() as u64
    } else {
        0
    };

    Ok(DeletionSummary {
        questions: question_count,
        choices: choice_count,
    })
}

/// Deletes the selected records and their dependents in one transaction.
/// Returns the number of selected records removed.
pub async fn delete_selected(
    db: &DatabaseConnection,
    kind: ModelKind,
    ids: &[i32],
) -> Result<u64, DbErr> {
    if ids.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;

    let deleted = match kind {
        ModelKind::Author => {
            let question_ids = question_ids_of_authors(&txn, ids).await?;
            if !question_ids.is_empty() {
                delete_choices_of(&txn, &question_ids).await?;
                questions::Entity::delete_many()
                    .filter(questions::Column::Id.is_in(question_ids))
                    .exec(&txn)
                    .await?;
            }
            authors::Entity::delete_many()
                .filter(authors::Column::Id.is_in(ids.to_vec()))
                .exec(&txn)
                .await?
        }
        ModelKind::Question => {
            delete_choices_of(&txn, ids).await?;
            questions::Entity::delete_many()
                .filter(questions::Column::Id.is_in(ids.to_vec()))
                .exec(&txn)
                .await?
        }
        ModelKind::Choice => {
            choices::Entity::delete_many()
                .filter(choices::Column::Id.is_in(ids.to_vec()))
                .exec(&txn)
                .await?
        }
        ModelKind::AuthorClone => {
            author_clones::Entity::delete_many()
                .filter(author_clones::Column::Id.is_in(ids.to_vec()))
                .exec(&txn)
                .await?
        }
    };

    txn.commit().await?;

    Ok(deleted.rows_affected)
}

async fn delete_choices_of<C: ConnectionTrait>(db: &C, question_ids: &[i32]) -> Result<(), DbErr> {
    if question_ids.is_empty() {
        return Ok(());
    }
    choices::Entity::delete_many()
        .filter(choices::Column::QuestionId.is_in(question_ids.to_vec()))
        .exec(db)
        .await?;
    Ok(())
}

/// Distinct, positive ids parsed from `_selected_action` values.
pub fn parse_selection<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<i32> {
    let mut ids: Vec<i32> = values
        .into_iter()
        .filter_map(|v| v.trim().parse().ok())
        .filter(|id| *id > 0)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
