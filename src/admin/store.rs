//! Queries behind the admin pages.
//!
//! Everything here dispatches on [`ModelKind`] and reads the declarative
//! [`ModelAdmin`] to decide which search fields, filters and columns apply.

use super::display::{self, Cell};
use super::export::{export_to_csv, CsvExport};
use super::filters::{DateDrilldown, ListFilter, PublishedState, PUBLISHED_LOOKUPS};
use super::forms::{self, CleanedAuthor, CleanedChoice, CleanedQuestion};
use super::options::{InlineAdmin, ModelAdmin, QueryScope};
use super::{AdminRecord, FieldValue, ModelKind};
use crate::orm::{author_clones, authors, choices, questions};
use chrono::NaiveDateTime;
use sea_orm::{
    entity::*,
    query::*,
    sea_query::{Expr, SimpleExpr},
    Condition, DatabaseConnection, DbErr, JoinType, PaginatorTrait,
};
use std::collections::HashMap;
use std::fmt;

/// Query parameters that are not list filters.
const RESERVED_PARAMS: [&str; 2] = ["p", "q"];

#[derive(Debug)]
pub enum ExportError {
    Db(DbErr),
    Csv(csv::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Db(e) => write!(f, "database error: {}", e),
            ExportError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<DbErr> for ExportError {
    fn from(e: DbErr) -> Self {
        ExportError::Db(e)
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e)
    }
}

/// A changelist cell plus the change page it links to, if any.
#[derive(Debug, Clone)]
pub struct RowCell {
    pub cell: Cell,
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChangeRow {
    pub pk: i32,
    pub cells: Vec<RowCell>,
}

#[derive(Debug, Clone)]
pub struct FilterChoice {
    pub label: String,
    pub query_string: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct FilterView {
    pub title: &'static str,
    pub choices: Vec<FilterChoice>,
}

#[derive(Debug, Clone)]
pub struct DateLink {
    pub label: String,
    pub query_string: String,
}

/// Everything the changelist template shows.
#[derive(Debug, Clone)]
pub struct ChangeList {
    pub headers: Vec<String>,
    pub rows: Vec<ChangeRow>,
    /// Rows matching search and filters.
    pub result_count: u64,
    /// Rows visible to this admin at all.
    pub full_count: u64,
    pub page: u64,
    pub page_count: u64,
    pub search: String,
    pub filters: Vec<FilterView>,
    pub date_back: Option<DateLink>,
    pub date_links: Vec<DateLink>,
    /// Current query string without the page number.
    pub base_query: String,
}

/// Query string for `params` with `key` set to `value` (or removed), page reset.
pub fn query_with(params: &HashMap<String, String>, key: &str, value: Option<&str>) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != key && k.as_str() != "p")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    if let Some(value) = value {
        pairs.push((key, value));
    }
    pairs.sort_unstable();
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

fn query_without(params: &HashMap<String, String>, keys: &[String]) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "p" && !keys.contains(k))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_unstable();
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn column_header(admin: &ModelAdmin, column: &str) -> String {
    match column {
        "__str__" => capfirst(admin.meta.verbose_name),
        "go_to_choices" => display::GO_TO_CHOICES_LABEL.to_owned(),
        "has_been_published" => display::HAS_BEEN_PUBLISHED_LABEL.to_owned(),
        field => admin
            .meta
            .field(field)
            .map(|f| capfirst(f.verbose_name))
            .unwrap_or_else(|| capfirst(&field.replace('_', " "))),
    }
}

/// Cells every record type can render from its own fields.
fn generic_cell<R: AdminRecord>(admin: &ModelAdmin, record: &R, column: &str) -> Cell {
    if column == "__str__" {
        return Cell::text_or_empty(Some(record.label()));
    }
    match record.value(column) {
        Some(FieldValue::DateTime(dt)) => Cell::datetime(dt),
        Some(FieldValue::Text(text)) if admin.is_editable_in_list(column) => Cell::Editable {
            name: format!("form-{}-{}", record.pk(), column),
            value: text,
        },
        Some(v) => Cell::text_or_empty(Some(v.to_export_string())),
        None => Cell::Empty,
    }
}

fn build_row<R: AdminRecord>(
    admin: &ModelAdmin,
    record: &R,
    special: impl Fn(&str) -> Option<Cell>,
) -> ChangeRow {
    let cells = admin
        .list_display
        .iter()
        .map(|column| {
            let cell = special(column).unwrap_or_else(|| generic_cell(admin, record, column));
            let editable = matches!(cell, Cell::Editable { .. });
            let link = if admin.is_link_column(column) && !editable {
                Some(admin.meta.change_url(record.pk()))
            } else {
                None
            };
            RowCell { cell, link }
        })
        .collect();
    ChangeRow {
        pk: record.pk(),
        cells,
    }
}

const LIKE_ESCAPE: char = '!';

/// Escapes the `LIKE` wildcards of a search term with [`LIKE_ESCAPE`].
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `"table"."column" LIKE '%term%'` with the term taken literally.
fn contains_literal(table: &str, column: &str, term: &str) -> SimpleExpr {
    Expr::cust_with_values(
        &format!(
            r#""{}"."{}" LIKE ? ESCAPE '{}'"#,
            table, column, LIKE_ESCAPE
        ),
        vec![format!("%{}%", escape_like(term))],
    )
}

fn search_condition(kind: ModelKind, field: &str, term: &str) -> Option<Condition> {
    let cond = match (kind, field) {
        (ModelKind::Author, "name") => contains_literal("authors", "name", term),
        (ModelKind::AuthorClone, "name") => contains_literal("author_clones", "name", term),
        (ModelKind::Question, "question_text") => {
            contains_literal("questions", "question_text", term)
        }
        (ModelKind::Question, "ref_author__name") => contains_literal("authors", "name", term),
        (ModelKind::Choice, "choice_text") => contains_literal("choices", "choice_text", term),
        (ModelKind::Choice, "question__question_text") => {
            contains_literal("questions", "question_text", term)
        }
        (ModelKind::Choice, "question__ref_author__name") => {
            contains_literal("authors", "name", term)
        }
        _ => {
            log::warn!("Unsupported search field {:?} on {:?}", field, kind);
            return None;
        }
    };
    Some(Condition::all().add(cond))
}

fn related_filter_condition(kind: ModelKind, parameter: &str, id: i32) -> Option<Condition> {
    let cond = match (kind, parameter) {
        (ModelKind::Question, "ref_author__id__exact") => questions::Column::RefAuthorId.eq(id),
        (ModelKind::Choice, "question__ref_author__id__exact") => {
            questions::Column::RefAuthorId.eq(id)
        }
        (ModelKind::Choice, "question__id__exact") => choices::Column::QuestionId.eq(id),
        _ => return None,
    };
    Some(Condition::all().add(cond))
}

fn scope_condition(kind: ModelKind, scope: Option<QueryScope>) -> Condition {
    match (kind, scope) {
        (ModelKind::Author, Some(QueryScope::NameStartsWith(prefix))) => {
            Condition::all().add(authors::Column::Name.starts_with(prefix))
        }
        (ModelKind::AuthorClone, Some(QueryScope::NameStartsWith(prefix))) => {
            Condition::all().add(author_clones::Column::Name.starts_with(prefix))
        }
        _ => Condition::all(),
    }
}

/// Parameters understood as filters even without a sidebar entry.
fn implicit_filters(kind: ModelKind) -> &'static [&'static str] {
    match kind {
        ModelKind::Choice => &["question__id__exact"],
        _ => &[],
    }
}

/// Conditions from search, filters and date drill-down (scope excluded).
fn list_condition(
    kind: ModelKind,
    admin: &ModelAdmin,
    params: &HashMap<String, String>,
    now: NaiveDateTime,
    with_dates: bool,
) -> Condition {
    let mut cond = Condition::all();

    let term = params.get("q").map(|q| q.trim()).unwrap_or("");
    if !term.is_empty() && !admin.search_fields.is_empty() {
        let mut any = Condition::any();
        for field in &admin.search_fields {
            if let Some(c) = search_condition(kind, field, term) {
                any = any.add(c);
            }
        }
        cond = cond.add(any);
    }

    for filter in &admin.list_filter {
        let value = params.get(filter.parameter_name()).map(String::as_str);
        match filter {
            ListFilter::Published => {
                if let Some(state) = PublishedState::from_selector(value) {
                    cond = cond.add(state.condition(now));
                }
            }
            ListFilter::Related { parameter_name, .. } => {
                if let Some(id) = value.and_then(|v| v.parse().ok()) {
                    if let Some(c) = related_filter_condition(kind, parameter_name, id) {
                        cond = cond.add(c);
                    }
                }
            }
        }
    }

    for parameter in implicit_filters(kind) {
        if let Some(id) = params.get(*parameter).and_then(|v| v.parse().ok()) {
            if let Some(c) = related_filter_condition(kind, parameter, id) {
                cond = cond.add(c);
            }
        }
    }

    if with_dates && kind == ModelKind::Question && admin.date_hierarchy == Some("pub_date") {
        if let Some((start, end)) = DateDrilldown::from_params("pub_date", params).range() {
            cond = cond
                .add(questions::Column::PubDate.gte(start))
                .add(questions::Column::PubDate.lt(end));
        }
    }

    cond
}

async fn author_choices(db: &DatabaseConnection) -> Result<Vec<(i32, String)>, DbErr> {
    Ok(authors::Entity::find()
        .order_by_asc(authors::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect())
}

async fn filter_views(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
    params: &HashMap<String, String>,
) -> Result<Vec<FilterView>, DbErr> {
    let mut views = Vec::new();
    for filter in &admin.list_filter {
        let parameter = filter.parameter_name();
        let current = params.get(parameter).map(String::as_str);
        let mut choices = vec![FilterChoice {
            label: "All".to_owned(),
            query_string: query_with(params, parameter, None),
            selected: current.is_none(),
        }];

        let lookups: Vec<(String, String)> = match filter {
            ListFilter::Published => PUBLISHED_LOOKUPS
                .iter()
                .map(|(value, label)| (value.to_string(), label.to_string()))
                .collect(),
            ListFilter::Related { .. } => author_choices(db)
                .await?
                .into_iter()
                .map(|(id, name)| (id.to_string(), name))
                .collect(),
        };

        for (value, label) in lookups {
            choices.push(FilterChoice {
                selected: current == Some(value.as_str()),
                query_string: query_with(params, parameter, Some(&value)),
                label,
            });
        }

        views.push(FilterView {
            title: filter.title(),
            choices,
        });
    }
    Ok(views)
}

fn date_navigation(
    params: &HashMap<String, String>,
    dates: &[NaiveDateTime],
) -> (Option<DateLink>, Vec<DateLink>) {
    let drill = DateDrilldown::from_params("pub_date", params);
    fn keys(suffixes: &[&str]) -> Vec<String> {
        suffixes
            .iter()
            .map(|s| format!("pub_date__{}", s))
            .collect()
    }

    let back = match (drill.year, drill.month, drill.day) {
        (None, _, _) => None,
        (Some(_), None, _) => Some(DateLink {
            label: "All dates".to_owned(),
            query_string: query_without(params, &keys(&["year", "month", "day"])),
        }),
        (Some(year), Some(_), None) => Some(DateLink {
            label: year.to_string(),
            query_string: query_without(params, &keys(&["month", "day"])),
        }),
        (Some(_), Some(_), Some(_)) => Some(DateLink {
            label: "Month".to_owned(),
            query_string: query_without(params, &keys(&["day"])),
        }),
    };

    let level = match (drill.year, drill.month) {
        (None, _) => "year",
        (Some(_), None) => "month",
        (Some(_), Some(_)) => "day",
    };
    let links = if drill.day.is_some() {
        Vec::new()
    } else {
        drill
            .choices(dates)
            .into_iter()
            .map(|(label, value)| DateLink {
                label,
                query_string: query_with(
                    params,
                    &format!("pub_date__{}", level),
                    Some(&value.to_string()),
                ),
            })
            .collect()
    };

    (back, links)
}

fn page_bounds(total: u64, per_page: u64, requested: u64) -> (u64, u64) {
    let per_page = per_page.max(1);
    let page_count = ((total + per_page - 1) / per_page).max(1);
    (requested.clamp(1, page_count), page_count)
}

/// Builds the changelist for one page of results.
pub async fn changelist(
    db: &DatabaseConnection,
    kind: ModelKind,
    admin: &ModelAdmin,
    params: &HashMap<String, String>,
    now: NaiveDateTime,
    default_per_page: u64,
) -> Result<ChangeList, DbErr> {
    let per_page = admin.list_per_page.unwrap_or(default_per_page).max(1);
    let requested_page = params.get("p").and_then(|p| p.parse().ok()).unwrap_or(1);
    let scope = scope_condition(kind, admin.scope);
    let cond = list_condition(kind, admin, params, now, true);

    let mut date_back = None;
    let mut date_links = Vec::new();

    let (rows, result_count, full_count, page, page_count) = match kind {
        ModelKind::Author => {
            let full_count = authors::Entity::find()
                .filter(scope.clone())
                .count(db)
                .await? as u64;
            let base = authors::Entity::find().filter(scope).filter(cond);
            let result_count = base.clone().count(db).await? as u64;
            let (page, page_count) = page_bounds(result_count, per_page, requested_page);
            let records = base
                .order_by_desc(authors::Column::Id)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(db)
                .await?;
            let rows = records
                .iter()
                .map(|a| build_row(admin, a, |_| None))
                .collect();
            (rows, result_count, full_count, page, page_count)
        }
        ModelKind::AuthorClone => {
            let full_count = author_clones::Entity::find()
                .filter(scope.clone())
                .count(db)
                .await? as u64;
            let base = author_clones::Entity::find().filter(scope).filter(cond);
            let result_count = base.clone().count(db).await? as u64;
            let (page, page_count) = page_bounds(result_count, per_page, requested_page);
            let records = base
                .order_by_desc(author_clones::Column::Id)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(db)
                .await?;
            let rows = records
                .iter()
                .map(|a| build_row(admin, a, |_| None))
                .collect();
            (rows, result_count, full_count, page, page_count)
        }
        ModelKind::Question => {
            let joined = || {
                questions::Entity::find()
                    .join(JoinType::LeftJoin, questions::Relation::Author.def())
            };
            let full_count = questions::Entity::find().count(db).await? as u64;
            let result_count = joined().filter(cond.clone()).count(db).await? as u64;
            let (page, page_count) = page_bounds(result_count, per_page, requested_page);

            if admin.date_hierarchy.is_some() {
                let dates: Vec<NaiveDateTime> = joined()
                    .filter(cond.clone())
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|q| q.pub_date)
                    .collect();
                let (back, links) = date_navigation(params, &dates);
                date_back = back;
                date_links = links;
            }

            let records = questions::Entity::find()
                .find_also_related(authors::Entity)
                .filter(cond)
                .order_by_desc(questions::Column::Id)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(db)
                .await?;
            let rows = records
                .iter()
                .map(|(question, author)| {
                    build_row(admin, question, |column| match column {
                        "go_to_choices" => Some(Cell::Html(display::go_to_choices(question))),
                        "has_been_published" => {
                            Some(Cell::Bool(display::has_been_published(question, now)))
                        }
                        "ref_author" => {
                            Some(Cell::text_or_empty(author.as_ref().map(|a| a.name.clone())))
                        }
                        _ => None,
                    })
                })
                .collect();
            (rows, result_count, full_count, page, page_count)
        }
        ModelKind::Choice => {
            let full_count = choices::Entity::find().count(db).await? as u64;
            let result_count = choices::Entity::find()
                .join(JoinType::LeftJoin, choices::Relation::Question.def())
                .join(JoinType::LeftJoin, questions::Relation::Author.def())
                .filter(cond.clone())
                .count(db)
                .await? as u64;
            let (page, page_count) = page_bounds(result_count, per_page, requested_page);
            let records = choices::Entity::find()
                .find_also_related(questions::Entity)
                .join(JoinType::LeftJoin, questions::Relation::Author.def())
                .filter(cond)
                .order_by_desc(choices::Column::Id)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(db)
                .await?;
            let rows = records
                .iter()
                .map(|(choice, question)| {
                    build_row(admin, choice, |column| match column {
                        "question" => Some(Cell::text_or_empty(
                            question.as_ref().map(|q| q.question_text.clone()),
                        )),
                        _ => None,
                    })
                })
                .collect();
            (rows, result_count, full_count, page, page_count)
        }
    };

    Ok(ChangeList {
        headers: admin
            .list_display
            .iter()
            .map(|c| column_header(admin, c))
            .collect(),
        rows,
        result_count,
        full_count,
        page,
        page_count,
        search: params.get("q").cloned().unwrap_or_default(),
        filters: filter_views(db, admin, params).await?,
        date_back,
        date_links,
        base_query: query_with(params, "p", None),
    })
}

/// Filter parameters present in the query that this admin does not know.
pub fn unknown_params(
    kind: ModelKind,
    admin: &ModelAdmin,
    params: &HashMap<String, String>,
) -> Vec<String> {
    params
        .keys()
        .filter(|k| {
            let k = k.as_str();
            !RESERVED_PARAMS.contains(&k)
                && !admin.list_filter.iter().any(|f| f.parameter_name() == k)
                && !implicit_filters(kind).contains(&k)
                && !(admin.date_hierarchy.is_some() && k.starts_with("pub_date__"))
        })
        .cloned()
        .collect()
}

/// Narrows a posted selection to the records this admin can see.
///
/// Actions only ever run on the ids returned here, so a crafted form cannot
/// reach rows hidden by the admin's scope.
pub async fn scoped_selection(
    db: &DatabaseConnection,
    kind: ModelKind,
    admin: &ModelAdmin,
    ids: &[i32],
) -> Result<Vec<i32>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let scope = scope_condition(kind, admin.scope);
    let visible: Vec<i32> = match kind {
        ModelKind::Author => authors::Entity::find()
            .filter(authors::Column::Id.is_in(ids.to_vec()))
            .filter(scope)
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect(),
        ModelKind::AuthorClone => author_clones::Entity::find()
            .filter(author_clones::Column::Id.is_in(ids.to_vec()))
            .filter(scope)
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect(),
        ModelKind::Question => questions::Entity::find()
            .filter(questions::Column::Id.is_in(ids.to_vec()))
            .filter(scope)
            .all(db)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect(),
        ModelKind::Choice => choices::Entity::find()
            .filter(choices::Column::Id.is_in(ids.to_vec()))
            .filter(scope)
            .all(db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect(),
    };
    if visible.len() < ids.len() {
        log::warn!(
            "Dropped {} selected {} outside the admin's queryset",
            ids.len() - visible.len(),
            admin.meta.verbose_name_plural
        );
    }
    Ok(ids.iter().copied().filter(|id| visible.contains(id)).collect())
}

pub async fn selected_questions(
    db: &DatabaseConnection,
    ids: &[i32],
) -> Result<Vec<questions::Model>, DbErr> {
    questions::Entity::find()
        .filter(questions::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(questions::Column::Id)
        .all(db)
        .await
}

/// `(pk, label)` of the selected records, in pk order.
pub async fn selected_labels(
    db: &DatabaseConnection,
    kind: ModelKind,
    ids: &[i32],
) -> Result<Vec<(i32, String)>, DbErr> {
    fn labels<R: AdminRecord>(records: Vec<R>) -> Vec<(i32, String)> {
        records.iter().map(|r| (r.pk(), r.label())).collect()
    }

    Ok(match kind {
        ModelKind::Author => labels(
            authors::Entity::find()
                .filter(authors::Column::Id.is_in(ids.to_vec()))
                .order_by_asc(authors::Column::Id)
                .all(db)
                .await?,
        ),
        ModelKind::AuthorClone => labels(
            author_clones::Entity::find()
                .filter(author_clones::Column::Id.is_in(ids.to_vec()))
                .order_by_asc(author_clones::Column::Id)
                .all(db)
                .await?,
        ),
        ModelKind::Question => labels(selected_questions(db, ids).await?),
        ModelKind::Choice => labels(
            choices::Entity::find()
                .filter(choices::Column::Id.is_in(ids.to_vec()))
                .order_by_asc(choices::Column::Id)
                .all(db)
                .await?,
        ),
    })
}

/// Exports the selected records of any kind, in pk order.
pub async fn export_selected(
    db: &DatabaseConnection,
    kind: ModelKind,
    ids: &[i32],
) -> Result<CsvExport, ExportError> {
    let export = match kind {
        ModelKind::Author => export_to_csv(
            &authors::Entity::find()
                .filter(authors::Column::Id.is_in(ids.to_vec()))
                .order_by_asc(authors::Column::Id)
                .all(db)
                .await?,
        )?,
        ModelKind::AuthorClone => export_to_csv(
            &author_clones::Entity::find()
                .filter(author_clones::Column::Id.is_in(ids.to_vec()))
                .order_by_asc(author_clones::Column::Id)
                .all(db)
                .await?,
        )?,
        ModelKind::Question => export_to_csv(&selected_questions(db, ids).await?)?,
        ModelKind::Choice => export_to_csv(
            &choices::Entity::find()
                .filter(choices::Column::Id.is_in(ids.to_vec()))
                .order_by_asc(choices::Column::Id)
                .all(db)
                .await?,
        )?,
    };
    Ok(export)
}

/// Saves `list_editable` values (`form-<pk>-<field>`); returns rows changed.
pub async fn save_list_editable(
    db: &DatabaseConnection,
    kind: ModelKind,
    edits: &[(i32, &'static str, String)],
    now: NaiveDateTime,
) -> Result<u64, DbErr> {
    let mut changed = 0;
    for (pk, field, value) in edits {
        let column = match (kind, *field) {
            (ModelKind::Question, "question_text") => questions::Column::QuestionText,
            _ => {
                log::warn!("{:?}.{} is not list-editable", kind, field);
                continue;
            }
        };
        let result = questions::Entity::update_many()
            .col_expr(column, Expr::value(value.clone()))
            .col_expr(questions::Column::UpdatedDate, Expr::value(now))
            .filter(questions::Column::Id.eq(*pk))
            .exec(db)
            .await?;
        changed += result.rows_affected;
    }
    Ok(changed)
}

/// Stored values of a record for the change form: input values, display
/// values of readonly fields and the record label.
pub struct StoredRecord {
    pub values: HashMap<String, String>,
    pub display_values: HashMap<String, String>,
    pub label: String,
}

fn stored<R: AdminRecord>(record: R) -> StoredRecord {
    StoredRecord {
        values: forms::record_values(&record),
        display_values: forms::record_display_values(&record),
        label: record.label(),
    }
}

pub async fn load_record(
    db: &DatabaseConnection,
    kind: ModelKind,
    admin: &ModelAdmin,
    pk: i32,
) -> Result<Option<StoredRecord>, DbErr> {
    let scope = scope_condition(kind, admin.scope);
    Ok(match kind {
        ModelKind::Author => authors::Entity::find_by_id(pk)
            .filter(scope)
            .one(db)
            .await?
            .map(stored),
        ModelKind::AuthorClone => author_clones::Entity::find_by_id(pk)
            .filter(scope)
            .one(db)
            .await?
            .map(stored),
        ModelKind::Question => questions::Entity::find_by_id(pk).one(db).await?.map(stored),
        ModelKind::Choice => choices::Entity::find_by_id(pk).one(db).await?.map(stored),
    })
}

/// Choices for the foreign key widgets of a change form.
pub async fn fk_choices(
    db: &DatabaseConnection,
    kind: ModelKind,
) -> Result<HashMap<&'static str, Vec<(i32, String)>>, DbErr> {
    let mut choices = HashMap::new();
    match kind {
        ModelKind::Question => {
            choices.insert("ref_author", author_choices(db).await?);
        }
        ModelKind::Choice => {
            let questions = questions::Entity::find()
                .order_by_asc(questions::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|q| (q.id, q.question_text))
                .collect();
            choices.insert("question", questions);
        }
        ModelKind::Author | ModelKind::AuthorClone => {}
    }
    Ok(choices)
}

pub async fn author_exists(db: &DatabaseConnection, pk: i32) -> Result<bool, DbErr> {
    Ok(authors::Entity::find_by_id(pk).one(db).await?.is_some())
}

pub async fn question_exists(db: &DatabaseConnection, pk: i32) -> Result<bool, DbErr> {
    Ok(questions::Entity::find_by_id(pk).one(db).await?.is_some())
}

/// Inserts (`pk == None`) or updates an Author or AuthorClone. Returns the pk.
pub async fn save_author(
    db: &DatabaseConnection,
    kind: ModelKind,
    pk: Option<i32>,
    cleaned: &CleanedAuthor,
    now: NaiveDateTime,
) -> Result<i32, DbErr> {
    let saved = match (kind, pk) {
        (ModelKind::Author, Some(pk)) => {
            let existing = authors::Entity::find_by_id(pk)
                .one(db)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("author {}", pk)))?;
            let mut active: authors::ActiveModel = existing.into();
            active.name = Set(cleaned.name.clone());
            active.updated_date = Set(now);
            active.update(db).await?.id
        }
        (ModelKind::Author, None) => {
            authors::ActiveModel {
                name: Set(cleaned.name.clone()),
                created_date: Set(now),
                updated_date: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
        (ModelKind::AuthorClone, Some(pk)) => {
            let existing = author_clones::Entity::find_by_id(pk)
                .one(db)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("author clone {}", pk)))?;
            let mut active: author_clones::ActiveModel = existing.into();
            active.name = Set(cleaned.name.clone());
            active.updated_date = Set(now);
            active.update(db).await?.id
        }
        (ModelKind::AuthorClone, None) => {
            author_clones::ActiveModel {
                name: Set(cleaned.name.clone()),
                created_date: Set(now),
                updated_date: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
        (other, _) => {
            return Err(DbErr::Custom(format!("{:?} is not an author model", other)));
        }
    };
    if kind == ModelKind::Author {
        log::info!("Author saved (id {})", saved);
    }
    Ok(saved)
}

pub async fn save_question(
    db: &DatabaseConnection,
    pk: Option<i32>,
    cleaned: &CleanedQuestion,
    now: NaiveDateTime,
) -> Result<i32, DbErr> {
    let saved = match pk {
        Some(pk) => {
            let existing = questions::Entity::find_by_id(pk)
                .one(db)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("question {}", pk)))?;
            let mut active: questions::ActiveModel = existing.into();
            active.question_text = Set(cleaned.question_text.clone());
            active.pub_date = Set(cleaned.pub_date);
            active.ref_author_id = Set(cleaned.ref_author_id);
            active.updated_date = Set(now);
            active.update(db).await?
        }
        None => {
            questions::ActiveModel {
                question_text: Set(cleaned.question_text.clone()),
                pub_date: Set(cleaned.pub_date),
                ref_author_id: Set(cleaned.ref_author_id),
                created_date: Set(now),
                updated_date: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    Ok(saved.id)
}

pub async fn save_choice(
    db: &DatabaseConnection,
    pk: Option<i32>,
    cleaned: &CleanedChoice,
    now: NaiveDateTime,
) -> Result<i32, DbErr> {
    let saved = match pk {
        Some(pk) => {
            let existing = choices::Entity::find_by_id(pk)
                .one(db)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("choice {}", pk)))?;
            let mut active: choices::ActiveModel = existing.into();
            active.choice_text = Set(cleaned.choice_text.clone());
            active.votes = Set(cleaned.votes);
            active.question_id = Set(cleaned.question_id);
            active.updated_date = Set(now);
            active.update(db).await?
        }
        None => {
            choices::ActiveModel {
                choice_text: Set(cleaned.choice_text.clone()),
                votes: Set(cleaned.votes),
                question_id: Set(cleaned.question_id),
                created_date: Set(now),
                updated_date: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    Ok(saved.id)
}

/// A child row listed on the parent's change page.
#[derive(Debug, Clone)]
pub struct InlineRow {
    pub label: String,
    pub change_url: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InlineView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<InlineRow>,
}

/// Rows of each inline for a parent record.
pub async fn inline_views(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
    parent_pk: i32,
) -> Result<Vec<InlineView>, DbErr> {
    let mut views = Vec::new();
    for inline in &admin.inlines {
        views.push(inline_view(db, inline, parent_pk).await?);
    }
    Ok(views)
}

async fn inline_view(
    db: &DatabaseConnection,
    inline: &InlineAdmin,
    parent_pk: i32,
) -> Result<InlineView, DbErr> {
    let headers: Vec<String> = inline
        .model
        .scalar_fields()
        .map(|f| capfirst(f.verbose_name))
        .collect();

    let rows = match (inline.model.model_name, inline.fk_name) {
        ("question", "ref_author") => questions::Entity::find()
            .filter(questions::Column::RefAuthorId.eq(parent_pk))
            .order_by_asc(questions::Column::Id)
            .all(db)
            .await?
            .iter()
            .map(|q| inline_row(q))
            .collect(),
        ("choice", "question") => choices::Entity::find()
            .filter(choices::Column::QuestionId.eq(parent_pk))
            .order_by_asc(choices::Column::Id)
            .all(db)
            .await?
            .iter()
            .map(|c| inline_row(c))
            .collect(),
        (model, fk) => {
            log::warn!("No inline support for {} via {}", model, fk);
            Vec::new()
        }
    };

    Ok(InlineView {
        title: capfirst(inline.model.verbose_name_plural),
        headers,
        rows,
    })
}

fn inline_row<R: AdminRecord>(record: &R) -> InlineRow {
    let values = R::meta()
        .scalar_fields()
        .map(|f| match record.value(f.name) {
            Some(FieldValue::DateTime(dt)) => dt.format(display::LIST_DATETIME_FORMAT).to_string(),
            Some(v) => v.to_export_string(),
            None => String::new(),
        })
        .collect();
    InlineRow {
        label: record.label(),
        change_url: R::meta().change_url(record.pk()),
        values,
    }
}

/// Autocomplete results for `term` over the target admin's search fields.
pub async fn autocomplete(
    db: &DatabaseConnection,
    kind: ModelKind,
    target: &ModelAdmin,
    term: &str,
    limit: u64,
) -> Result<Vec<(i32, String)>, DbErr> {
    let mut cond = scope_condition(kind, target.scope);
    let term = term.trim();
    if !term.is_empty() {
        let mut any = Condition::any();
        for field in &target.search_fields {
            if let Some(c) = search_condition(kind, field, term) {
                any = any.add(c);
            }
        }
        cond = cond.add(any);
    }

    Ok(match kind {
        ModelKind::Author => authors::Entity::find()
            .filter(cond)
            .order_by_asc(authors::Column::Name)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect(),
        ModelKind::AuthorClone => author_clones::Entity::find()
            .filter(cond)
            .order_by_asc(author_clones::Column::Name)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect(),
        ModelKind::Question => questions::Entity::find()
            .join(JoinType::LeftJoin, questions::Relation::Author.def())
            .filter(cond)
            .order_by_asc(questions::Column::Id)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(|q| (q.id, q.question_text))
            .collect(),
        ModelKind::Choice => choices::Entity::find()
            .join(JoinType::LeftJoin, choices::Relation::Question.def())
            .join(JoinType::LeftJoin, questions::Relation::Author.def())
            .filter(cond)
            .order_by_asc(choices::Column::Id)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.choice_text))
            .collect(),
    })
}
