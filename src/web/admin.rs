/// Admin pages for the registered sample_app models.
///
/// Routes follow `/admin/<app_label>/<model_name>/…`. Every POST carries the
/// session CSRF token.
use crate::admin::actions::{self, Confirmation};
use crate::admin::export::CSV_MIME_TYPE;
use crate::admin::forms::{
    self, AuthorForm, ChoiceForm, FieldsetView, FormContext, FormErrors, QuestionForm,
    SubmitFlags,
};
use crate::admin::options::{Action, ModelAdmin};
use crate::admin::site::{AdminSite, AppEntry};
use crate::admin::store::{self, ChangeList, InlineView};
use crate::admin::{FieldKind, ModelKind, ModelMeta};
use crate::messages::{self, Level};
use crate::middleware::csrf::validate_csrf_token;
use crate::middleware::AdminCtx;
use crate::orm::questions;
use crate::template::{Paginator, PaginatorToHtml};
use actix_session::Session;
use actix_web::http::header;
use actix_web::{error, get, post, web, Error, FromRequest, HttpRequest, HttpResponse};
use askama::Template;
use askama_actix::TemplateToResponse;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index)
        .service(view_autocomplete)
        .service(view_changelist)
        .service(post_changelist)
        .service(view_add_form)
        .service(post_add_form)
        .service(view_change_form)
        .service(post_change_form);
}

fn db_error(e: DbErr) -> Error {
    log::error!("Admin database error: {}", e);
    error::ErrorInternalServerError("Database error")
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Path and query string of the request, as the browser sent them.
fn full_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| req.path().to_owned())
}

/// Looks up a registered sample_app model or answers 404.
fn resolve<'a>(
    site: &'a AdminSite,
    app_label: &str,
    model_name: &str,
) -> Result<(ModelKind, &'a ModelAdmin), Error> {
    let kind = ModelKind::from_path(app_label, model_name);
    let admin = site.get(app_label, model_name);
    match (kind, admin) {
        (Some(kind), Some(admin)) => Ok((kind, admin)),
        _ => Err(error::ErrorNotFound("Model not found")),
    }
}

fn parse_pairs(body: &[u8]) -> Result<Vec<(String, String)>, Error> {
    serde_urlencoded::from_bytes(body).map_err(|e| {
        log::debug!("Malformed admin form body: {}", e);
        error::ErrorBadRequest("Malformed form data")
    })
}

fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// Index
// =============================================================================

#[derive(Template)]
#[template(path = "admin/index.html")]
struct IndexTemplate {
    ctx: AdminCtx,
    index_title: String,
    apps: Vec<AppEntry>,
}

/// GET /admin/ - Registered models grouped by app
#[get("/admin/")]
async fn view_index(ctx: AdminCtx, site: web::Data<AdminSite>) -> Result<HttpResponse, Error> {
    Ok(IndexTemplate {
        ctx,
        index_title: site.index_title.clone(),
        apps: site.app_list(),
    }
    .to_response())
}

// =============================================================================
// Changelist
// =============================================================================

/// Flattened cell for the template.
struct CellView {
    /// `text`, `html`, `bool`, `editable` or `empty`.
    kind: &'static str,
    text: String,
    name: String,
    flag: bool,
    link: String,
}

struct RowView {
    pk: i32,
    cells: Vec<CellView>,
}

struct ActionOption {
    name: &'static str,
    description: String,
}

struct HiddenParam {
    name: String,
    value: String,
}

fn row_views(cl: &ChangeList, empty_value_display: &str) -> Vec<RowView> {
    use crate::admin::display::Cell;

    cl.rows
        .iter()
        .map(|row| RowView {
            pk: row.pk,
            cells: row
                .cells
                .iter()
                .map(|rc| {
                    let mut view = CellView {
                        kind: "text",
                        text: String::new(),
                        name: String::new(),
                        flag: false,
                        link: rc.link.clone().unwrap_or_default(),
                    };
                    match &rc.cell {
                        Cell::Text(text) => view.text = text.clone(),
                        Cell::Html(html) => {
                            view.kind = "html";
                            view.text = html.clone();
                        }
                        Cell::Bool(flag) => {
                            view.kind = "bool";
                            view.flag = *flag;
                        }
                        Cell::Editable { name, value } => {
                            view.kind = "editable";
                            view.name = name.clone();
                            view.text = value.clone();
                        }
                        Cell::Empty => {
                            view.kind = "empty";
                            view.text = empty_value_display.to_owned();
                        }
                    }
                    view
                })
                .collect(),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "admin/change_list.html")]
struct ChangeListTemplate {
    ctx: AdminCtx,
    meta: &'static ModelMeta,
    title: String,
    cl: ChangeList,
    rows: Vec<RowView>,
    actions: Vec<ActionOption>,
    has_search: bool,
    has_editable: bool,
    search_hidden: Vec<HiddenParam>,
    paginator: Paginator,
}

/// GET /admin/{app}/{model}/ - List records with search, filters and paging
#[get("/admin/{app_label}/{model_name}/")]
async fn view_changelist(
    ctx: AdminCtx,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, String)>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, Error> {
    let (app_label, model_name) = path.into_inner();
    let (kind, admin) = resolve(&site, &app_label, &model_name)?;
    let params = query.into_inner();

    let ignored = store::unknown_params(kind, admin, &params);
    if !ignored.is_empty() {
        log::debug!("Ignoring unknown changelist parameters {:?}", ignored);
    }

    let per_page = crate::app_config::admin().list_per_page;
    let cl = store::changelist(db.get_ref(), kind, admin, &params, now(), per_page)
        .await
        .map_err(db_error)?;

    let mut search_hidden: Vec<HiddenParam> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "q" && k.as_str() != "p")
        .map(|(k, v)| HiddenParam {
            name: k.clone(),
            value: v.clone(),
        })
        .collect();
    search_hidden.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(ChangeListTemplate {
        ctx,
        meta: admin.meta,
        title: format!("Select {} to change", admin.meta.verbose_name),
        rows: row_views(&cl, admin.empty_value_display),
        actions: admin
            .available_actions()
            .iter()
            .map(|a| ActionOption {
                name: a.name(),
                description: a.description(admin.meta),
            })
            .collect(),
        has_search: !admin.search_fields.is_empty(),
        has_editable: !admin.list_editable.is_empty(),
        search_hidden,
        paginator: Paginator {
            base_query: cl.base_query.clone(),
            this_page: cl.page,
            page_count: cl.page_count,
        },
        cl,
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "admin/custom_makepublished.html")]
struct MakePublishedTemplate {
    ctx: AdminCtx,
    questions: Vec<questions::Model>,
    action: &'static str,
    form_url: String,
}

struct SelectedObject {
    pk: i32,
    label: String,
    change_url: String,
}

#[derive(Template)]
#[template(path = "admin/delete_selected_confirmation.html")]
struct DeleteSelectedTemplate {
    ctx: AdminCtx,
    meta: &'static ModelMeta,
    objects: Vec<SelectedObject>,
    summary: actions::DeletionSummary,
    form_url: String,
}

/// POST /admin/{app}/{model}/ - Run a bulk action or save list_editable columns
#[post("/admin/{app_label}/{model_name}/")]
async fn post_changelist(
    req: HttpRequest,
    session: Session,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let (app_label, model_name) = path.into_inner();
    let (kind, admin) = resolve(&site, &app_label, &model_name)?;
    let pairs = parse_pairs(&body)?;

    validate_csrf_token(&session, first(&pairs, "csrf_token").unwrap_or(""))?;

    let return_to = full_path(&req);
    let db = db.get_ref();

    if first(&pairs, "_save").is_some() {
        return save_list_editable(&session, db, kind, admin, &pairs, &return_to).await;
    }

    let action = match first(&pairs, "action").and_then(|name| admin.action(name)) {
        Some(action) => action,
        None => {
            messages::warning(&session, actions::NO_ACTION_MESSAGE)?;
            return Ok(redirect(&return_to));
        }
    };

    let ids = actions::parse_selection(
        pairs
            .iter()
            .filter(|(k, _)| k == "_selected_action")
            .map(|(_, v)| v.as_str()),
    );
    let ids = store::scoped_selection(db, kind, admin, &ids)
        .await
        .map_err(db_error)?;
    if ids.is_empty() {
        messages::warning(&session, actions::NO_SELECTION_MESSAGE)?;
        return Ok(redirect(&return_to));
    }

    match action {
        Action::DeleteSelected => {
            if first(&pairs, "post") == Some("yes") {
                let deleted = actions::delete_selected(db, kind, &ids)
                    .await
                    .map_err(db_error)?;
                log::info!(
                    "delete_selected removed {} {}",
                    deleted,
                    admin.meta.verbose_name_plural
                );
                messages::success(
                    &session,
                    actions::deleted_message(deleted, admin.meta.verbose_name_plural),
                )?;
                return Ok(redirect(&return_to));
            }

            let objects = store::selected_labels(db, kind, &ids)
                .await
                .map_err(db_error)?
                .into_iter()
                .map(|(pk, label)| SelectedObject {
                    pk,
                    label,
                    change_url: admin.meta.change_url(pk),
                })
                .collect();
            let summary = actions::deletion_summary(db, kind, &ids)
                .await
                .map_err(db_error)?;
            let ctx = AdminCtx::extract(&req).await?;
            Ok(DeleteSelectedTemplate {
                ctx,
                meta: admin.meta,
                objects,
                summary,
                form_url: return_to,
            }
            .to_response())
        }
        Action::MakePublished => {
            require_questions(kind)?;
            let count = actions::make_published(db, &ids, now())
                .await
                .map_err(db_error)?;
            log::info!("make_published updated {} questions", count);
            messages::success(&session, actions::marked_published_message(count))?;
            Ok(redirect(&return_to))
        }
        Action::MakePublishedCustom => {
            require_questions(kind)?;
            match Confirmation::from_apply_flag(first(&pairs, "apply").is_some()) {
                Confirmation::Confirmed => {
                    let count = actions::make_published(db, &ids, now())
                        .await
                        .map_err(db_error)?;
                    log::info!("make_published_custom updated {} questions", count);
                    messages::add_message(&session, Level::Info, actions::published_message(count))?;
                    Ok(redirect(&return_to))
                }
                Confirmation::Prompt => {
                    let questions = store::selected_questions(db, &ids)
                        .await
                        .map_err(db_error)?;
                    let ctx = AdminCtx::extract(&req).await?;
                    Ok(MakePublishedTemplate {
                        ctx,
                        questions,
                        action: Action::MakePublishedCustom.name(),
                        form_url: return_to,
                    }
                    .to_response())
                }
            }
        }
        Action::ExportToCsv => {
            let export = store::export_selected(db, kind, &ids).await.map_err(|e| {
                log::error!("CSV export of {} failed: {}", admin.meta.model_name, e);
                error::ErrorInternalServerError("Export failed")
            })?;
            log::info!(
                "export_to_csv wrote {} {}",
                export.row_count,
                admin.meta.verbose_name_plural
            );
            Ok(HttpResponse::Ok()
                .content_type(CSV_MIME_TYPE)
                .append_header((header::CONTENT_DISPOSITION, export.content_disposition()))
                .body(export.data))
        }
    }
}

fn require_questions(kind: ModelKind) -> Result<(), Error> {
    if kind == ModelKind::Question {
        Ok(())
    } else {
        Err(error::ErrorBadRequest("Action only applies to questions"))
    }
}

async fn save_list_editable(
    session: &Session,
    db: &DatabaseConnection,
    kind: ModelKind,
    admin: &ModelAdmin,
    pairs: &[(String, String)],
    return_to: &str,
) -> Result<HttpResponse, Error> {
    let mut edits = Vec::new();
    let mut problems = Vec::new();

    for (key, value) in pairs {
        let (pk, field) = match key.strip_prefix("form-").and_then(|r| r.split_once('-')) {
            Some((pk, field)) => (pk, field),
            None => continue,
        };
        let pk: i32 = match pk.parse() {
            Ok(pk) => pk,
            Err(_) => continue,
        };
        let field = match admin.list_editable.iter().find(|f| **f == field) {
            Some(field) => *field,
            None => continue,
        };
        match forms::clean_list_editable(admin.meta, field, value) {
            Ok(clean) => edits.push((pk, field, clean)),
            Err(message) => problems.push(format!("#{} {}: {}", pk, field, message)),
        }
    }

    if !problems.is_empty() {
        messages::add_message(
            session,
            Level::Error,
            format!("Please correct the errors below. {}", problems.join(" ")),
        )?;
        return Ok(redirect(return_to));
    }

    let changed = store::save_list_editable(db, kind, &edits, now())
        .await
        .map_err(db_error)?;
    let name = if changed == 1 {
        admin.meta.verbose_name
    } else {
        admin.meta.verbose_name_plural
    };
    let verb = if changed == 1 { "was" } else { "were" };
    messages::success(
        session,
        format!("{} {} {} changed successfully.", changed, name, verb),
    )?;
    Ok(redirect(return_to))
}

// =============================================================================
// Add / change forms
// =============================================================================

#[derive(Template)]
#[template(path = "admin/change_form.html")]
struct ChangeFormTemplate {
    ctx: AdminCtx,
    meta: &'static ModelMeta,
    title: String,
    is_add: bool,
    has_errors: bool,
    fieldsets: Vec<FieldsetView>,
    inlines: Vec<InlineView>,
}

/// Renders the add (`pk == None`) or change form. `submitted` replaces the
/// stored values when re-rendering after a failed POST.
async fn render_form(
    ctx: AdminCtx,
    db: &DatabaseConnection,
    kind: ModelKind,
    admin: &ModelAdmin,
    pk: Option<i32>,
    submitted: Option<HashMap<String, String>>,
    errors: FormErrors,
) -> Result<HttpResponse, Error> {
    let stored = match pk {
        Some(pk) => Some(
            store::load_record(db, kind, admin, pk)
                .await
                .map_err(db_error)?
                .ok_or_else(|| error::ErrorNotFound("Record not found"))?,
        ),
        None => None,
    };

    let empty = HashMap::new();
    let values = match (&submitted, &stored) {
        (Some(values), _) => values,
        (None, Some(stored)) => &stored.values,
        (None, None) => &empty,
    };
    let readonly_values = stored.as_ref().map(|s| &s.display_values).unwrap_or(&empty);
    let fk_choices = store::fk_choices(db, kind).await.map_err(db_error)?;

    let fieldsets = forms::build_fieldsets(
        admin,
        &FormContext {
            values,
            readonly_values,
            errors: &errors,
            fk_choices: &fk_choices,
        },
    );
    let inlines = match pk {
        Some(pk) => store::inline_views(db, admin, pk)
            .await
            .map_err(db_error)?,
        None => Vec::new(),
    };

    let title = match &stored {
        Some(stored) => format!("Change {}: {}", admin.meta.verbose_name, stored.label),
        None => format!("Add {}", admin.meta.verbose_name),
    };

    Ok(ChangeFormTemplate {
        ctx,
        meta: admin.meta,
        title,
        is_add: pk.is_none(),
        has_errors: !errors.is_empty(),
        fieldsets,
        inlines,
    }
    .to_response())
}

fn parse_form<'de, T: Deserialize<'de>>(body: &'de [u8]) -> Result<T, Error> {
    serde_urlencoded::from_bytes(body).map_err(|e| {
        log::debug!("Malformed admin form body: {}", e);
        error::ErrorBadRequest("Malformed form data")
    })
}

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Validates and stores a submitted form. `Err` carries the submitted values
/// and the errors for re-rendering.
async fn save_form(
    session: &Session,
    db: &DatabaseConnection,
    kind: ModelKind,
    pk: Option<i32>,
    body: &[u8],
) -> Result<Result<(i32, String), (HashMap<String, String>, FormErrors)>, Error> {
    let at = now();
    match kind {
        ModelKind::Author | ModelKind::AuthorClone => {
            let form: AuthorForm = parse_form(body)?;
            validate_csrf_token(session, &form.csrf_token)?;
            match form.clean() {
                Ok(clean) => {
                    let id = store::save_author(db, kind, pk, &clean, at)
                        .await
                        .map_err(db_error)?;
                    Ok(Ok((id, clean.name)))
                }
                Err(errors) => Ok(Err((form.values(), errors))),
            }
        }
        ModelKind::Question => {
            let form: QuestionForm = parse_form(body)?;
            validate_csrf_token(session, &form.csrf_token)?;
            let mut result = form.clean();
            if let Ok(clean) = &result {
                if !store::author_exists(db, clean.ref_author_id)
                    .await
                    .map_err(db_error)?
                {
                    result = Err(FormErrors::from([(
                        "ref_author".to_owned(),
                        vec![INVALID_CHOICE.to_owned()],
                    )]));
                }
            }
            match result {
                Ok(clean) => {
                    let id = store::save_question(db, pk, &clean, at)
                        .await
                        .map_err(db_error)?;
                    Ok(Ok((id, clean.question_text)))
                }
                Err(errors) => Ok(Err((form.values(), errors))),
            }
        }
        ModelKind::Choice => {
            let form: ChoiceForm = parse_form(body)?;
            validate_csrf_token(session, &form.csrf_token)?;
            let mut result = form.clean();
            if let Ok(clean) = &result {
                if !store::question_exists(db, clean.question_id)
                    .await
                    .map_err(db_error)?
                {
                    result = Err(FormErrors::from([(
                        "question".to_owned(),
                        vec![INVALID_CHOICE.to_owned()],
                    )]));
                }
            }
            match result {
                Ok(clean) => {
                    let id = store::save_choice(db, pk, &clean, at)
                        .await
                        .map_err(db_error)?;
                    Ok(Ok((id, clean.choice_text)))
                }
                Err(errors) => Ok(Err((form.values(), errors))),
            }
        }
    }
}

/// Shared POST handling of the add and change forms.
async fn handle_form_post(
    req: HttpRequest,
    session: Session,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    app_label: &str,
    model_name: &str,
    pk: Option<i32>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let (kind, admin) = resolve(&site, app_label, model_name)?;
    let db = db.get_ref();

    if let Some(pk) = pk {
        if store::load_record(db, kind, admin, pk)
            .await
            .map_err(db_error)?
            .is_none()
        {
            return Err(error::ErrorNotFound("Record not found"));
        }
    }

    match save_form(&session, db, kind, pk, &body).await? {
        Ok((id, label)) => {
            let flags: SubmitFlags = parse_form(&body)?;
            let verb = if pk.is_some() { "changed" } else { "added" };
            let meta = admin.meta;
            let (message, location) = if flags.continue_editing.is_some() {
                (
                    format!(
                        "The {} “{}” was {} successfully. You may edit it again below.",
                        meta.verbose_name, label, verb
                    ),
                    meta.change_url(id),
                )
            } else if flags.add_another.is_some() {
                (
                    format!(
                        "The {} “{}” was {} successfully. You may add another {} below.",
                        meta.verbose_name, label, verb, meta.verbose_name
                    ),
                    meta.add_url(),
                )
            } else {
                (
                    format!(
                        "The {} “{}” was {} successfully.",
                        meta.verbose_name, label, verb
                    ),
                    meta.changelist_url(),
                )
            };
            messages::success(&session, message)?;
            Ok(redirect(&location))
        }
        Err((values, errors)) => {
            let ctx = AdminCtx::extract(&req).await?;
            render_form(ctx, db, kind, admin, pk, Some(values), errors).await
        }
    }
}

/// GET /admin/{app}/{model}/add/
#[get("/admin/{app_label}/{model_name}/add/")]
async fn view_add_form(
    ctx: AdminCtx,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (app_label, model_name) = path.into_inner();
    let (kind, admin) = resolve(&site, &app_label, &model_name)?;
    render_form(ctx, db.get_ref(), kind, admin, None, None, FormErrors::new()).await
}

/// POST /admin/{app}/{model}/add/
#[post("/admin/{app_label}/{model_name}/add/")]
async fn post_add_form(
    req: HttpRequest,
    session: Session,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let (app_label, model_name) = path.into_inner();
    handle_form_post(req, session, site, db, &app_label, &model_name, None, body).await
}

/// GET /admin/{app}/{model}/{id}/change/
#[get("/admin/{app_label}/{model_name}/{id}/change/")]
async fn view_change_form(
    ctx: AdminCtx,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, String, i32)>,
) -> Result<HttpResponse, Error> {
    let (app_label, model_name, id) = path.into_inner();
    let (kind, admin) = resolve(&site, &app_label, &model_name)?;
    render_form(ctx, db.get_ref(), kind, admin, Some(id), None, FormErrors::new()).await
}

/// POST /admin/{app}/{model}/{id}/change/
#[post("/admin/{app_label}/{model_name}/{id}/change/")]
async fn post_change_form(
    req: HttpRequest,
    session: Session,
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, String, i32)>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let (app_label, model_name, id) = path.into_inner();
    handle_form_post(req, session, site, db, &app_label, &model_name, Some(id), body).await
}

// =============================================================================
// Autocomplete
// =============================================================================

#[derive(Deserialize)]
struct AutocompleteQuery {
    app_label: String,
    model_name: String,
    field_name: String,
    #[serde(default)]
    term: String,
}

#[derive(Debug, Serialize)]
struct AutocompleteResult {
    id: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct AutocompletePagination {
    more: bool,
}

#[derive(Debug, Serialize)]
struct AutocompleteResponse {
    results: Vec<AutocompleteResult>,
    pagination: AutocompletePagination,
}

/// GET /admin/autocomplete/ - JSON choices for an autocomplete foreign key
#[get("/admin/autocomplete/")]
async fn view_autocomplete(
    site: web::Data<AdminSite>,
    db: web::Data<DatabaseConnection>,
    query: web::Query<AutocompleteQuery>,
) -> Result<HttpResponse, Error> {
    let forbidden = || error::ErrorForbidden("Autocomplete is not available for this field");

    let source = site
        .get(&query.app_label, &query.model_name)
        .ok_or_else(forbidden)?;
    if !source.uses_autocomplete(&query.field_name) {
        return Err(forbidden());
    }
    let target_model = match source.meta.field(&query.field_name).map(|f| f.kind) {
        Some(FieldKind::ForeignKey { to }) => to,
        _ => return Err(forbidden()),
    };
    let target = site
        .get(source.meta.app_label, target_model)
        .filter(|admin| !admin.search_fields.is_empty())
        .ok_or_else(forbidden)?;
    let kind = ModelKind::from_path(target.meta.app_label, target.meta.model_name)
        .ok_or_else(forbidden)?;

    let limit = crate::app_config::admin().autocomplete_limit.max(1);
    let mut found = store::autocomplete(db.get_ref(), kind, target, &query.term, limit + 1)
        .await
        .map_err(db_error)?;
    let more = found.len() as u64 > limit;
    found.truncate(limit as usize);

    Ok(HttpResponse::Ok().json(AutocompleteResponse {
        results: found
            .into_iter()
            .map(|(id, text)| AutocompleteResult {
                id: id.to_string(),
                text,
            })
            .collect(),
        pagination: AutocompletePagination { more },
    }))
}
