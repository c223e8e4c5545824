//! User management handlers.
//!
//! The users list has no separate fragment route: an HTMX `GET /users`
//! gets just the table.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::search::normalize_query;
use shopfront_core::validation::UserDraft;
use shopfront_core::{FieldErrors, PageRequest, User, UserId};

use crate::components::{DataTableConfig, Pager, users_table_config};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Layout, RequireAdminAuth, set_flash};
use crate::models::Flash;
use crate::routes::{encode_filters, is_htmx, write_failure};
use crate::state::AppState;

/// Fixed users page size.
pub const USERS_PER_PAGE: u32 = 10;

/// User row for templates.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub initial: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            name: user.name.clone(),
            email: user.email.clone(),
            initial: user.initial(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub page: Option<String>,
    pub q: Option<String>,
}

/// Everything the users table renders.
#[derive(Debug, Clone)]
pub struct UsersTable {
    pub config: DataTableConfig,
    pub rows: Vec<UserRow>,
    pub pager: Pager,
    pub total: u64,
    pub q: String,
    pub offline: bool,
}

impl UsersTable {
    async fn load(state: &AppState, query: &UsersQuery) -> Self {
        let q = normalize_query(query.q.as_deref());
        let request = PageRequest::from_query(query.page.as_deref(), USERS_PER_PAGE);
        let listing = state.store().users(q.as_deref(), request).await;

        let q = q.unwrap_or_default();
        let filters = encode_filters(&[("q", q.as_str())]);

        Self {
            config: users_table_config(),
            rows: listing.page.items.iter().map(UserRow::from).collect(),
            pager: Pager::new(&listing.page, "/users", "/users", &filters),
            total: listing.page.total,
            q,
            offline: listing.source.is_sample(),
        }
    }
}

/// Users list page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub layout: Layout,
    pub table: UsersTable,
}

/// Users table fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/users_table.html")]
pub struct UsersTableTemplate {
    pub table: UsersTable,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "users/form.html")]
pub struct UserFormTemplate {
    pub layout: Layout,
    pub heading: String,
    pub action: String,
    pub draft: UserDraft,
    pub errors: FieldErrors,
    pub offline: bool,
}

/// Users list page, or just the table for HTMX.
#[instrument(skip(state, layout, headers))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    layout: Layout,
    headers: HeaderMap,
    Query(query): Query<UsersQuery>,
) -> Response {
    let table = UsersTable::load(&state, &query).await;
    if is_htmx(&headers) {
        UsersTableTemplate { table }.into_response()
    } else {
        UsersIndexTemplate { layout, table }.into_response()
    }
}

pub async fn new_form(RequireAdminAuth(_admin): RequireAdminAuth, layout: Layout) -> impl IntoResponse {
    UserFormTemplate {
        layout,
        heading: "New user".to_string(),
        action: "/users".to_string(),
        draft: UserDraft::default(),
        errors: FieldErrors::new(),
        offline: false,
    }
}

/// Create a user.
#[instrument(skip(state, session, layout, draft), fields(email = %draft.email))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(draft): Form<UserDraft>,
) -> Response {
    let payload = match draft.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return invalid(UserFormTemplate {
                layout,
                heading: "New user".to_string(),
                action: "/users".to_string(),
                draft,
                errors,
                offline: false,
            });
        }
    };

    let flash = match state.store().create_user(&payload).await {
        Ok(user) => Flash::success(format!("Created {}", user.name)),
        Err(e) => {
            tracing::warn!(error = %e, "user create failed");
            write_failure("User", &e)
        }
    };
    set_flash(&session, flash).await;
    Redirect::to("/users").into_response()
}

#[instrument(skip(state, layout))]
pub async fn edit_form(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let (user, source) = state
        .store()
        .user(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    Ok(UserFormTemplate {
        layout,
        heading: format!("Edit {}", user.name),
        action: format!("/users/{id}"),
        draft: UserDraft::from_user(&user),
        errors: FieldErrors::new(),
        offline: source.is_sample(),
    })
}

/// Replace a user.
#[instrument(skip(state, session, layout, draft), fields(email = %draft.email))]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Path(id): Path<String>,
    Form(draft): Form<UserDraft>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let payload = match draft.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(invalid(UserFormTemplate {
                layout,
                heading: "Edit user".to_string(),
                action: format!("/users/{id}"),
                draft,
                errors,
                offline: false,
            }));
        }
    };

    let flash = match state.store().update_user(id, &payload).await {
        Ok(user) => Flash::success(format!("Updated {}", user.name)),
        Err(e) => {
            tracing::warn!(error = %e, "user update failed");
            write_failure("User", &e)
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to("/users").into_response())
}

#[instrument(skip(state, session))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;
    let flash = match state.store().delete_user(id).await {
        Ok(()) => Flash::success("User deleted"),
        Err(e) => {
            tracing::warn!(error = %e, "user delete failed");
            write_failure("User", &e)
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to("/users"))
}

fn parse_id(raw: &str) -> Result<UserId> {
    UserId::from_str(raw).map_err(|_| AppError::NotFound(format!("user {raw}")))
}

fn invalid(form: UserFormTemplate) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, form).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_carries_initial() {
        let row = UserRow::from(&User {
            id: UserId::new(2),
            name: "linh".to_string(),
            email: "linh@example.com".to_string(),
        });
        assert_eq!(row.id, 2);
        assert_eq!(row.initial, "L");
    }
}
