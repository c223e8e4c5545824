//! Admin login and logout.
//!
//! Same pseudo-auth as the storefront: the API's `/login` is asked first
//! and a locally signed token stands in when it is unreachable. A storefront
//! login arrives at `/auth/handoff` with a short-lived token instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::validation::Credentials;
use shopfront_core::{AuthUser, FieldErrors};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Layout, clear_auth_token, set_auth_token, set_flash};
use crate::models::{Flash, StoredToken};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub errors: FieldErrors,
}

pub async fn login_page(layout: Layout) -> Response {
    if layout.admin_name.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        layout,
        email: String::new(),
        errors: FieldErrors::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                LoginTemplate {
                    layout,
                    email: form.email,
                    errors,
                },
            )
                .into_response());
        }
    };

    let stored = state.auth().login(&request).await;
    sign_in(&state, &session, &stored).await?;
    Ok(Redirect::to("/").into_response())
}

/// Query of a storefront handoff link.
#[derive(Debug, Deserialize)]
pub struct HandoffQuery {
    pub token: Option<String>,
}

/// Sign in with a handoff token from the storefront.
#[instrument(skip_all)]
pub async fn handoff(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HandoffQuery>,
) -> Result<Redirect> {
    let accepted = query
        .token
        .as_deref()
        .and_then(|token| state.auth().accept_handoff(token, Utc::now()));
    let Some(stored) = accepted else {
        set_flash(&session, Flash::error("Sign-in link expired or invalid")).await;
        return Ok(Redirect::to("/auth/login"));
    };

    sign_in(&state, &session, &stored).await?;
    Ok(Redirect::to("/"))
}

async fn sign_in(state: &AppState, session: &Session, stored: &StoredToken) -> Result<()> {
    set_auth_token(session, stored).await?;

    let admin = state
        .auth()
        .authenticate(stored, Utc::now())
        .unwrap_or_else(AuthUser::default);
    set_sentry_user(admin.id.as_deref(), admin.email.as_deref());
    set_flash(
        session,
        Flash::success(format!("Signed in as {}", admin.display_name())),
    )
    .await;
    Ok(())
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_auth_token(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success("Logged out")).await;
    Ok(Redirect::to("/auth/login"))
}
