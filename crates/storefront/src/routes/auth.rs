//! Authentication route handlers.
//!
//! Login and registration always succeed once the form validates: the REST
//! API is asked first, and a locally fabricated token stands in when it
//! cannot help. Logout drops the token but keeps the cart.
//!
//! When an admin URL is configured the user is sent there afterwards, with a
//! handoff token attached if the two apps share a handoff key.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::validation::{Credentials, Registration};
use shopfront_core::{AuthUser, FieldErrors};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Layout, clear_auth_token, set_auth_token, set_flash};
use crate::models::{Flash, StoredToken};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub errors: FieldErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub errors: FieldErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(layout: Layout) -> impl IntoResponse {
    LoginTemplate {
        layout,
        email: String::new(),
        errors: FieldErrors::new(),
    }
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
    let user = start_session(&state, &session, &stored).await?;
    Ok(Redirect::to(&after_login_url(&state, &user)).into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(layout: Layout) -> impl IntoResponse {
    RegisterTemplate {
        layout,
        name: String::new(),
        email: String::new(),
        errors: FieldErrors::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<Registration>,
) -> Result<Response> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                RegisterTemplate {
                    layout,
                    name: form.name,
                    email: form.email,
                    errors,
                },
            )
                .into_response());
        }
    };

    let stored = state.auth().register(&request).await;
    let user = start_session(&state, &session, &stored).await?;
    Ok(Redirect::to(&after_login_url(&state, &user)).into_response())
}

/// Store the token and greet the user.
async fn start_session(
    state: &AppState,
    session: &Session,
    stored: &StoredToken,
) -> Result<AuthUser> {
    set_auth_token(session, stored).await?;

    let user = state
        .auth()
        .authenticate(stored, Utc::now())
        .unwrap_or_else(AuthUser::default);
    set_sentry_user(user.id.as_deref(), user.email.as_deref());
    set_flash(
        session,
        Flash::success(format!("Welcome, {}", user.display_name())),
    )
    .await;
    Ok(user)
}

/// Where to go after login: the admin's handoff endpoint when a handoff key
/// is configured, else the admin itself, else the account page.
fn after_login_url(state: &AppState, user: &AuthUser) -> String {
    let Some(admin_url) = state.config().admin_url() else {
        return state.config().post_login_redirect().to_string();
    };
    match state.auth().handoff_token(user, Utc::now()) {
        Some(token) => format!(
            "{}/auth/handoff?token={}",
            admin_url.trim_end_matches('/'),
            urlencoding::encode(&token)
        ),
        None => admin_url.to_string(),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout. The cart survives.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_auth_token(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success("Logged out")).await;
    Ok(Redirect::to("/products"))
}
