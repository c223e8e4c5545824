//! Users directory.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::User;

use crate::filters;
use crate::middleware::Layout;
use crate::state::AppState;

/// User display data for templates.
#[derive(Clone)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub initial: String,
    pub selected: bool,
}

/// Directory query parameters.
#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub selected: Option<String>,
}

/// Users directory template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub layout: Layout,
    pub users: Vec<UserView>,
    pub selected: Option<UserView>,
    pub offline: bool,
}

/// Pick the selected user: the requested id if present, else the first.
fn selected_id(users: &[User], requested: Option<&str>) -> Option<i64> {
    let requested = requested.and_then(|s| s.trim().parse::<i64>().ok());
    requested
        .filter(|id| users.iter().any(|u| u.id.as_i64() == *id))
        .or_else(|| users.first().map(|u| u.id.as_i64()))
}

/// Display the users directory with a detail panel.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    Query(query): Query<UsersQuery>,
) -> impl IntoResponse {
    let (users, source) = state.catalog().users().await;
    let selected = selected_id(&users, query.selected.as_deref());

    let users: Vec<UserView> = users
        .iter()
        .map(|u| UserView {
            id: u.id.as_i64(),
            name: u.name.clone(),
            email: u.email.clone(),
            initial: u.initial(),
            selected: Some(u.id.as_i64()) == selected,
        })
        .collect();

    UsersIndexTemplate {
        layout,
        selected: users.iter().find(|u| u.selected).cloned(),
        users,
        offline: source.is_sample(),
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::UserId;

    use super::*;

    fn users() -> Vec<User> {
        (1..=3)
            .map(|i| User {
                id: UserId::new(i),
                name: format!("U{i}"),
                email: format!("u{i}@x.y"),
            })
            .collect()
    }

    #[test]
    fn test_selected_defaults_to_first() {
        assert_eq!(selected_id(&users(), None), Some(1));
        assert_eq!(selected_id(&users(), Some("99")), Some(1));
        assert_eq!(selected_id(&users(), Some("x")), Some(1));
        assert_eq!(selected_id(&users(), Some("3")), Some(3));
        assert_eq!(selected_id(&[], Some("3")), None);
    }
}
