use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::auth::{clear_cookie, find_credential, session_token};
use crate::views::{self, CatalogSection, CatalogTab, Toast};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub tab: CatalogTab,
}

/// GET / - Catalog of the selected tab.
pub async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Html<String> {
    let wait = state.config.mount_wait;
    let html = match query.tab {
        CatalogTab::Scrapers => {
            let snapshot = state.scrapers.load_within(wait).await;
            views::home_page(CatalogSection::Scrapers(&snapshot), None)
        }
        CatalogTab::Bots => {
            let snapshot = state.bots.load_within(wait).await;
            views::home_page(CatalogSection::Bots(&snapshot), None)
        }
    };
    Html(html)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /login
pub async fn login_form() -> Html<String> {
    Html(views::login_page("", None))
}

/// POST /login - Check the credentials against `user.json` and open a session.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let users = state.users.fetch_all().await;

    match find_credential(&users, &form.username, &form.password) {
        Some(user) => {
            let session = state.sessions.create(&user.username).await;
            tracing::info!(username = %user.username, "Admin signed in");
            (
                [(header::SET_COOKIE, state.sessions.cookie_for(&session))],
                Redirect::to("/dashboard?notice=login"),
            )
                .into_response()
        }
        None => {
            tracing::warn!(username = %form.username, "Rejected login attempt");
            let toast = Toast::error("Invalid credentials");
            (
                StatusCode::UNAUTHORIZED,
                Html(views::login_page(&form.username, Some(toast))),
            )
                .into_response()
        }
    }
}

/// POST /logout - Drop the session and go back to the catalog.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Some(session) = state.sessions.revoke(&token).await {
            tracing::info!(
                username = %session.username,
                signed_in_at = %session.created_at,
                "Admin signed out"
            );
        }
    }
    ([(header::SET_COOKIE, clear_cookie())], Redirect::to("/")).into_response()
}
