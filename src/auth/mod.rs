//! Admin authentication.
//!
//! Credentials are compared in constant time. The dashboard is guarded by a
//! session cookie; the JSON API additionally accepts a pre-shared key.

mod session;

pub use session::*;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::Credential;
use crate::AppState;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Find the stored credential matching both fields exactly.
pub fn find_credential<'a>(
    users: &'a [Credential],
    username: &str,
    password: &str,
) -> Option<&'a Credential> {
    users.iter().find(|user| {
        let name_ok = constant_time_compare(&user.username, username);
        let pass_ok = constant_time_compare(&user.password, password);
        name_ok & pass_ok
    })
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn provided_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

async fn live_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = session_token(headers)?;
    state.sessions.validate(&token).await
}

/// Guard for dashboard routes: without a live session, go to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match live_session(&state, request.headers()).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Guard for JSON API writes: a live session or the configured API key.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key_matches = match (
        state.config.api_key.as_deref(),
        provided_api_key(request.headers()),
    ) {
        // Constant-time comparison to prevent timing attacks
        (Some(expected), Some(provided)) => Some(constant_time_compare(provided, expected)),
        _ => None,
    };

    match key_matches {
        Some(true) => return next.run(request).await,
        Some(false) => {
            return AppError::Unauthorized("Invalid API key".to_string()).into_response()
        }
        None => {}
    }

    if live_session(&state, request.headers()).await.is_some() {
        return next.run(request).await;
    }

    AppError::Unauthorized("Missing session or API key".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<Credential> {
        vec![
            Credential {
                username: "admin".to_string(),
                password: "Secret1".to_string(),
            },
            Credential {
                username: "editor".to_string(),
                password: "hunter2".to_string(),
            },
        ]
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
        assert!(!constant_time_compare("short", "much-longer-key"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_find_credential_exact_match_only() {
        let users = users();
        assert_eq!(
            find_credential(&users, "editor", "hunter2").map(|u| u.username.as_str()),
            Some("editor")
        );
        assert!(find_credential(&users, "admin", "secret1").is_none());
        assert!(find_credential(&users, "Admin", "Secret1").is_none());
        assert!(find_credential(&users, "admin", "hunter2").is_none());
        assert!(find_credential(&[], "admin", "Secret1").is_none());
    }

    #[test]
    fn test_api_key_from_either_header() {
        let mut headers = HeaderMap::new();
        assert!(provided_api_key(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Bearer k1".parse().unwrap());
        assert_eq!(provided_api_key(&headers), Some("k1"));

        headers.insert(API_KEY_HEADER, "k2".parse().unwrap());
        assert_eq!(provided_api_key(&headers), Some("k2"));
    }
}
