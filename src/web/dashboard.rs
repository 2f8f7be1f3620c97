//! Dashboard handlers. Every route here runs behind
//! [`crate::auth::require_session`], which puts the [`Session`] in the
//! request extensions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

use super::Notice;
use crate::auth::Session;
use crate::models::{BotDraft, ScraperDraft};
use crate::views::{dashboard_page, DashboardView, FormKind, Toast};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub form: FormKind,
    pub notice: Option<Notice>,
}

/// Render the dashboard from the current snapshots without re-fetching.
async fn render(
    state: &AppState,
    session: &Session,
    active: FormKind,
    scraper_draft: ScraperDraft,
    bot_draft: BotDraft,
    toast: Option<Toast>,
) -> Html<String> {
    let scrapers = state.scrapers.snapshot().await;
    let bots = state.bots.snapshot().await;
    Html(dashboard_page(DashboardView {
        username: &session.username,
        active,
        scraper_draft,
        bot_draft,
        scrapers: &scrapers,
        bots: &bots,
        toast,
    }))
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let wait = state.config.mount_wait;
    tokio::join!(
        state.scrapers.load_within(wait),
        state.bots.load_within(wait)
    );

    render(
        &state,
        &session,
        query.form,
        ScraperDraft::default(),
        BotDraft::default(),
        query.notice.map(|notice| notice.toast(query.form)),
    )
    .await
}

/// Send the browser back to the dashboard with a one-shot notice, so a reload
/// does not repeat the POST.
fn redirect_with(form: FormKind, notice: Notice) -> Redirect {
    Redirect::to(&format!(
        "/dashboard?form={}&notice={}",
        form.as_str(),
        notice.as_str()
    ))
}

/// POST /dashboard/scrapers - Add a scraper; a rejected draft is shown again.
pub async fn add_scraper(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(draft): Form<ScraperDraft>,
) -> Response {
    let status = match draft.validate() {
        Ok(()) => match state.scrapers.add(draft.clone().into_item(None)).await {
            Some(item) => {
                tracing::info!(id = ?item.id, title = %item.title, "Scraper added");
                return redirect_with(FormKind::Scraper, Notice::Added).into_response();
            }
            None => StatusCode::BAD_GATEWAY,
        },
        Err(err) => {
            tracing::debug!(error = %err, "Scraper draft rejected");
            err.status_code()
        }
    };

    let page = render(
        &state,
        &session,
        FormKind::Scraper,
        draft,
        BotDraft::default(),
        Some(Toast::error("Failed to add scraper")),
    )
    .await;
    (status, page).into_response()
}

/// POST /dashboard/bots - Add a bot; a rejected draft is shown again.
pub async fn add_bot(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(draft): Form<BotDraft>,
) -> Response {
    let status = match draft.validate() {
        Ok(()) => match state.bots.add(draft.clone().into_item(None)).await {
            Some(item) => {
                tracing::info!(id = ?item.id, name = %item.name, "WhatsApp Bot added");
                return redirect_with(FormKind::Bot, Notice::Added).into_response();
            }
            None => StatusCode::BAD_GATEWAY,
        },
        Err(err) => {
            tracing::debug!(error = %err, "Bot draft rejected");
            err.status_code()
        }
    };

    let page = render(
        &state,
        &session,
        FormKind::Bot,
        ScraperDraft::default(),
        draft,
        Some(Toast::error("Failed to add WhatsApp Bot")),
    )
    .await;
    (status, page).into_response()
}

fn after_delete(form: FormKind, removed: bool) -> Redirect {
    let notice = if removed {
        Notice::Deleted
    } else {
        Notice::DeleteFailed
    };
    redirect_with(form, notice)
}

/// POST /dashboard/scrapers/{id}/delete
pub async fn delete_scraper_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    after_delete(FormKind::Scraper, state.scrapers.remove(&id).await)
}

/// POST /dashboard/bots/{id}/delete
pub async fn delete_bot_entry(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    after_delete(FormKind::Bot, state.bots.remove(&id).await)
}
