//! Admin dashboard: form selector, the two add forms and the manage list.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use super::{escape_html, Page, Toast, LOGO_URL};
use crate::catalog::Snapshot;
use crate::models::{BotDraft, BotItem, ButtonType, CatalogItem, ScraperDraft, ScraperItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    #[default]
    Scraper,
    Bot,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Scraper => "scraper",
            FormKind::Bot => "bot",
        }
    }
}

/// Everything the dashboard renders. Only the active form's draft is shown.
pub struct DashboardView<'a> {
    pub username: &'a str,
    pub active: FormKind,
    pub scraper_draft: ScraperDraft,
    pub bot_draft: BotDraft,
    pub scrapers: &'a Snapshot<ScraperItem>,
    pub bots: &'a Snapshot<BotItem>,
    pub toast: Option<Toast>,
}

pub fn dashboard_page(view: DashboardView<'_>) -> String {
    let (form, manage) = match view.active {
        FormKind::Scraper => (
            scraper_form(&view.scraper_draft),
            manage_list(view.scrapers, "scrapers", scraper_label),
        ),
        FormKind::Bot => (
            bot_form(&view.bot_draft),
            manage_list(view.bots, "bots", bot_label),
        ),
    };

    let body = format!(
        r#"<nav class="navbar">
  <a href="/" class="back-link">Back to Home</a>
  <img src="{logo}" alt="SCode Logo" class="logo-small">
  <form method="post" action="/logout" class="inline">
    <span class="signed-in">{username}</span>
    <button type="submit" class="btn btn-ghost">Logout</button>
  </form>
</nav>
<main class="dashboard">
  <div class="selector">
    {scraper_tab}
    {bot_tab}
  </div>
  <div class="panel">
{form}
  </div>
  <div class="panel manage">
    <h2>Manage entries</h2>
{manage}
  </div>
</main>"#,
        logo = LOGO_URL,
        username = escape_html(view.username),
        scraper_tab = selector_link(view.active, FormKind::Scraper, "Add Scraper"),
        bot_tab = selector_link(view.active, FormKind::Bot, "Add WA Bot"),
        form = form,
        manage = manage,
    );

    Page::new("Dashboard", body).toast(view.toast).render()
}

fn selector_link(active: FormKind, kind: FormKind, label: &str) -> String {
    let class = if active == kind { "tab active" } else { "tab" };
    format!(
        r#"<a href="/dashboard?form={}" class="{}">{}</a>"#,
        kind.as_str(),
        class,
        label
    )
}

fn text_field(id: &str, label: &str, input_type: &str, value: &str) -> String {
    format!(
        r#"<label for="{id}">{label}</label>
<input id="{id}" name="{id}" type="{input_type}" value="{value}" required>"#,
        id = id,
        label = label,
        input_type = input_type,
        value = escape_html(value),
    )
}

fn text_area(id: &str, label: &str, rows: u32, value: &str, class: &str) -> String {
    format!(
        r#"<label for="{id}">{label}</label>
<textarea id="{id}" name="{id}" rows="{rows}" class="{class}" required>{value}</textarea>"#,
        id = id,
        label = label,
        rows = rows,
        class = class,
        value = escape_html(value),
    )
}

fn scraper_form(draft: &ScraperDraft) -> String {
    format!(
        r#"<form method="post" action="/dashboard/scrapers" class="form" data-busy-form>
{title}
{creator}
{description}
{code}
{creator_url}
<button type="submit" class="btn btn-primary btn-block" data-busy-label="Adding Scraper...">Add Scraper</button>
</form>"#,
        title = text_field("title", "Title", "text", &draft.title),
        creator = text_field("creator", "Creator Name", "text", &draft.creator),
        description = text_area("description", "Description", 3, &draft.description, ""),
        code = text_area("code", "Code", 10, &draft.code, "mono"),
        creator_url = text_field("creatorUrl", "Creator URL", "url", &draft.creator_url),
    )
}

fn bot_form(draft: &BotDraft) -> String {
    let checked = |kind: ButtonType| {
        if draft.button_type == kind {
            " checked"
        } else {
            ""
        }
    };
    format!(
        r#"<form method="post" action="/dashboard/bots" class="form" data-busy-form>
{name}
{creator}
{description}
{image_url}
<p class="hint">Use a direct image URL (e.g., https://example.com/image.jpg)</p>
<fieldset class="button-type">
  <legend>Button Type</legend>
  <label><input type="radio" name="buttonType" value="download"{download}> Download</label>
  <label><input type="radio" name="buttonType" value="buy"{buy}> Buy</label>
</fieldset>
{button_url}
<button type="submit" class="btn btn-primary btn-block" data-busy-label="Adding WhatsApp Bot...">Add WhatsApp Bot</button>
</form>"#,
        name = text_field("name", "Bot Name", "text", &draft.name),
        creator = text_field("creator", "Creator Name", "text", &draft.creator),
        description = text_area("description", "Description", 3, &draft.description, ""),
        image_url = text_field("imageUrl", "Image URL", "url", &draft.image_url),
        download = checked(ButtonType::Download),
        buy = checked(ButtonType::Buy),
        button_url = text_field("buttonUrl", "Button URL", "url", &draft.button_url),
    )
}

fn scraper_label(item: &ScraperItem) -> &str {
    &item.title
}

fn bot_label(item: &BotItem) -> &str {
    &item.name
}

/// Entries of one collection. Entries without an id cannot be deleted.
/// Everything but `-`, `_` and `~` is escaped, so an id can neither leave
/// its path segment nor be collapsed as a dot segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

fn manage_list<T: CatalogItem>(
    snapshot: &Snapshot<T>,
    segment: &str,
    label: fn(&T) -> &str,
) -> String {
    if snapshot.loading {
        return r#"<p class="empty">Loading...</p>"#.to_string();
    }
    if snapshot.items.is_empty() {
        return r#"<p class="empty">No entries yet.</p>"#.to_string();
    }

    let rows: String = snapshot
        .items
        .iter()
        .map(|item| {
            let control = match item.id() {
                Some(id) => format!(
                    r#"<form method="post" action="/dashboard/{}/{}/delete" class="inline"><button type="submit" class="btn btn-danger">Delete</button></form>"#,
                    segment,
                    utf8_percent_encode(id, ID_SEGMENT)
                ),
                None => r#"<span class="legacy">legacy entry</span>"#.to_string(),
            };
            format!(
                "<li><span>{}</span>{}</li>\n",
                escape_html(label(item)),
                control
            )
        })
        .collect();
    format!("<ul class=\"entries\">\n{}</ul>", rows)
}
