//! Public catalog page: hero, tab selector, card grid and footer.

use serde::Deserialize;

use super::{escape_html, highlight_javascript, safe_href, Page, Toast, LOGO_URL};
use crate::catalog::Snapshot;
use crate::models::{BotItem, ButtonType, ScraperItem};

/// Placeholder cards shown while a collection is loading.
pub const SKELETON_CARDS: usize = 6;

/// Seconds before a page rendered mid-load reloads itself.
pub const LOADING_REFRESH_SECS: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogTab {
    #[default]
    Scrapers,
    Bots,
}

impl CatalogTab {
    fn heading(&self) -> &'static str {
        match self {
            CatalogTab::Scrapers => "Featured Scrapers",
            CatalogTab::Bots => "Featured WhatsApp Bots",
        }
    }
}

/// Snapshot backing the active tab.
pub enum CatalogSection<'a> {
    Scrapers(&'a Snapshot<ScraperItem>),
    Bots(&'a Snapshot<BotItem>),
}

impl CatalogSection<'_> {
    fn tab(&self) -> CatalogTab {
        match self {
            CatalogSection::Scrapers(_) => CatalogTab::Scrapers,
            CatalogSection::Bots(_) => CatalogTab::Bots,
        }
    }

    fn loading(&self) -> bool {
        match self {
            CatalogSection::Scrapers(s) => s.loading,
            CatalogSection::Bots(s) => s.loading,
        }
    }

    fn grid(&self) -> String {
        match self {
            CatalogSection::Scrapers(s) => card_grid(*s, scraper_card),
            CatalogSection::Bots(s) => card_grid(*s, bot_card),
        }
    }
}

pub fn home_page(section: CatalogSection<'_>, toast: Option<Toast>) -> String {
    let tab = section.tab();
    let body = format!(
        r#"<section class="hero">
  <div class="hero-inner">
    <img src="{logo}" alt="SCode Logo" class="logo">
    <h1 class="brand">SCode</h1>
    <p class="tagline">Discover and share powerful web scraping solutions and WhatsApp bots. Join our community of developers.</p>
    <div class="socials">
      <a href="https://instagram.com" target="_blank" rel="noopener noreferrer" class="social social-instagram">Instagram</a>
      <a href="https://wa.me/your-number" target="_blank" rel="noopener noreferrer" class="social social-whatsapp">WhatsApp</a>
      <a href="https://t.me/your-username" target="_blank" rel="noopener noreferrer" class="social social-telegram">Telegram</a>
    </div>
    <a href="/login" class="btn btn-primary btn-large">CF-Team</a>
  </div>
</section>
<nav class="tabs">
  {scrapers_tab}
  {bots_tab}
</nav>
<main class="content">
  <h2>{heading}</h2>
  <div class="grid">
{grid}
  </div>
</main>
<footer class="footer">
  <div class="footer-brand"><img src="{logo}" alt="SCode Logo" class="logo-small"><span>SCode</span></div>
  <a href="https://github.com/YoshCasaster" target="_blank" rel="noopener noreferrer">YoshCasaster</a>
</footer>"#,
        logo = LOGO_URL,
        scrapers_tab = tab_link(tab, CatalogTab::Scrapers, "/?tab=scrapers", "Scrapers"),
        bots_tab = tab_link(tab, CatalogTab::Bots, "/?tab=bots", "WA Bots"),
        heading = tab.heading(),
        grid = section.grid(),
    );

    let mut page = Page::new("Home", body).toast(toast);
    if section.loading() {
        page = page.refresh_after(LOADING_REFRESH_SECS);
    }
    page.render()
}

fn tab_link(active: CatalogTab, tab: CatalogTab, href: &str, label: &str) -> String {
    let class = if active == tab { "tab active" } else { "tab" };
    format!(r#"<a href="{}" class="{}">{}</a>"#, href, class, label)
}

/// Skeletons while loading, otherwise one card per item (possibly none).
fn card_grid<T>(snapshot: &Snapshot<T>, card: fn(&T) -> String) -> String {
    if snapshot.loading {
        return skeleton_card().repeat(SKELETON_CARDS);
    }
    if snapshot.items.is_empty() {
        return r#"<p class="empty">Nothing here yet.</p>"#.to_string();
    }
    snapshot.items.iter().map(card).collect()
}

fn skeleton_card() -> &'static str {
    r#"<div class="card skeleton" aria-hidden="true">
  <div class="skeleton-line skeleton-title"></div>
  <div class="skeleton-line"></div>
  <div class="skeleton-line skeleton-short"></div>
</div>
"#
}

/// Scraper card. The code stays blurred until "Follow Creator" is clicked;
/// the raw text sits in a hidden textarea for the copy button.
pub fn scraper_card(scraper: &ScraperItem) -> String {
    format!(
        r#"<article class="card scraper-card">
  <header class="card-header">
    <div>
      <h3>{title}</h3>
      <p class="creator">{creator}</p>
    </div>
    <span class="badge">JS</span>
  </header>
  <p class="description">{description}</p>
  <details class="code-section">
    <summary>View Code</summary>
    <div class="code-frame" data-code-frame>
      <button type="button" class="btn btn-primary btn-block" data-copy hidden>Copy Code</button>
      <div class="code-view blurred" data-code-view>{highlighted}</div>
      <div class="code-lock" data-code-lock>
        <a href="{creator_url}" target="_blank" rel="noopener noreferrer" class="btn btn-primary" data-follow>Follow Creator</a>
      </div>
      <textarea class="code-source" hidden readonly>{raw}</textarea>
    </div>
  </details>
</article>
"#,
        title = escape_html(&scraper.title),
        creator = escape_html(&scraper.creator),
        description = escape_html(&scraper.description),
        highlighted = highlight_javascript(&scraper.code),
        creator_url = safe_href(&scraper.creator_url),
        raw = escape_html(&scraper.code),
    )
}

pub fn bot_card(bot: &BotItem) -> String {
    let (action_class, label) = match bot.button_type {
        ButtonType::Buy => ("btn btn-primary btn-block action-buy", "Buy Now"),
        ButtonType::Download => ("btn btn-success btn-block action-download", "Download Now"),
    };
    format!(
        r#"<article class="card bot-card">
  <img src="{image}" alt="{name}" class="bot-image" loading="lazy">
  <h3>{name}</h3>
  <p class="creator">by {creator}</p>
  <p class="description">{description}</p>
  <a href="{url}" target="_blank" rel="noopener noreferrer" class="{class}">{label}</a>
</article>
"#,
        image = safe_href(&bot.image_url),
        name = escape_html(&bot.name),
        creator = escape_html(&bot.creator),
        description = escape_html(&bot.description),
        url = safe_href(&bot.button_url),
        class = action_class,
        label = label,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper(title: &str) -> ScraperItem {
        ScraperItem {
            title: title.to_string(),
            description: "search pins".to_string(),
            creator: "yosh".to_string(),
            code: "const a = 1 < 2;".to_string(),
            creator_url: "https://github.com/yosh".to_string(),
            id: None,
        }
    }

    fn bot(button_type: ButtonType) -> BotItem {
        BotItem {
            name: "Helper".to_string(),
            description: "answers".to_string(),
            creator: "yosh".to_string(),
            image_url: "https://img.example/bot.png".to_string(),
            button_type,
            button_url: "https://shop.example/bot".to_string(),
            id: Some("b1".to_string()),
        }
    }

    #[test]
    fn test_loading_renders_six_skeletons() {
        let snapshot: Snapshot<ScraperItem> = Snapshot::default();
        let html = home_page(CatalogSection::Scrapers(&snapshot), None);
        assert_eq!(html.matches("card skeleton").count(), SKELETON_CARDS);
        assert!(html.contains(r#"http-equiv="refresh""#));
        assert!(!html.contains("scraper-card"));
    }

    #[test]
    fn test_empty_collection_renders_no_cards() {
        let snapshot: Snapshot<BotItem> = Snapshot {
            items: Vec::new(),
            loading: false,
        };
        let html = home_page(CatalogSection::Bots(&snapshot), None);
        assert_eq!(html.matches("<article").count(), 0);
        assert_eq!(html.matches("card skeleton").count(), 0);
        assert!(html.contains("Featured WhatsApp Bots"));
        assert!(!html.contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn test_one_card_per_item() {
        let snapshot = Snapshot {
            items: vec![scraper("one"), scraper("two"), scraper("three")],
            loading: false,
        };
        let html = home_page(CatalogSection::Scrapers(&snapshot), None);
        assert_eq!(html.matches("card scraper-card").count(), 3);
        assert!(html.contains(r#"class="tab active">Scrapers"#));
    }

    #[test]
    fn test_scraper_card_is_escaped_and_locked() {
        let html = scraper_card(&scraper("<b>Pins</b>"));
        assert!(html.contains("&lt;b&gt;Pins&lt;/b&gt;"));
        assert!(!html.contains("<b>Pins</b>"));
        assert!(html.contains("code-view blurred"));
        assert!(html.contains(r#"href="https://github.com/yosh""#));
        assert!(html.contains("Follow Creator"));
        assert!(html.contains("data-copy hidden"));
        assert!(html.contains("const a = 1 &lt; 2;</textarea>"));
    }

    #[test]
    fn test_bot_card_actions() {
        let buy = bot_card(&bot(ButtonType::Buy));
        assert!(buy.contains("Buy Now"));
        assert!(buy.contains("action-buy"));
        assert!(buy.contains("by yosh"));

        let download = bot_card(&bot(ButtonType::Download));
        assert!(download.contains("Download Now"));
        assert!(download.contains("action-download"));
    }

    #[test]
    fn test_bot_card_neutralises_script_urls() {
        let mut item = bot(ButtonType::Buy);
        item.button_url = "javascript:alert(1)".to_string();
        let html = bot_card(&item);
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"href="#""##));
    }
}
