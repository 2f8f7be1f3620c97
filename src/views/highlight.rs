use std::sync::OnceLock;

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::escape_html;

const THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Highlighted `<pre>` block for a scraper snippet.
pub fn highlight_javascript(code: &str) -> String {
    let ss = syntax_set();
    let syntax = ss
        .find_syntax_by_token("js")
        .unwrap_or_else(|| ss.find_syntax_plain_text());

    theme_set()
        .themes
        .get(THEME)
        .and_then(|theme| highlighted_html_for_string(code, ss, syntax, theme).ok())
        .unwrap_or_else(|| format!("<pre><code>{}</code></pre>", escape_html(code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_escapes_markup() {
        let html = highlight_javascript("const x = '<script>';");
        assert!(html.starts_with("<pre"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
