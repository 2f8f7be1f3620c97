//! Server-rendered HTML.
//!
//! Every piece of user-supplied text goes through [`escape_html`]; links built
//! from stored URLs go through [`safe_href`].

mod catalog;
mod dashboard;
mod highlight;
mod login;

pub use catalog::*;
pub use dashboard::*;
pub use highlight::highlight_javascript;
pub use login::*;

pub const LOGO_URL: &str = "https://pomf2.lain.la/f/b4k5if9w.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notification shown in the corner of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        let class = match self.kind {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
        };
        format!(
            r#"<div class="{}" role="status" data-toast>{}</div>"#,
            class,
            escape_html(&self.message)
        )
    }
}

/// A full HTML document around a page body.
pub struct Page {
    title: String,
    body: String,
    toast: Option<Toast>,
    refresh_secs: Option<u32>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            body,
            toast: None,
            refresh_secs: None,
        }
    }

    pub fn toast(mut self, toast: Option<Toast>) -> Self {
        self.toast = toast;
        self
    }

    /// Ask the browser to reload the page, used while data is still loading.
    pub fn refresh_after(mut self, secs: u32) -> Self {
        self.refresh_secs = Some(secs);
        self
    }

    pub fn render(&self) -> String {
        let refresh = self
            .refresh_secs
            .map(|s| format!(r#"<meta http-equiv="refresh" content="{}">"#, s))
            .unwrap_or_default();
        let toast = self.toast.as_ref().map(Toast::render).unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · SCode</title>
<link rel="icon" href="{logo}">
<link rel="stylesheet" href="/assets/app.css">
{refresh}
</head>
<body>
{body}
<div class="toasts" id="toasts">{toast}</div>
<script src="/assets/app.js" defer></script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            logo = LOGO_URL,
            refresh = refresh,
            body = self.body,
            toast = toast,
        )
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped `href` for a stored URL; anything but http(s) becomes `#`.
pub fn safe_href(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        escape_html(trimmed)
    } else {
        "#".to_string()
    }
}
