//! HTML routes: public catalog, login/logout and the admin dashboard.

mod assets;
mod dashboard;
mod pages;

pub use assets::*;
pub use dashboard::*;
pub use pages::*;

use serde::Deserialize;

use crate::views::{FormKind, Toast};

/// One-shot notification carried across a redirect in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    Login,
    Added,
    Deleted,
    DeleteFailed,
}

impl Notice {
    /// Toast for the dashboard showing `form`.
    pub fn toast(self, form: FormKind) -> Toast {
        match self {
            Notice::Login => Toast::success("Login successful!"),
            Notice::Added => match form {
                FormKind::Scraper => Toast::success("Scraper added successfully!"),
                FormKind::Bot => Toast::success("WhatsApp Bot added successfully!"),
            },
            Notice::Deleted => Toast::success("Entry deleted"),
            Notice::DeleteFailed => Toast::error("Failed to delete entry"),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Notice::Login => "login",
            Notice::Added => "added",
            Notice::Deleted => "deleted",
            Notice::DeleteFailed => "delete_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ToastKind;

    #[test]
    fn test_notice_query_values() {
        for notice in [
            Notice::Login,
            Notice::Added,
            Notice::Deleted,
            Notice::DeleteFailed,
        ] {
            let parsed: Notice =
                serde_json::from_value(serde_json::Value::String(notice.as_str().to_string()))
                    .unwrap();
            assert_eq!(parsed, notice);
        }
        assert_eq!(
            Notice::DeleteFailed.toast(FormKind::Bot).kind,
            ToastKind::Error
        );
    }

    #[test]
    fn test_added_notice_names_the_form() {
        let scraper = Notice::Added.toast(FormKind::Scraper);
        assert_eq!(scraper.kind, ToastKind::Success);
        assert_eq!(scraper.message, "Scraper added successfully!");
        assert_eq!(
            Notice::Added.toast(FormKind::Bot).message,
            "WhatsApp Bot added successfully!"
        );
    }
}
