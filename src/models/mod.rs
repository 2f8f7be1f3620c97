//! Data models for the SCode catalog.
//!
//! Wire names follow the JSON files kept in the remote repository (camelCase).

mod bot;
mod scraper;
mod user;

pub use bot::*;
pub use scraper::*;
pub use user::*;

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

/// An entry of a catalog collection persisted as one JSON array.
///
/// Entries written before ids were introduced carry no `id` and cannot be
/// addressed by edit or delete.
pub trait CatalogItem: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Singular label used in logs and notifications.
    const LABEL: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Reject entries with blank required fields.
    fn validate(&self) -> Result<(), AppError>;

    /// Whether this entry is the one identified by `id`.
    fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }
}

/// Generate a fresh entry identifier.
pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Check a whole collection before it replaces the stored one: every entry
/// must be complete and no id may appear twice.
pub fn validate_collection<T: CatalogItem>(items: &[T]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        item.validate().map_err(|e| {
            AppError::Validation(format!("Entry {}: {}", index, e.message()))
        })?;
        if let Some(id) = item.id() {
            if !seen.insert(id) {
                return Err(AppError::Validation(format!("Duplicate id: {}", id)));
            }
        }
    }
    Ok(())
}

/// Fail with the names of required fields that are blank.
pub(crate) fn require_filled(fields: &[(&str, &str)]) -> Result<(), AppError> {
    let blanks = blank_fields(fields);
    if blanks.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Required fields missing: {}",
            blanks.join(", ")
        )))
    }
}

/// Names of required fields that are blank.
pub(crate) fn blank_fields<'a>(fields: &[(&'a str, &str)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_ids_are_unique() {
        let a = new_item_id();
        let b = new_item_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    fn bot(id: Option<&str>) -> BotItem {
        BotDraft {
            name: "n".into(),
            description: "d".into(),
            creator: "c".into(),
            image_url: "https://i".into(),
            button_type: ButtonType::Buy,
            button_url: "https://b".into(),
        }
        .into_item(id.map(str::to_string))
    }

    #[test]
    fn test_collection_rejects_repeated_ids() {
        assert!(validate_collection(&[bot(Some("a")), bot(None), bot(None), bot(Some("b"))]).is_ok());
        assert!(validate_collection::<BotItem>(&[]).is_ok());

        let err = validate_collection(&[bot(Some("a")), bot(Some("a"))]).unwrap_err();
        assert_eq!(err.message(), "Duplicate id: a");
    }

    #[test]
    fn test_collection_rejects_incomplete_rows() {
        let mut blank = bot(Some("b"));
        blank.button_url = " ".into();
        let err = validate_collection(&[bot(Some("a")), blank]).unwrap_err();
        assert_eq!(err.message(), "Entry 1: Required fields missing: buttonUrl");
    }

    #[test]
    fn test_blank_fields() {
        let blanks = blank_fields(&[("title", "x"), ("code", "   "), ("creator", "")]);
        assert_eq!(blanks, vec!["code", "creator"]);
    }
}
