//! WhatsApp bot listing model stored in `database2.json`.

use serde::{Deserialize, Serialize};

use super::{require_filled, CatalogItem};
use crate::errors::AppError;

/// Call to action rendered on a bot card.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    #[default]
    Download,
    Buy,
}

/// A WhatsApp bot listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BotItem {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub image_url: String,
    pub button_type: ButtonType,
    pub button_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CatalogItem for BotItem {
    const LABEL: &'static str = "WhatsApp Bot";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), AppError> {
        require_filled(&[
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
            ("creator", self.creator.as_str()),
            ("imageUrl", self.image_url.as_str()),
            ("buttonUrl", self.button_url.as_str()),
        ])
    }
}

/// Form and request body for a bot; the button type defaults to download.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BotDraft {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub image_url: String,
    pub button_type: ButtonType,
    pub button_url: String,
}

impl BotDraft {
    /// Reject drafts with blank required fields. URLs are not checked.
    pub fn validate(&self) -> Result<(), AppError> {
        require_filled(&[
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
            ("creator", self.creator.as_str()),
            ("imageUrl", self.image_url.as_str()),
            ("buttonUrl", self.button_url.as_str()),
        ])
    }

    pub fn into_item(self, id: Option<String>) -> BotItem {
        BotItem {
            name: self.name,
            description: self.description,
            creator: self.creator,
            image_url: self.image_url,
            button_type: self.button_type,
            button_url: self.button_url,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_type_wire_format() {
        let raw = r#"{"name":"n","description":"d","creator":"c","imageUrl":"https://i","buttonType":"buy","buttonUrl":"https://b"}"#;
        let bot: BotItem = serde_json::from_str(raw).unwrap();
        assert_eq!(bot.button_type, ButtonType::Buy);
        assert!(bot.id.is_none());

        assert!(serde_json::from_str::<BotItem>(&raw.replace("buy", "rent")).is_err());
    }

    #[test]
    fn test_draft_defaults_to_download() {
        let draft: BotDraft = serde_json::from_str(r#"{"name":"n"}"#).unwrap();
        assert_eq!(draft.button_type, ButtonType::Download);
        assert!(draft.validate().is_err());
    }
}
