//! Scraper snippet model stored in `database.json`.

use serde::{Deserialize, Serialize};

use super::{require_filled, CatalogItem};
use crate::errors::AppError;

/// A community-submitted web scraper snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScraperItem {
    pub title: String,
    pub description: String,
    pub creator: String,
    pub code: String,
    pub creator_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CatalogItem for ScraperItem {
    const LABEL: &'static str = "scraper";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), AppError> {
        require_filled(&[
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("creator", self.creator.as_str()),
            ("code", self.code.as_str()),
            ("creatorUrl", self.creator_url.as_str()),
        ])
    }
}

/// Form and request body for a scraper; every field starts empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScraperDraft {
    pub title: String,
    pub description: String,
    pub creator: String,
    pub code: String,
    pub creator_url: String,
}

impl ScraperDraft {
    /// Reject drafts with blank required fields. URLs are not checked.
    pub fn validate(&self) -> Result<(), AppError> {
        require_filled(&[
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("creator", self.creator.as_str()),
            ("code", self.code.as_str()),
            ("creatorUrl", self.creator_url.as_str()),
        ])
    }

    pub fn into_item(self, id: Option<String>) -> ScraperItem {
        ScraperItem {
            title: self.title,
            description: self.description,
            creator: self.creator,
            code: self.code,
            creator_url: self.creator_url,
            id,
        }
    }
}
