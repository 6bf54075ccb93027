use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Label meaning "no category filter".
pub const ALL_CATEGORIES: &str = "전체";

/// One showcased project, normalized from a content-source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    pub cover_image_urls: Vec<String>,
    pub additional_image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl PortfolioItem {
    /// Cover images followed by supplementary ones.
    pub fn all_image_urls(&self) -> impl Iterator<Item = &str> {
        self.cover_image_urls
            .iter()
            .chain(&self.additional_image_urls)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub filter_type: Option<String>,
    pub page_size: Option<usize>,
    pub only_with_completed_at: bool,
}

impl ListOptions {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            filter_type: Some(category.into()),
            ..Default::default()
        }
    }

    /// Category to filter by, ignoring the "all" sentinel.
    pub fn category_filter(&self) -> Option<&str> {
        self.filter_type
            .as_deref()
            .filter(|t| !t.is_empty() && *t != ALL_CATEGORIES)
    }
}

/// Known category labels, current and legacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignType {
    Interior,
    Exterior,
    InteriorExterior,
    Draft,
    Banner,
    LedChannel,
    Acrylic,
    Neon,
    Composite,
    Other,
}

impl SignType {
    pub const ALL: [SignType; 10] = [
        SignType::Interior,
        SignType::Exterior,
        SignType::InteriorExterior,
        SignType::Draft,
        SignType::Banner,
        SignType::LedChannel,
        SignType::Acrylic,
        SignType::Neon,
        SignType::Composite,
        SignType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignType::Interior => "내부",
            SignType::Exterior => "외부",
            SignType::InteriorExterior => "내부/외부 통합",
            SignType::Draft => "시안",
            SignType::Banner => "현수막",
            SignType::LedChannel => "LED채널",
            SignType::Acrylic => "아크릴",
            SignType::Neon => "네온",
            SignType::Composite => "복합",
            SignType::Other => "기타",
        }
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SignType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown sign type: {s}"))
    }
}
