//! Raw page record → [`PortfolioItem`].
//!
//! Field names have changed over the life of the source database; every
//! concept resolves through an ordered list of candidate names below.

use tracing::debug;

use crate::model::PortfolioItem;
use crate::notion::property::{extract_first_url, extract_urls};
use crate::notion::{Page, Property};

pub const TITLE_FIELD: &str = "병원명";
pub const LOCATION_FIELD: &str = "위치";
/// Current category field (multi_select).
pub const TYPE_FIELD: &str = "시공종류";
/// Pre-rename category field (select).
pub const LEGACY_TYPE_FIELD: &str = "간판종류";
pub const COMPLETED_FIELD: &str = "시공완료";
pub const DEPARTMENTS_FIELD: &str = "진료과목";
pub const DESCRIPTION_FIELD: &str = "설명";
pub const CREATED_FIELD: &str = "작성일";
pub const VISIBILITY_FIELD: &str = "노출여부";

pub const COVER_FIELDS: &[&str] = &["메인이미지", "메인 이미지", "대표이미지", "대표 이미지"];
pub const ADDITIONAL_FIELDS: &[&str] = &["보조이미지", "추가이미지"];

pub const TYPE_SEPARATOR: &str = " · ";

/// Map one record. Yields `None` when no title can be derived.
pub fn normalize(page: &Page) -> Option<PortfolioItem> {
    page.properties.as_ref()?;

    let title = resolve_title(page);
    if title.is_empty() {
        debug!("Skipping record {} without a title", page.id);
        return None;
    }

    let location = page
        .property(LOCATION_FIELD)
        .and_then(|p| p.rich_text().map(|t| t.concat()))
        .filter(|s| !s.is_empty());

    let description = page
        .property(DESCRIPTION_FIELD)
        .and_then(|p| p.rich_text().map(|t| t.join("\n")))
        .filter(|s| !s.is_empty());

    let completed_at = page
        .property(COMPLETED_FIELD)
        .and_then(|p| p.date_start())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let departments = page
        .property(DEPARTMENTS_FIELD)
        .and_then(|p| p.multi_select().map(|d| d.iter().map(|s| s.to_string()).collect::<Vec<_>>()))
        .filter(|d| !d.is_empty());

    let cover = first_files(page, COVER_FIELDS);
    let additional = first_files(page, ADDITIONAL_FIELDS);

    let cover_image_urls = cover.map(extract_urls).unwrap_or_default();
    if cover_image_urls.is_empty() {
        debug!("Record {} ({}) has no cover image", page.id, title);
    }

    let created_time = page
        .property(CREATED_FIELD)
        .and_then(|p| p.created_time())
        .filter(|s| !s.is_empty())
        .or(page.created_time.as_deref())
        .map(str::to_string);

    Some(PortfolioItem {
        id: page.id.clone(),
        location,
        kind: resolve_type(page),
        completed_at,
        departments,
        cover_image_url: cover.and_then(extract_first_url),
        cover_image_urls,
        additional_image_urls: additional.map(extract_urls).unwrap_or_default(),
        description,
        created_time,
        title,
    })
}

/// Named title field first, then the first title-typed property.
fn resolve_title(page: &Page) -> String {
    let source = match page.property(TITLE_FIELD) {
        Some(explicit) => Some(explicit),
        None => page
            .iter_properties()
            .map(|(_, p)| p)
            .find(Property::is_title),
    };
    source
        .and_then(|p| p.title().map(|t| t.concat()))
        .unwrap_or_default()
}

/// Current multi-select joined, else the legacy single select.
fn resolve_type(page: &Page) -> Option<String> {
    let current = page
        .property(TYPE_FIELD)
        .and_then(|p| p.multi_select().map(|names| names.join(TYPE_SEPARATOR)))
        .filter(|s| !s.is_empty());

    current.or_else(|| {
        page.property(LEGACY_TYPE_FIELD)
            .and_then(|p| p.select())
            .map(str::to_string)
    })
}

/// Files of the first candidate field that is a files property.
fn first_files<'a>(page: &'a Page, candidates: &[&str]) -> Option<&'a [serde_json::Value]> {
    candidates
        .iter()
        .find_map(|name| page.property(name).and_then(|p| p.files()))
}
