use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::model::{ListOptions, PortfolioItem};
use crate::normalize::normalize;
use crate::notion::{ContentSource, Page};
use crate::query::{build_query, build_unfiltered_query};

static NON_HEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9a-fA-F]").unwrap());

/// Read API over a content source: listings and single-item lookups.
pub struct Portfolio<S> {
    source: S,
}

impl<S: ContentSource> Portfolio<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Visible items in display order. Any upstream failure becomes
    /// [`PortfolioError::ListingUnavailable`](crate::PortfolioError::ListingUnavailable).
    pub async fn list_all(&self, options: &ListOptions) -> Result<Vec<PortfolioItem>> {
        self.load(options).await.map_err(|e| {
            error!("Listing failed: {}", e);
            e.into_listing()
        })
    }

    async fn load(&self, options: &ListOptions) -> Result<Vec<PortfolioItem>> {
        let first = self.source.query(&build_query(options)).await?;
        let mut items = normalize_all(&first.results);

        // Sources that never set the visibility flag return nothing for the
        // filtered query; retry once unfiltered unless a category was asked for.
        if items.is_empty() && options.filter_type.as_deref().map_or(true, str::is_empty) {
            info!("Filtered listing empty, retrying without filter");
            let fallback = self
                .source
                .query(&build_unfiltered_query(options.page_size))
                .await?;
            items = normalize_all(&fallback.results);
        }

        if options.only_with_completed_at {
            items.retain(|p| p.completed_at.is_some());
        }

        sort_for_display(&mut items);

        if let Some(size) = options.page_size {
            items.truncate(size);
        }
        Ok(items)
    }

    /// Look up one item. Malformed ids and unknown ids yield `Ok(None)`.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PortfolioItem>> {
        let Some(canonical) = canonical_id(id) else {
            return Ok(None);
        };

        match self.source.retrieve(&hyphenate(&canonical)).await {
            Ok(page) => {
                if let Some(item) = normalize(&page) {
                    return Ok(Some(item));
                }
            }
            Err(e) => warn!("Direct retrieve of {} failed, scanning listing: {}", canonical, e),
        }

        let items = self.list_all(&ListOptions::default()).await?;
        Ok(items
            .into_iter()
            .find(|p| canonical_id(&p.id).as_deref() == Some(canonical.as_str())))
    }

    pub async fn filter_by_category(&self, category: &str) -> Result<Vec<PortfolioItem>> {
        self.list_all(&ListOptions::category(category)).await
    }
}

fn normalize_all(pages: &[Page]) -> Vec<PortfolioItem> {
    pages.iter().filter_map(normalize).collect()
}

/// Dated items first, then newest first within each group.
pub fn sort_for_display(items: &mut [PortfolioItem]) {
    items.sort_by(|a, b| {
        match (a.completed_at.is_some(), b.completed_at.is_some()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => sort_key(b).cmp(&sort_key(a)),
        }
    });
}

/// Milliseconds since epoch from `completed_at`, else `created_time`, else 0.
fn sort_key(item: &PortfolioItem) -> i64 {
    item.completed_at
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| item.created_time.as_deref().and_then(parse_timestamp))
        .unwrap_or(0)
}

/// Date-only (`YYYY-MM-DD`) or RFC 3339 timestamps; naive ones are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// The 32-hex-digit form of a record id (lowercase), or `None` if the input
/// does not contain one.
pub fn canonical_id(input: &str) -> Option<String> {
    let hex = NON_HEX.replace_all(input, "");
    if hex.len() < 32 {
        return None;
    }
    Some(hex[hex.len() - 32..].to_ascii_lowercase())
}

/// 8-4-4-4-12 form expected by the retrieve endpoint. Takes the output of
/// [`canonical_id`].
fn hyphenate(canonical: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &canonical[0..8],
        &canonical[8..12],
        &canonical[12..16],
        &canonical[16..20],
        &canonical[20..32]
    )
}
