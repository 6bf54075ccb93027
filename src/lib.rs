//! Data layer for the signage portfolio site: pulls project records from the
//! Notion database, normalizes them into [`PortfolioItem`]s and orders them
//! for display.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod notion;
pub mod portfolio;
pub mod query;
pub mod signed_url;
pub mod sitemap;

pub use config::Config;
pub use error::{PortfolioError, Result};
pub use model::{ListOptions, PortfolioItem, SignType, ALL_CATEGORIES};
pub use normalize::normalize;
pub use notion::{ContentSource, NotionClient};
pub use portfolio::{canonical_id, sort_for_display, Portfolio};
