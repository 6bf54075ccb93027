use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("request timed out")]
    Timeout,

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("content source returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid site url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("sitemap: {0}")]
    Sitemap(String),

    /// Domain-level failure surfaced by the listing fetcher.
    #[error("failed to load listing data")]
    ListingUnavailable(#[source] Box<PortfolioError>),
}

impl From<reqwest::Error> for PortfolioError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PortfolioError::Timeout
        } else {
            PortfolioError::Http(e)
        }
    }
}

impl PortfolioError {
    /// Wrap into the listing failure, without double wrapping.
    pub fn into_listing(self) -> Self {
        match self {
            e @ PortfolioError::ListingUnavailable(_) => e,
            other => PortfolioError::ListingUnavailable(Box::new(other)),
        }
    }
}
