use url::Url;

use crate::args::PositiveU64;
use crate::error::HttpError;

/// Path of the paginated list endpoint, relative to the base URL.
pub const POSTS_PATH: &str = "/api/v1/posts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u64,
    pub size: u64,
}

impl PageQuery {
    #[must_use]
    pub const fn from_offset(offset: u64, limit: PositiveU64) -> Self {
        Self {
            page: page_for_offset(offset, limit),
            size: limit.get(),
        }
    }

    /// Value of the `name` tag used to group metrics.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("page_{}", self.page)
    }
}

/// 1-based page containing row `offset`: `floor(offset / limit) + 1`.
#[must_use]
pub const fn page_for_offset(offset: u64, limit: PositiveU64) -> u64 {
    (offset / limit.get()).saturating_add(1)
}

/// The resolved request target for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: Url,
    pub query: PageQuery,
    pub offset: u64,
}

impl Target {
    #[must_use]
    pub fn tag(&self) -> String {
        self.query.tag()
    }
}

/// Builds `{base_url}/api/v1/posts?page={page}&size={limit}`.
///
/// # Errors
///
/// Returns an error when the base URL does not parse, is not http(s), or
/// already carries a query string or fragment.
pub fn build_target(base_url: &str, offset: u64, limit: PositiveU64) -> Result<Target, HttpError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let base = Url::parse(trimmed).map_err(|err| HttpError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source: err,
    })?;
    if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
        return Err(HttpError::UnsupportedScheme {
            url: base_url.to_owned(),
        });
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(HttpError::BaseUrlHasQuery {
            url: base_url.to_owned(),
        });
    }

    let query = PageQuery::from_offset(offset, limit);
    let mut url = base;
    let path = format!("{}{}", url.path().trim_end_matches('/'), POSTS_PATH);
    url.set_path(&path);
    url.query_pairs_mut()
        .append_pair("page", &query.page.to_string())
        .append_pair("size", &query.size.to_string());

    Ok(Target { url, query, offset })
}
