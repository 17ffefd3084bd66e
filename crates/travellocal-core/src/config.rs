//! Client configuration.
//!
//! The backend host is fixed at build time. Set `TRAVELLOCAL_API_BASE_URL`
//! in the build environment to point a build at another deployment.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::text::non_blank;

const FALLBACK_API_BASE_URL: &str = "http://124.60.137.10:8083";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DETAIL_TIMEOUT_SECS: u64 = 5;

/// Reviews are requested one page at a time.
pub const REVIEW_PAGE_SIZE: u32 = 10;
/// Large enough to cover every recommendable program in one request.
pub const RECOMMENDATION_PAGE_SIZE: u32 = 100;
/// Number of recommendation cards shown on the home screen.
pub const RECOMMENDATION_DISPLAY_COUNT: usize = 4;
/// Points charged to unlock a program's detailed schedule.
pub const SCHEDULE_UNLOCK_COST: i64 = 100;

/// Base URL compiled into this build.
pub const fn compiled_api_base_url() -> &'static str {
    match option_env!("TRAVELLOCAL_API_BASE_URL") {
        Some(url) => url,
        None => FALLBACK_API_BASE_URL,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    pub request_timeout: Duration,
    pub detail_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: compiled_api_base_url().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            detail_timeout: Duration::from_secs(DETAIL_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Config for an explicit backend, used by embedders and tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            ..Self::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` (with or without a leading slash) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base = non_blank(Some(raw))
        .ok_or(Error::InvalidConfiguration("API base URL must not be empty"))?;
    if !has_http_scheme(&base) {
        return Err(Error::InvalidConfiguration(
            "API base URL must include http:// or https://",
        ));
    }
    Ok(base.trim_end_matches('/').to_string())
}
