//! Pagination rewriting for the pickup content listing.
//!
//! The listing endpoint serves a fixed, small number of items per page. The
//! [`PaginationRewriter`] asks upstream for more items per page instead and
//! rescales `total_count` so the page's own pager shows the matching,
//! smaller number of pages.

use crate::errors::HookError;
use crate::hook::{Interceptor, Producer};
use crate::net::{Fetcher, RequestDescriptor, ResponseDescriptor, UrlPattern};
use anyhow::Context;
use http::Method;
use log::{debug, warn};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number;
use std::sync::Arc;
use url::Url;

/// Name the rewriter registers under
pub const HOOK_NAME: &str = "pickup";

pub const DEFAULT_PATTERN: &str = "/api/pc/pickup_content*";
pub const ORIGINAL_PER_PAGE: u64 = 10;
pub const PER_PAGE: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub content_id: Number,
    pub content_title: String,
    pub thumbnail_url: String,
}

/// One page of the pickup listing. Unknown fields are dropped.
///
/// Numbers are accepted in any JSON form (`500`, `500.0`, `-1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupPage {
    pub pickup_name: String,
    pub content_type: Number,
    #[serde(serialize_with = "whole_number")]
    pub total_count: f64,
    pub content_list: Vec<Content>,
}

impl PickupPage {
    /// Rescales `total_count` from `per_page` sized pages to `original_per_page` sized ones.
    pub fn rescale(mut self, per_page: u64, original_per_page: u64) -> Self {
        let pages = (self.total_count / per_page.max(1) as f64).ceil();
        self.total_count = pages * original_per_page as f64;
        self
    }
}

/// Writes integral values without a fraction, as `100` rather than `100.0`.
fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Clone)]
pub struct PaginationRewriter {
    pattern: UrlPattern,
    fetcher: Arc<dyn Fetcher>,
    per_page: u64,
    original_per_page: u64,
}

impl PaginationRewriter {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Result<Self, HookError> {
        Ok(Self {
            pattern: UrlPattern::new(DEFAULT_PATTERN)?,
            fetcher,
            per_page: PER_PAGE,
            original_per_page: ORIGINAL_PER_PAGE,
        })
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, HookError> {
        self.pattern = UrlPattern::new(pattern)?;
        Ok(self)
    }

    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn original_per_page(mut self, original_per_page: u64) -> Self {
        self.original_per_page = original_per_page;
        self
    }

    async fn handle(self, request: RequestDescriptor) -> anyhow::Result<ResponseDescriptor> {
        let url = rewrite_number(&request.url, self.per_page);
        debug!("Fetching pickup content from {url}");

        let resp = self
            .fetcher
            .fetch(request.with_url(url))
            .await
            .context("pickup content request failed")?;
        if !resp.is_ok() {
            warn!("Failed to fetch pickup content: {} {}", resp.status, resp.status_text);
            return Ok(resp);
        }

        let final_url = resp.url.clone();
        let body = resp.body.into_bytes().await?;
        let page: PickupPage = serde_json::from_slice(&body).context("unexpected pickup content")?;
        let page = page.rescale(self.per_page, self.original_per_page);

        Ok(ResponseDescriptor::json(final_url, &page)?)
    }
}

impl Interceptor for PaginationRewriter {
    fn intercept(&self, request: &RequestDescriptor) -> Option<Producer> {
        if request.method != Method::GET || !self.pattern.matches(request.url.path()) {
            return None;
        }

        let this = self.clone();
        let request = request.clone();
        Some(Producer::new(move || this.handle(request)))
    }
}

/// Sets the `number` query parameter to `per_page`. The first occurrence is
/// replaced and later ones removed; it is appended when missing.
fn rewrite_number(url: &Url, per_page: u64) -> Url {
    let value = per_page.to_string();
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != "number" {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.clone()))
        })
        .collect();

    let mut url = url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(&pairs)
        .extend_pairs(if replaced { None } else { Some(("number", value.as_str())) });
    url
}
