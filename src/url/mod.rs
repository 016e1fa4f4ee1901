//! URL handling module for Headline-Harvest
//!
//! This module provides URL normalization and the classifier that decides
//! whether a URL is an article, a navigation page, or out of bounds.

mod classify;
mod normalize;

pub use classify::{
    article_id, classify, Classification, RejectReason, SiteRules, DEFAULT_ARTICLE_PATTERN,
};
pub use normalize::{normalize_url, resolve_url};
