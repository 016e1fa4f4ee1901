//! Article extraction from embedded JSON-LD metadata
//!
//! Article pages carry one or more `<script type="application/ld+json">`
//! blocks. Each block is parsed on its own; a block with a `headline` becomes
//! one [`ArticleRecord`], and a malformed block is logged and skipped.

mod jsonld;
mod record;

pub use jsonld::{extract_articles, normalize_keywords};
pub use record::{ArticleRecord, SCRAPED_AT_FORMAT, UNKNOWN};
