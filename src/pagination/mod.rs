//! Keyset (seek) pagination shared by every list endpoint.
//!
//! Pages are ordered by `(created_at DESC, id DESC)` and continue from the key
//! of the last row served rather than from an offset.

mod cursor;
mod planner;

pub use cursor::{SeekCursor, Seekable, MIN_CREATED_AT};
pub use planner::{paginate, push_keyset, Page, PageRequest};

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::PageConfig;

/// `?start=<cursor>&limit=<n>` as accepted by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub start: Option<String>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: Option<u32>,
}

/// Reads `limit` as text; anything that is not an unsigned integer counts as
/// absent, so the default page size applies instead of a rejection.
pub fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.trim().parse::<u32>().ok()))
}

impl PageQuery {
    /// Applies the configured default and ceiling to `limit`.
    pub fn into_request(self, bounds: PageConfig) -> PageRequest {
        let limit = self
            .limit
            .unwrap_or(bounds.default_limit)
            .min(bounds.max_limit);
        PageRequest::from_query(self.start.as_deref(), limit)
    }
}

/// Body of every list response.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T: Seekable> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        let next_cursor = page.next_cursor().map(|c| c.encode());
        Self {
            data: page.items,
            next_cursor,
            has_more: page.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_is_capped() {
        let bounds = PageConfig {
            default_limit: 10,
            max_limit: 50,
        };
        assert_eq!(PageQuery::default().into_request(bounds).limit, 10);
        let huge = PageQuery {
            start: None,
            limit: Some(u32::MAX),
        };
        assert_eq!(huge.into_request(bounds).limit, 50);
        let zero = PageQuery {
            start: None,
            limit: Some(0),
        };
        assert_eq!(zero.into_request(bounds).limit, 0);
    }

    #[test]
    fn malformed_limit_falls_back_to_default() {
        let bounds = PageConfig::default();
        for raw in ["abc", "-1", "", "1.5"] {
            let query: PageQuery =
                serde_json::from_value(serde_json::json!({ "limit": raw })).expect("lenient");
            assert_eq!(query.limit, None, "{raw:?}");
            assert_eq!(query.into_request(bounds).limit, bounds.default_limit);
        }
        let query: PageQuery =
            serde_json::from_value(serde_json::json!({ "limit": "7" })).expect("parses");
        assert_eq!(query.limit, Some(7));
        let query: PageQuery = serde_json::from_value(serde_json::json!({})).expect("absent");
        assert_eq!(query.limit, None);
    }
}
