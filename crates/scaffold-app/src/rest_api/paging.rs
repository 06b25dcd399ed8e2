use crate::error::{ApiError, ApiResult};
use garde::Validate;
use scaffold_dal::ListingParams;

mod parsers;

use parsers::{parse_number, parse_ordering};

/// Listing query: `page` (zero based), `pageSize` and `sort`.
///
/// Numbers are kept as strings, so malformed values fall back to defaults
/// instead of failing the request.
#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[garde(allow_unvalidated)]
pub struct Paging {
    page: Option<String>,
    page_size: Option<String>,
    #[garde(length(max = 1000))]
    sort: Option<String>,
}

impl Paging {
    pub fn new(page: Option<i64>, page_size: Option<i64>, sort: Option<&str>) -> Self {
        Paging {
            page: page.map(|n| n.to_string()),
            page_size: page_size.map(|n| n.to_string()),
            sort: sort.map(str::to_string),
        }
    }

    /// Offset and limit of the requested window.
    ///
    /// A window applies only if `pageSize > 0` and `page >= 0`,
    /// otherwise first `max_items` records are returned. Offset is counted
    /// in requested pages, only the limit is capped by `max_items`.
    pub fn window(&self, max_items: u32) -> (i64, i64) {
        let max_items = i64::from(max_items);
        match (
            parse_number(self.page.as_deref()),
            parse_number(self.page_size.as_deref()),
        ) {
            (Some(page), Some(page_size)) if page >= 0 && page_size > 0 => {
                (page.saturating_mul(page_size), page_size.min(max_items))
            }
            _ => (0, max_items),
        }
    }

    pub fn into_listing_params(self, max_items: u32) -> ApiResult<ListingParams> {
        self.validate()
            .map_err(|e| ApiError::BadRequest(format!("Invalid query: {e}")))?;
        let (offset, limit) = self.window(max_items);
        let order = self
            .sort
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_ordering)
            .transpose()?;

        Ok(ListingParams {
            offset,
            limit,
            order,
        })
    }
}
