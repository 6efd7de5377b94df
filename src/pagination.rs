//! Pagination parameters for list endpoints and the page metadata returned
//! alongside paginated results.

use serde::{Deserialize, Serialize};

use crate::Error;

pub(crate) fn default_page() -> u64 {
    1
}

pub(crate) fn default_limit() -> u64 {
    10
}

/// The page of results a client asked for.
///
/// Both fields have defaults so clients can omit either query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationParams {
    /// The one-indexed page number. Defaults to the first page.
    #[serde(default = "default_page")]
    pub page: u64,
    /// How many items to return per page. Defaults to ten.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Check that the parameters describe a valid page.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidPageNumber] if `page` is zero,
    /// - [Error::InvalidPageSize] if `limit` is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.page == 0 {
            return Err(Error::InvalidPageNumber);
        }

        if self.limit == 0 {
            return Err(Error::InvalidPageSize);
        }

        Ok(())
    }

    /// The number of items to skip to reach the requested page.
    ///
    /// # Errors
    /// See [PaginationParams::validate].
    pub fn offset(&self) -> Result<u64, Error> {
        self.validate()?;

        Ok((self.page - 1) * self.limit)
    }
}

/// Metadata describing where a page sits within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The one-indexed page number that was returned.
    pub current_page: u64,
    /// The page size that was applied.
    pub items_per_page: u64,
    /// How many items match the query across all pages.
    pub total_items: u64,
    /// How many pages the full result set spans.
    pub total_pages: u64,
}

impl PageInfo {
    /// Describe the page produced by `params` over `total_items` matches.
    ///
    /// # Errors
    /// See [PaginationParams::validate].
    pub fn new(total_items: u64, params: PaginationParams) -> Result<Self, Error> {
        params.validate()?;

        Ok(Self {
            current_page: params.page,
            items_per_page: params.limit,
            total_items,
            total_pages: total_items.div_ceil(params.limit),
        })
    }
}

#[cfg(test)]
mod pagination_tests {
    use crate::{
        Error,
        pagination::{PageInfo, PaginationParams},
    };

    #[test]
    fn validate_rejects_page_zero() {
        let params = PaginationParams { page: 0, limit: 10 };

        assert_eq!(params.validate(), Err(Error::InvalidPageNumber));
    }

    #[test]
    fn validate_rejects_limit_zero() {
        let params = PaginationParams { page: 1, limit: 0 };

        assert_eq!(params.validate(), Err(Error::InvalidPageSize));
    }

    #[test]
    fn offset_skips_previous_pages() {
        let params = PaginationParams { page: 3, limit: 10 };

        assert_eq!(params.offset(), Ok(20));
    }

    #[test]
    fn page_count_rounds_up() {
        let params = PaginationParams { page: 1, limit: 10 };

        assert_eq!(PageInfo::new(2, params).unwrap().total_pages, 1);
        assert_eq!(PageInfo::new(10, params).unwrap().total_pages, 1);
        assert_eq!(PageInfo::new(11, params).unwrap().total_pages, 2);
    }

    #[test]
    fn page_info_rejects_limit_zero() {
        let params = PaginationParams { page: 1, limit: 0 };

        assert_eq!(PageInfo::new(5, params), Err(Error::InvalidPageSize));
    }

    #[test]
    fn page_info_rejects_page_zero() {
        let params = PaginationParams { page: 0, limit: 10 };

        assert_eq!(PageInfo::new(5, params), Err(Error::InvalidPageNumber));
    }

    #[test]
    fn empty_result_set_has_zero_pages() {
        let params = PaginationParams::default();

        let got = PageInfo::new(0, params).unwrap();

        assert_eq!(got.total_pages, 0);
        assert_eq!(got.total_items, 0);
        assert_eq!(got.current_page, 1);
        assert_eq!(got.items_per_page, 10);
    }

    #[test]
    fn missing_query_parameters_use_defaults() {
        let got: PaginationParams = serde_json::from_str("{}").unwrap();

        assert_eq!(got, PaginationParams { page: 1, limit: 10 });
    }
}
