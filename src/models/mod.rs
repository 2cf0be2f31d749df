// src/models/mod.rs

mod booking;
mod catalog;
mod complaint;
mod payment;
mod provider;
mod report;
mod settings;
mod user;

pub use booking::*;
pub use catalog::*;
pub use complaint::*;
pub use payment::*;
pub use provider::*;
pub use report::*;
pub use settings::*;
pub use user::*;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ─── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    const DEFAULT_LIMIT: u32 = 10;
    const MAX_LIMIT: u32 = 100;

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.limit()
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        let limit = i64::from(self.limit());
        Pagination {
            total,
            page: self.page(),
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults_and_clamping() {
        let q = PageQuery::default();
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 10, 0));

        let q = PageQuery { page: Some(3), limit: Some(500) };
        assert_eq!((q.page(), q.limit(), q.offset()), (3, 100, 200));

        let q = PageQuery { page: Some(0), limit: Some(0) };
        assert_eq!((q.page(), q.limit()), (1, 1));
    }

    #[test]
    fn test_pagination_rounds_pages_up() {
        let q = PageQuery { page: Some(2), limit: Some(10) };
        assert_eq!(q.pagination(21), Pagination { total: 21, page: 2, pages: 3 });
        assert_eq!(q.pagination(0).pages, 0);
    }
}
