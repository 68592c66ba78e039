//! Query parameter helpers shared by list endpoints.

use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

const MAX_PAGE_SIZE: i64 = 100;

/// Common pagination parameters applied to list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// One-based page index (defaults to the first page).
    pub page: Option<i64>,
    /// Number of items per page (clamped between 1 and 100).
    pub size: Option<i64>,
}

impl PaginationParams {
    /// Resolve the one-based page index.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Resolve the page size, falling back to `default_size`.
    pub fn size(&self, default_size: i64) -> i64 {
        self.size.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the resolved page.
    pub fn offset(&self, default_size: i64) -> i64 {
        (self.page() - 1).saturating_mul(self.size(default_size))
    }
}
