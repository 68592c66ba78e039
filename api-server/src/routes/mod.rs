//! HTTP route handlers grouped by resource domain.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive an
//! OpenAPI document automatically. They stay thin: everything with real
//! behavior lives in [`crate::import`].

pub mod health;
pub mod imports;
pub mod params;
