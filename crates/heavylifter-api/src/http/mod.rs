//! Web chat UI and JSON API for Heavy Lifter.
//!
//! Axum router serving askama-rendered chat pages plus a small JSON API at
//! `/api/v1/`, with CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod views;
