//! HTTP request handlers.

pub mod api;
pub mod pages;
