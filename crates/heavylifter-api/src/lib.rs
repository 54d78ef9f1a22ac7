//! Application layer for Heavy Lifter: shared state and the HTTP router.
//!
//! The `heavylifter` binary (`src/main.rs`) adds the CLI on top.

pub mod http;
pub mod state;

pub use http::router::build_router;
pub use state::AppState;
