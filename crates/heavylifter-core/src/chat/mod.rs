pub mod service;
pub mod session_store;

pub use service::{ChatError, ChatService, assistant_message};
pub use session_store::SessionStore;
