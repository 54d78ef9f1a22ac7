//! Linear request/response pipelines built from prompts, the model and the
//! database.

pub mod error;
pub mod model;
pub mod query_writer;
pub mod sql_answer;
pub mod translation;

pub use error::ChainError;
pub use model::ChainModel;
pub use query_writer::{SqlQueryWriter, WrittenQuery};
pub use sql_answer::{SqlAnswer, SqlAnswerChain};
pub use translation::TranslationChain;
