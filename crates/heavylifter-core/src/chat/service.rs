//! Chat service: runs a page's chain for a prompt and records the exchange.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use heavylifter_types::chat::{ChatPage, Transcript};
use heavylifter_types::error::TranscriptError;

use crate::chain::{ChainError, SqlAnswer, SqlAnswerChain};
use crate::sql::SqlDatabase;

use super::session_store::SessionStore;

/// Errors from a chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("the {0} page is not configured")]
    PageUnavailable(ChatPage),
}

/// Body of the assistant turn: the answer, then the query that produced it.
pub fn assistant_message(answer: &SqlAnswer) -> String {
    format!("{}\n\n```sql\n{}\n```", answer.answer, answer.query)
}

/// Owns the sessions and the chains behind each chat page.
///
/// Generic over `SqlDatabase` so core never depends on a database driver.
pub struct ChatService<D: SqlDatabase> {
    db: Arc<D>,
    sessions: SessionStore,
    lifter: SqlAnswerChain,
    graphql: Option<SqlAnswerChain>,
}

impl<D: SqlDatabase> ChatService<D> {
    /// `graphql` is `None` when no GraphQL schema is configured.
    pub fn new(db: Arc<D>, lifter: SqlAnswerChain, graphql: Option<SqlAnswerChain>) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
            lifter,
            graphql,
        }
    }

    /// Keep at most `max` sessions, dropping the oldest when full.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.sessions = SessionStore::with_max_sessions(max);
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_available(&self, page: ChatPage) -> bool {
        match page {
            ChatPage::Lifter => true,
            ChatPage::Graphql => self.graphql.is_some(),
        }
    }

    fn chain_for(&self, page: ChatPage) -> Result<&SqlAnswerChain, ChatError> {
        match page {
            ChatPage::Lifter => Ok(&self.lifter),
            ChatPage::Graphql => self.graphql.as_ref().ok_or(ChatError::PageUnavailable(page)),
        }
    }

    pub fn start(&self, page: ChatPage) -> Result<Transcript, ChatError> {
        self.chain_for(page)?;
        let transcript = self.sessions.create(page);
        info!(session_id = %transcript.id, page = %page, "Chat session started");
        Ok(transcript)
    }

    /// Session `id` if it exists and belongs to `page`.
    pub fn transcript(&self, id: &Uuid, page: ChatPage) -> Option<Transcript> {
        self.sessions.get(id).filter(|t| t.page == page)
    }

    /// Answer `prompt` in session `id` on `page`.
    ///
    /// The transcript is only touched once the chain has succeeded.
    pub async fn ask(
        &self,
        id: &Uuid,
        page: ChatPage,
        prompt: &str,
    ) -> Result<SqlAnswer, ChatError> {
        if self.transcript(id, page).is_none() {
            return Err(TranscriptError::SessionNotFound.into());
        }
        let chain = self.chain_for(page)?;

        let answer = chain.ask(self.db.as_ref(), prompt).await?;
        self.sessions
            .record_exchange(id, prompt, assistant_message(&answer))?;
        Ok(answer)
    }

    /// One-off question outside any session.
    pub async fn ask_once(&self, page: ChatPage, question: &str) -> Result<SqlAnswer, ChatError> {
        let chain = self.chain_for(page)?;
        Ok(chain.ask(self.db.as_ref(), question).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainModel;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::testing::{FakeDatabase, MockError, ScriptedProvider, single_column};
    use heavylifter_types::llm::MessageRole;
    use heavylifter_types::sql::Dialect;

    fn service(provider: ScriptedProvider, db: FakeDatabase) -> ChatService<FakeDatabase> {
        let model = ChainModel::new(Arc::new(BoxLlmProvider::new(provider)), 1024, 0.0);
        let lifter = SqlAnswerChain::new(model, Dialect::Mysql, 5).unwrap();
        ChatService::new(Arc::new(db), lifter, None)
    }

    #[tokio::test]
    async fn ask_records_answer_with_query_block() {
        let db = FakeDatabase::new(&["ttd_deal"], "").with_result(Ok(single_column("n", &["3"])));
        let svc = service(
            ScriptedProvider::new(["SELECT COUNT(*) AS n FROM ttd_deal", "Three deals."]),
            db,
        );
        let id = svc.start(ChatPage::Lifter).unwrap().id;

        let answer = svc.ask(&id, ChatPage::Lifter, "How many deals?").await.unwrap();
        assert_eq!(answer.answer, "Three deals.");

        let transcript = svc.transcript(&id, ChatPage::Lifter).unwrap();
        let turns = transcript.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, "How many deals?");
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(
            turns[1].content,
            "Three deals.\n\n```sql\nSELECT COUNT(*) AS n FROM ttd_deal\n```"
        );
    }

    #[tokio::test]
    async fn failed_chain_leaves_transcript_unchanged() {
        let svc = service(
            ScriptedProvider::failing(MockError::Auth),
            FakeDatabase::new(&[], ""),
        );
        let id = svc.start(ChatPage::Lifter).unwrap().id;

        let err = svc.ask(&id, ChatPage::Lifter, "anything").await.unwrap_err();
        assert!(matches!(err, ChatError::Chain(ref e) if e.is_llm()));
        assert!(svc.transcript(&id, ChatPage::Lifter).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_or_mismatched_session() {
        let svc = service(ScriptedProvider::new([]), FakeDatabase::new(&[], ""));
        let err = svc
            .ask(&Uuid::now_v7(), ChatPage::Lifter, "q")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::Transcript(TranscriptError::SessionNotFound)
        ));

        let id = svc.start(ChatPage::Lifter).unwrap().id;
        assert!(svc.transcript(&id, ChatPage::Graphql).is_none());
    }

    #[tokio::test]
    async fn graphql_page_requires_chain() {
        let svc = service(ScriptedProvider::new([]), FakeDatabase::new(&[], ""));
        assert!(!svc.is_available(ChatPage::Graphql));
        assert!(matches!(
            svc.start(ChatPage::Graphql),
            Err(ChatError::PageUnavailable(ChatPage::Graphql))
        ));
    }
}
