//! Shared application state.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};

use math_core::model::{Question, QuestionId, UserId};
use services::ProgressService;
use storage::repository::Storage;

/// Authoritative balance change pushed to connected clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceUpdate {
    pub user_id: u64,
    pub balance: u32,
}

/// State shared across handlers.
///
/// Served questions are parked here with their answer keys until the first
/// submission consumes them; the client only ever sees the prompt and
/// choices.
pub struct AppState {
    progress: ProgressService,
    active: RwLock<HashMap<QuestionId, Question>>,
    balance_tx: broadcast::Sender<BalanceUpdate>,
}

impl AppState {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        let (balance_tx, _) = broadcast::channel(64);
        Self {
            progress: ProgressService::new(storage),
            active: RwLock::new(HashMap::new()),
            balance_tx,
        }
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    /// Park a served question until its answer is submitted.
    pub async fn register_question(&self, question: Question) {
        self.active.write().await.insert(question.id(), question);
    }

    /// Consume a served question. A second take of the same id yields `None`.
    pub async fn take_question(&self, id: QuestionId) -> Option<Question> {
        self.active.write().await.remove(&id)
    }

    /// Publish an authoritative balance to whoever is listening. Lagging or
    /// absent listeners are not an error.
    pub fn publish_balance(&self, user: UserId, balance: u32) {
        let _ = self.balance_tx.send(BalanceUpdate {
            user_id: user.value(),
            balance,
        });
    }

    #[must_use]
    pub fn subscribe_balances(&self) -> broadcast::Receiver<BalanceUpdate> {
        self.balance_tx.subscribe()
    }
}
