//! Transaction bracket shared by every workflow.
//!
//! A bracket owns one unit of work and walks the workflow state machine:
//!
//! ```text
//! Collecting -> Validated -> Committing -> Committed
//!      \            \            \
//!       +------------+------------+-----> RolledBack
//! ```
//!
//! [`Bracket::close`] is the only exit. It commits when the workflow body
//! returned `Ok` and rolls back otherwise, so a failed workflow never leaves
//! partial writes behind.

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::result_ext::ResultExt;
use crate::store::{Store, UnitOfWork};

/// Workflow lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Reading and checking inputs and preconditions.
    Collecting,
    /// All preconditions hold; no write issued yet.
    Validated,
    /// Writes are being issued.
    Committing,
    Committed,
    RolledBack,
}

pub struct Bracket {
    workflow: &'static str,
    state: WorkflowState,
    uow: Box<dyn UnitOfWork>,
}

impl Bracket {
    /// Begin a transaction for `workflow`.
    pub async fn open(store: &dyn Store, workflow: &'static str) -> AppResult<Self> {
        let uow = store.begin().await?;
        debug!(workflow, "Workflow transaction opened");
        Ok(Self {
            workflow,
            state: WorkflowState::Collecting,
            uow,
        })
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Repository access for the workflow body.
    pub fn uow(&mut self) -> &mut dyn UnitOfWork {
        self.uow.as_mut()
    }

    /// All preconditions hold.
    pub fn validated(&mut self) {
        self.transition(WorkflowState::Validated);
    }

    /// About to issue writes.
    pub fn committing(&mut self) {
        if self.state == WorkflowState::Collecting {
            self.transition(WorkflowState::Validated);
        }
        self.transition(WorkflowState::Committing);
    }

    fn transition(&mut self, next: WorkflowState) {
        debug!(
            workflow = self.workflow,
            from = ?self.state,
            to = ?next,
            "Workflow state transition"
        );
        self.state = next;
    }

    /// Commit on `Ok`, roll back on `Err`, and hand the outcome back.
    ///
    /// A failed rollback is logged and otherwise ignored; the original error
    /// is what the operator needs to see.
    pub async fn close<T>(self, outcome: AppResult<T>) -> AppResult<T> {
        let Bracket {
            workflow,
            state,
            uow,
        } = self;

        match outcome {
            Ok(value) => {
                debug!(workflow, from = ?state, "Committing workflow transaction");
                match uow.commit().await {
                    Ok(()) => {
                        info!(workflow, state = ?WorkflowState::Committed, "Workflow committed");
                        Ok(value)
                    }
                    Err(e) => {
                        warn!(workflow, error = %e, state = ?WorkflowState::RolledBack, "Commit failed");
                        Err(e)
                    }
                }
            }
            Err(e) => {
                warn!(
                    workflow,
                    from = ?state,
                    state = ?WorkflowState::RolledBack,
                    error = %e,
                    "Workflow rolled back"
                );
                let _ = uow.rollback().await.log(format!("rolling back {}", workflow));
                Err(e)
            }
        }
    }

    /// Roll back unconditionally. Used by read-only checks.
    pub async fn release(self) -> AppResult<()> {
        debug!(workflow = self.workflow, "Releasing read-only transaction");
        self.uow.rollback().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewGymMember;
    use crate::error::AppError;
    use crate::store::{FailPoint, MemoryStore};
    use chrono::NaiveDate;

    fn member() -> NewGymMember {
        NewGymMember {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            birthday: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            phone_number: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn test_state_walk() {
        let store = MemoryStore::new();
        let mut bracket = Bracket::open(&store, "test").await.unwrap();
        assert_eq!(bracket.state(), WorkflowState::Collecting);
        bracket.validated();
        assert_eq!(bracket.state(), WorkflowState::Validated);
        bracket.committing();
        assert_eq!(bracket.state(), WorkflowState::Committing);
        bracket.close(Ok(())).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_err_discards_writes() {
        let store = MemoryStore::new();
        let mut bracket = Bracket::open(&store, "test").await.unwrap();
        bracket.committing();
        bracket.uow().insert_member(&member()).await.unwrap();

        let outcome: AppResult<()> = Err(AppError::Precondition("stop".to_string()));
        let err = bracket.close(outcome).await.unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
        assert!(store.snapshot().await.members.is_empty());
    }

    #[tokio::test]
    async fn test_commit_failure_is_reported() {
        let store = MemoryStore::new();
        store.fail_on(FailPoint::Commit).await;
        let mut bracket = Bracket::open(&store, "test").await.unwrap();
        bracket.committing();
        bracket.uow().insert_member(&member()).await.unwrap();

        let err = bracket.close(Ok(())).await.unwrap_err();
        assert!(matches!(err, AppError::Operational(_)));
        assert!(store.snapshot().await.members.is_empty());
    }

    #[tokio::test]
    async fn test_release_discards_writes() {
        let store = MemoryStore::new();
        let mut bracket = Bracket::open(&store, "test").await.unwrap();
        bracket.uow().insert_member(&member()).await.unwrap();
        bracket.release().await.unwrap();
        assert!(store.snapshot().await.members.is_empty());
    }
}
