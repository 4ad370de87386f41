//! Workflow engine.
//!
//! [`Workflows`] is the session object the shell talks to. It carries the
//! store and a clock; every operation opens its own [`Bracket`], runs its
//! steps against the bracket's unit of work and closes it. Inputs arrive as
//! raw operator text and are validated here, so the shell's inline checks
//! are a convenience and not a requirement.

mod bracket;
mod member;
mod plan;
mod purchase;
mod staff;
mod status;
mod transfer;

pub use bracket::{Bracket, WorkflowState};
pub use member::{MemberField, RegisterMemberRequest};
pub use plan::{DefaultPlansReceipt, PlanTypeChoice};
pub use purchase::{PurchaseReceipt, PurchaseRequest};
pub use staff::{RegisterStaffRequest, RoleRequest};
pub use transfer::{TransferReceipt, TransferRequest};

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Source of the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Result of an update that may be skipped when nothing would change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome<T> {
    Updated { before: T, after: T },
    /// The requested value equals the current one; nothing was written.
    Unchanged(T),
}

/// Session context passed to every workflow call.
#[derive(Clone)]
pub struct Workflows {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl Workflows {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    async fn open(&self, workflow: &'static str) -> AppResult<Bracket> {
        Bracket::open(self.store.as_ref(), workflow).await
    }
}

/// Targeted updates and deletes must touch exactly one row.
fn expect_one_row(affected: u64, table: &str) -> AppResult<()> {
    if affected != 1 {
        return Err(AppError::Internal(format!(
            "write to {} affected {} rows, expected 1",
            table, affected
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::store::MemoryStore;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    /// Empty in-memory store and a session pinned to [`today`].
    pub fn fixture() -> (MemoryStore, Workflows) {
        let store = MemoryStore::with_today(today());
        let workflows = Workflows::new(Arc::new(store.clone()), Arc::new(FixedClock(today())));
        (store, workflows)
    }

    pub fn member_request(first: &str, last: &str, birthday: &str) -> RegisterMemberRequest {
        RegisterMemberRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthday: birthday.to_string(),
            phone_number: String::new(),
            email: String::new(),
        }
    }

    pub fn desk_request(first: &str) -> RegisterStaffRequest {
        RegisterStaffRequest {
            first_name: first.to_string(),
            last_name: "Front".to_string(),
            phone_number: String::new(),
            email: String::new(),
            hire_date: "2024-03-01".to_string(),
            salary: "38000".to_string(),
            role: RoleRequest::Desk {
                schedule: "Mon-Fri 9AM-5PM".to_string(),
                desk_location: "Lobby".to_string(),
                responsibility: "Sales".to_string(),
            },
        }
    }

    pub fn trainer_request(first: &str) -> RegisterStaffRequest {
        RegisterStaffRequest {
            role: RoleRequest::Trainer {
                specialty: "Strength".to_string(),
                schedule: "Sat- 8AM-2PM".to_string(),
                certification_level: "Level 2".to_string(),
                experience: "5".to_string(),
            },
            ..desk_request(first)
        }
    }

    /// Default plans, one desk clerk and one trainer.
    /// Plan IDs: 1 Monthly, 2 Monthly Premium, 3 Annual. Staff IDs: 1 desk, 2 trainer.
    pub async fn seeded() -> (MemoryStore, Workflows) {
        let (store, workflows) = fixture();
        workflows.setup_default_plans().await.unwrap();
        workflows
            .register_staff_member(desk_request("Dee"))
            .await
            .unwrap();
        workflows
            .register_staff_member(trainer_request("Tom"))
            .await
            .unwrap();
        (store, workflows)
    }
}
