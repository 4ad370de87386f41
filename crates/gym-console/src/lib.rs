//! Gym Management Console Library
//!
//! A console front-end over a PostgreSQL gym schema: members, staff with
//! their Desk/Trainer/Manager role, plans, memberships, payments, check-ins
//! and guests.
//!
//! ## Architecture
//!
//! Every multi-step write runs as a workflow inside one transaction
//! bracket. A workflow either commits all of its writes or none of them,
//! and business rules (minimum age, one Active membership per member, desk
//! staff processing payments) are checked before the first write.
//!
//! ## Modules
//!
//! - [`validation`]: Input predicates and typed field parsing
//! - [`db`]: Pool, schema, row models and parameterized queries
//! - [`store`]: Unit-of-work seam with PostgreSQL and in-memory stores
//! - [`workflow`]: Transactional workflows
//! - [`reports`]: Read-only tabular reports
//! - [`shell`]: Numbered menu console
//! - [`config`]: Properties-file configuration
//! - [`error`]: Error taxonomy and operator messages
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gym_console::{
//!     store::MemoryStore,
//!     workflow::{RegisterMemberRequest, SystemClock, Workflows},
//! };
//!
//! let workflows = Workflows::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock));
//! let member = workflows
//!     .register_member(RegisterMemberRequest {
//!         first_name: "Ana".into(),
//!         last_name: "Lopez".into(),
//!         birthday: "2000-01-01".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod reports;
pub mod result_ext;
pub mod shell;
pub mod store;
pub mod validation;
pub mod workflow;

pub use error::{AppError, AppResult};
