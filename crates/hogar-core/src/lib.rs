//! hogar-core
//!
//! Business logic and services for the shared household: income resolution,
//! budgets, expenses, period closure, settlement and chores.
//! Depends on hogar-domain. Talks to persistence only through [`DocumentStore`].

pub mod auth;
pub mod budget_service;
pub mod closure_service;
pub mod error;
pub mod expense_service;
pub mod format;
pub mod income_service;
pub mod membership_service;
pub mod memory_store;
pub mod settlement;
pub mod storage;
pub mod summary_service;
pub mod task_service;
pub mod time;

pub use auth::*;
pub use budget_service::*;
pub use closure_service::*;
pub use error::{CoreError, ErrorKind};
pub use expense_service::*;
pub use income_service::*;
pub use membership_service::*;
pub use memory_store::MemoryDocumentStore;
pub use settlement::*;
pub use storage::*;
pub use summary_service::*;
pub use task_service::*;
pub use time::*;
