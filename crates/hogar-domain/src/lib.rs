//! hogar-domain
//!
//! Pure domain models for the shared household (periods, incomes, budgets,
//! expenses, tasks). No I/O, no storage. Only data types and core enums.

pub mod budget;
pub mod common;
pub mod expense;
pub mod income;
pub mod party;
pub mod period;
pub mod task;
pub mod validation;

pub use budget::*;
pub use common::*;
pub use expense::*;
pub use income::*;
pub use party::*;
pub use period::*;
pub use task::*;
pub use validation::*;
