//! # frostgate-sql
//!
//! Statement classification and the permission gate for free-form commands,
//! plus the identifier and literal rendering used by statement builders.
//!
//! ## How It Works
//!
//! Text is tokenized, split into statements on `;` tokens, and each statement
//! is classified from its parse tree (or, for commands the parser does not
//! know, from its leading keywords in the token stream):
//!
//! | Text | Kind |
//! |------|------|
//! | `SELECT 'DROP TABLE t'` | `query` |
//! | `DELETE FROM t WHERE id = 1` | `mutation-delete` |
//! | `SHOW WAREHOUSES` | `describe` |
//! | `ALTER SESSION SET TIMEZONE = 'UTC'` | `session-control` |
//! | `-- nothing here` | `comment` |
//!
//! The gate then resolves each kind against a [`PermissionTable`]: blanket
//! allow, then the kind's own entry, then the catch-all.

pub mod classifier;
pub mod error;
pub mod gate;
pub mod render;

pub use classifier::StatementClassifier;
pub use error::GateError;
pub use gate::{Decision, DecisionSource, PermissionGate, PermissionTable, authorize, gate};
