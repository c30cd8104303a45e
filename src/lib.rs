//! Grade (`nilai`) records stored in SQLite.
//!
//! [`NilaiModel`] is the entry point; the generic plumbing lives in
//! [`BaseModel`] and is driven by the [`TableModel`] hooks.

pub mod api;
pub mod cli;
pub mod config;

pub use api::{BaseModel, ModelError, ModelResult, Nilai, NilaiModel, SqlValue, TableModel};
