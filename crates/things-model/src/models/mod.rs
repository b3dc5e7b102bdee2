//! Data types for the Things database.
//!
//! This module provides type-safe models for the rows the query engine reads
//! and the packed date formats the database stores.

mod common;
mod task;

pub use common::*;
pub use task::*;
