//! Command implementations: migrate and its dry-run counterpart, explain.

pub mod explain;
pub mod migrate;
