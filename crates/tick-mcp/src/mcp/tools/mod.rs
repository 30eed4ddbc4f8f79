//! MCP tool implementations.

pub mod common;
pub mod projects;
pub mod query_tasks;
pub mod tasks;

#[cfg(test)]
pub(crate) mod stub;
