//! Task CRUD service.
//!
//! A small HTTP API over a single `tasks` table. Updates are sparse: a client
//! sends only the fields it wants to change, and [`domain::resolve`] turns
//! that map into an ordered list of column assignments, driven by the static
//! [`domain::TASK_SCHEMA`].

pub mod api;
pub mod domain;
pub mod infrastructure;
