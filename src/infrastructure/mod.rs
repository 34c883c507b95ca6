//! Infrastructure module for external services.
//!
//! This module contains the task repositories and the factory that selects
//! one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryConfigBuilder, RepositoryFactory,
    StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::{PostgresTaskRepository, build_update_statement, ensure_schema};
pub use repository::{PaginatedResult, Pagination, RepositoryError, TaskRepository};
