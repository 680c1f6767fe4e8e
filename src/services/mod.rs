//! Business logic services.
//!
//! The review service sits on top of the store traits and is shared by the
//! HTTP layer and the tests. Stores are swappable: SQLite in production,
//! in-memory for unit tests.

pub mod assignment;
pub mod http_api;
pub mod http_server;
pub mod locks;
pub mod memory_store;
pub mod review_service;
pub mod sqlite_store;
pub mod store;

pub use assignment::ReviewerAssigner;
pub use memory_store::InMemoryStore;
pub use review_service::{Reassignment, ReviewService};
pub use sqlite_store::SqliteStore;
pub use store::{PrStore, TeamStore, UserStore};
