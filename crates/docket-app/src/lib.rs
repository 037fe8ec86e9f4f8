//! Application layer for docket.
//!
//! This crate provides the task store abstraction, the session gate, the
//! reorder controller, the task board and configuration shared by the CLI and
//! the TUI.

/// Client-side task state behind the views.
pub mod board;
/// Local calendar day.
pub mod clock;
/// Client configuration file.
pub mod config;
/// Store error taxonomy.
pub mod error;
/// In-process task store.
pub mod memory_store;
/// Optimistic drag reordering.
pub mod reorder;
/// Session token and auth gate.
pub mod session;
/// Task store abstraction.
pub mod store;

// Re-exports for convenience
pub use board::TaskBoard;
pub use clock::local_today;
pub use config::ClientConfig;
pub use error::{ErrorKind, StoreError};
pub use memory_store::{MemoryStore, StoreCall};
pub use reorder::{ReorderController, ReorderPhase};
pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionGate, TokenStore};
pub use store::TaskStore;
