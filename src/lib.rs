// Library root. The `bugtrack` binary in src/main.rs is a thin CLI over it.

pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod schema;

pub use client::{SupabaseClient, shared, shared_with};
pub use error::AppError;
pub use schema::{Bug, BugPriority, BugStatus, BugUpdate, Bugs, NewBug};
