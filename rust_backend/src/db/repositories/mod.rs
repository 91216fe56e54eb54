//! Repository implementations.
//!
//! - `local`: In-memory implementation for tests, the report binary and local development

pub mod local;

pub use local::LocalRepository;
