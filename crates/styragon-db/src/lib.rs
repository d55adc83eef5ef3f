//! Styragon DB - PostgreSQL implementation of the content store.

pub mod repository;

pub use repository::ContentRepository;
