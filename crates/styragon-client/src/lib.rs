//! Styragon Client - HTTP clients for the hosted backend
//!
//! - [`storage`] - object storage for images and lead attachments
//! - [`auth`] - password sign-in, sign-out and recovery for admins
//!
//! Both share a [`BackendClient`], which carries the project URL, the
//! anonymous key and the timeout policy.

mod backend;
pub mod auth;
pub mod storage;

pub use auth::AuthClient;
pub use backend::BackendClient;
pub use storage::StorageClient;
