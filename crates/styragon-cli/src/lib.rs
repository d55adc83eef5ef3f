//! Styragon CLI - command-line host for the Styragon content engine
//!
//! Public surfaces print as text or JSON; admin commands sign in, run one
//! action through the admin panel and sign out again.

pub mod config;
pub mod render;

pub use config::{AdminArgs, AdminCommand, Command, Config, ContentKind, OutputFormat};
