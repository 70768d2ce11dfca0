//! mg2sh core library.
//!
//! Exports contributor identities from a legacy Metrics Grimoire database
//! (CVSAnalY, MailingListStats, Bicho, IRCAnalysis) into a JSON identities
//! document: connect, find the identities table, map its columns onto
//! `name`/`email`/`username`, and serialize.

pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod identity;

// Re-exports for convenience.
pub use config::{Driver, ExportConfig};
pub use db::Session;
pub use export::{run_export, IdentityExport};
pub use identity::{Identity, MappedIdentity};
