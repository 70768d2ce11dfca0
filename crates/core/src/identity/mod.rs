//! Identity records read from Metrics Grimoire tables.
//!
//! Each legacy tool names its identity columns differently. Rows are kept
//! as column maps and projected onto `name`, `email` and `username` through
//! fixed alias lists:
//! 1. `name` <- `name`
//! 2. `email` <- `email`, `email_address`
//! 3. `username` <- `username`, `user_id`, `nick`

pub mod mapped;

pub use mapped::{Identity, MappedIdentity};
