//! Schema reflection: find the identities table and its columns.
//!
//! The Metrics Grimoire tools each store contributors in a differently shaped
//! table. Reflection runs fresh on every export; nothing about the schema is
//! known ahead of time.

use std::fmt;

use tracing::{debug, info};

use super::Session;
use crate::errors::DatabaseError;

/// Column whose presence marks the IRC log shape.
pub const NICK_COLUMN: &str = "nick";

/// Tables known to hold identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityTable {
    /// CVSAnalY / MailingListStats `people`.
    People,
    /// Bicho `users`.
    Users,
    /// IRCAnalysis `irclog`.
    Irclog,
}

impl IdentityTable {
    /// Lookup order; the first table present wins.
    pub const PRIORITY: [IdentityTable; 3] = [
        IdentityTable::People,
        IdentityTable::Users,
        IdentityTable::Irclog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IdentityTable::People => "people",
            IdentityTable::Users => "users",
            IdentityTable::Irclog => "irclog",
        }
    }
}

impl fmt::Display for IdentityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selected table and every column it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    table: IdentityTable,
    columns: Vec<String>,
}

impl TableMapping {
    pub fn new(table: IdentityTable, columns: Vec<String>) -> Self {
        Self { table, columns }
    }

    pub fn table(&self) -> IdentityTable {
        self.table
    }

    /// Real column names, in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether rows must be grouped by nickname.
    pub fn has_nick(&self) -> bool {
        self.columns.iter().any(|c| c == NICK_COLUMN)
    }
}

/// Pick the highest-priority identities table among `tables`.
pub fn select_identity_table<S: AsRef<str>>(tables: &[S]) -> Result<IdentityTable, DatabaseError> {
    IdentityTable::PRIORITY
        .into_iter()
        .find(|candidate| tables.iter().any(|t| t.as_ref() == candidate.as_str()))
        .ok_or(DatabaseError::NoIdentitiesTable)
}

/// Inspect the database behind `session` and map its identities table.
pub async fn reflect(session: &mut Session) -> Result<TableMapping, DatabaseError> {
    let tables = session.list_tables().await?;
    debug!(count = tables.len(), "database tables listed");

    let table = select_identity_table(&tables)?;
    let columns = session.list_columns(table.as_str()).await?;
    info!(
        table = %table,
        columns = columns.len(),
        "identities table selected"
    );

    Ok(TableMapping::new(table, columns))
}
