//! Full-table scan of the identities table.

use std::collections::HashSet;

use sqlx::any::AnyRow;
use tracing::{debug, info};

use super::reflect::{TableMapping, NICK_COLUMN};
use super::{decode_cell, Session};
use crate::errors::DatabaseError;
use crate::identity::MappedIdentity;

/// Fetch every row of the mapped table as a [`MappedIdentity`].
///
/// Tables with a `nick` column keep one row per distinct nickname.
pub async fn fetch_identities(
    session: &mut Session,
    mapping: &TableMapping,
) -> Result<Vec<MappedIdentity>, DatabaseError> {
    let sql = select_sql(session, mapping);
    debug!(sql = %sql, "scanning identities table");

    let rows = sqlx::query(&sql).fetch_all(session.conn()).await?;
    let records: Vec<MappedIdentity> = rows.iter().map(|row| map_row(mapping, row)).collect();
    let scanned = records.len();

    let records = if mapping.has_nick() {
        group_by_nick(records)
    } else {
        records
    };

    info!(
        table = %mapping.table(),
        rows = scanned,
        identities = records.len(),
        "identities fetched"
    );
    Ok(records)
}

/// Keep the first record for each distinct `nick` value, in scan order.
/// Records without a nick share one group.
pub fn group_by_nick(records: Vec<MappedIdentity>) -> Vec<MappedIdentity> {
    let mut seen: HashSet<Option<String>> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.value(NICK_COLUMN).map(str::to_owned)))
        .collect()
}

// Every column is cast in SQL; the any-driver cannot decode temporal types
// such as the DATETIME column of `irclog`.
fn select_sql(session: &Session, mapping: &TableMapping) -> String {
    let columns = mapping
        .columns()
        .iter()
        .map(|column| {
            let ident = session.quote_ident(column);
            format!("CAST({ident} AS {}) AS {ident}", session.cast_type())
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {columns} FROM {}",
        session.quote_ident(mapping.table().as_str())
    )
}

fn map_row(mapping: &TableMapping, row: &AnyRow) -> MappedIdentity {
    mapping
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| (column.as_str(), decode_cell(row, idx)))
        .collect()
}
