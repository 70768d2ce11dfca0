//! The identities document and the export pipeline that produces it.
//!
//! [`run_export`] is the whole job: connect, reflect, scan, close, and wrap
//! the normalized identities in an [`IdentityExport`]. Writing the document
//! out is left to the caller so that nothing is emitted unless every step
//! succeeded.

use std::io::Write;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::db::{query, reflect, Session};
use crate::errors::{DatabaseError, ExportError, OutputError};
use crate::identity::{Identity, MappedIdentity};

/// Format of the `time` field.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// The exported document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityExport {
    /// When the export was produced.
    pub time: String,
    /// Database name the identities were read from.
    pub source: String,
    /// One entry per record, in query result order.
    pub identities: Vec<Identity>,
}

impl IdentityExport {
    /// Build the document for `records` read from `source`, stamped now.
    pub fn new(source: &str, records: &[MappedIdentity]) -> Self {
        Self {
            time: Local::now().format(TIME_FORMAT).to_string(),
            source: source.to_string(),
            identities: records.iter().map(MappedIdentity::to_identity).collect(),
        }
    }

    /// Render as UTF-8 JSON indented by four spaces.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, OutputError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Write the rendered document and a trailing newline to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), OutputError> {
        let bytes = self.to_json_bytes()?;
        writer.write_all(&bytes)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Run a full export against the database described by `config`.
///
/// The session is closed before returning on every path past a successful
/// connect. If reflection or the scan failed, that error is returned and a
/// failure to close is only logged.
pub async fn run_export(config: &ExportConfig) -> Result<IdentityExport, ExportError> {
    config.validate()?;

    let mut session = Session::open(config).await?;
    let fetched = fetch(&mut session).await;
    let closed = session.close().await;

    let records = settle(fetched, closed)?;

    let export = IdentityExport::new(&config.database, &records);
    info!(
        source = %export.source,
        identities = export.identities.len(),
        "export complete"
    );
    Ok(export)
}

async fn fetch(session: &mut Session) -> Result<Vec<MappedIdentity>, DatabaseError> {
    let mapping = reflect::reflect(session).await?;
    query::fetch_identities(session, &mapping).await
}

/// Combine the outcome of the work done in a session with the outcome of
/// closing it. The first error wins; a close error after a failure is logged.
fn settle<T>(
    fetched: Result<T, DatabaseError>,
    closed: Result<(), DatabaseError>,
) -> Result<T, DatabaseError> {
    match (fetched, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to close database session after error");
            Err(err)
        }
    }
}
