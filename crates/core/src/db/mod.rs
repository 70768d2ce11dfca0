//! Database session for reading a Metrics Grimoire database.
//!
//! Provides a [`Session`] handle over a single `sqlx` any-driver connection,
//! plus the catalog queries the schema reflector needs. The SQL for listing
//! tables and columns differs per backend; everything above this module is
//! backend-agnostic.

pub mod query;
pub mod reflect;

use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Column, Connection, Row};
use tracing::{debug, info};

use crate::config::{Driver, ExportConfig};
use crate::errors::DatabaseError;

/// An open, exclusively owned database connection.
///
/// Dropping a `Session` tears the connection down without a graceful
/// goodbye; call [`Session::close`] on every path that can.
pub struct Session {
    conn: AnyConnection,
    driver: Driver,
}

impl Session {
    /// Connect using the given configuration. No retries.
    pub async fn open(config: &ExportConfig) -> Result<Self, DatabaseError> {
        sqlx::any::install_default_drivers();

        let url = config.connection_url()?;
        info!(
            url = %config.redacted_url(),
            database = %config.database,
            "connecting to database"
        );

        let conn = AnyConnection::connect(&url).await?;
        debug!(backend = conn.backend_name(), "database session opened");

        Ok(Self {
            conn,
            driver: config.driver,
        })
    }

    /// Close the session gracefully.
    pub async fn close(self) -> Result<(), DatabaseError> {
        self.conn.close().await?;
        debug!("database session closed");
        Ok(())
    }

    /// Backend this session talks to.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub(crate) fn conn(&mut self) -> &mut AnyConnection {
        &mut self.conn
    }

    /// Names of all base tables in the current database / schema. Views are
    /// never identities tables.
    pub async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError> {
        self.fetch_names(list_tables_sql(self.driver)).await
    }

    /// Column names of `table`, in declaration order.
    pub async fn list_columns(&mut self, table: &str) -> Result<Vec<String>, DatabaseError> {
        let literal = quote_literal(table);
        let sql = match self.driver {
            Driver::Mysql => format!(
                "SELECT CAST(column_name AS CHAR) FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = {literal} \
                 ORDER BY ordinal_position"
            ),
            Driver::Postgres => format!(
                "SELECT CAST(column_name AS TEXT) FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = {literal} \
                 ORDER BY ordinal_position"
            ),
            Driver::Sqlite => {
                format!("SELECT name FROM pragma_table_info({literal}) ORDER BY cid")
            }
        };
        self.fetch_names(&sql).await
    }

    /// Quote an identifier for this backend.
    pub fn quote_ident(&self, name: &str) -> String {
        match self.driver {
            Driver::Mysql => format!("`{}`", name.replace('`', "``")),
            Driver::Postgres | Driver::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// SQL type every selected column is cast to before decoding.
    ///
    /// SQLite casts to BLOB so that text holding invalid UTF-8 still reaches
    /// [`decode_cell`] as bytes.
    pub(crate) fn cast_type(&self) -> &'static str {
        match self.driver {
            Driver::Mysql => "CHAR",
            Driver::Postgres => "TEXT",
            Driver::Sqlite => "BLOB",
        }
    }

    async fn fetch_names(&mut self, sql: &str) -> Result<Vec<String>, DatabaseError> {
        let rows = sqlx::query(sql).fetch_all(&mut self.conn).await?;
        Ok(rows.iter().filter_map(|row| decode_cell(row, 0)).collect())
    }
}

/// Decode one cell as text. SQL NULL and undecodable values yield `None`.
pub(crate) fn decode_cell(row: &AnyRow, idx: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return value.map(|n| n.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return value.map(|n| n.to_string());
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    }
    debug!(
        column = row.columns().get(idx).map(|c| c.name()).unwrap_or("?"),
        "dropping undecodable cell"
    );
    None
}

fn list_tables_sql(driver: Driver) -> &'static str {
    match driver {
        Driver::Mysql => {
            "SELECT CAST(table_name AS CHAR) FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'"
        }
        Driver::Postgres => {
            "SELECT CAST(table_name AS TEXT) FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'"
        }
        Driver::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table'",
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use sqlx::{AnyConnection, Connection};

    use crate::config::{Driver, ExportConfig};

    /// Create a SQLite database at `path`, run `statements` against it and
    /// return a config pointing at it.
    pub async fn sqlite_fixture(path: &Path, statements: &[&str]) -> ExportConfig {
        sqlx::any::install_default_drivers();
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let mut conn = AnyConnection::connect(&url).await.unwrap();
        for stmt in statements {
            sqlx::query(stmt).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();

        ExportConfig {
            driver: Driver::Sqlite,
            database: path.display().to_string(),
            ..Default::default()
        }
    }
}
