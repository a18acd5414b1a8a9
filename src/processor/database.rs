//! Relational sink backed by SQLite
//!
//! One table per record type, named after the type, with the canonical
//! columns sized from the destination width table. The records of one file
//! are inserted in a single transaction, in chunks of `chunk_size` rows,
//! after the size constraints have been applied once more. A file is either
//! stored completely or not at all.

use crate::error::Result;
use crate::models::{ProcessedFile, RecordSchema};
use crate::processor::sink::RecordSink;
use crate::transform::SizeConstraintEnforcer;

use rusqlite::{Connection, params_from_iter};
use std::path::Path;
use tracing::{debug, info};

/// `CREATE TABLE` statement for one record type
pub fn create_table_sql(schema: RecordSchema) -> String {
    let columns: Vec<String> = schema
        .canonical_fields()
        .iter()
        .map(|f| format!("    \"{}\" {}", f.name(), f.column_type().ddl()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n);",
        schema,
        columns.join(",\n")
    )
}

/// Parameterised `INSERT` statement for one record type
pub fn insert_sql(schema: RecordSchema) -> String {
    let fields = schema.canonical_fields();
    let columns: Vec<String> = fields.iter().map(|f| format!("\"{}\"", f.name())).collect();
    let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        schema,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// SQLite sink for cleaned records.
///
/// Connections are not shared between threads; the orchestrator owns the
/// sink and calls it sequentially.
pub struct SqliteSink {
    conn: Connection,
    chunk_size: usize,
}

impl SqliteSink {
    /// Open (or create) the database at `path`.
    ///
    /// Use `:memory:` for an in-memory database.
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!("Opened database {}", path.as_ref().display());
        Self::with_connection(conn, chunk_size)
    }

    pub fn in_memory(chunk_size: usize) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, chunk_size)
    }

    fn with_connection(conn: Connection, chunk_size: usize) -> Result<Self> {
        // Fail early when the database is unusable
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

        let ddl = [RecordSchema::ValidationOk, RecordSchema::ValidationError]
            .into_iter()
            .map(create_table_sql)
            .collect::<Vec<_>>()
            .join("\n");
        conn.execute_batch(&ddl)?;

        Ok(Self {
            conn,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows stored for a record type
    pub fn count(&self, schema: RecordSchema) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", schema);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl std::fmt::Debug for SqliteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSink")
            .field("path", &self.conn.path())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl RecordSink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn write(&mut self, file: &ProcessedFile) -> Result<usize> {
        let schema = file.schema;
        let mut records = file.records.clone();
        SizeConstraintEnforcer::new(schema).enforce(&mut records);

        let sql = insert_sql(schema);
        let fields = schema.canonical_fields();
        let mut inserted = 0;

        // Dropping the transaction on an early return rolls every chunk back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for chunk in records.chunks(self.chunk_size) {
                for record in chunk {
                    let values = fields.iter().map(|f| record.get(*f).unwrap_or_default());
                    stmt.execute(params_from_iter(values))?;
                }
                inserted += chunk.len();
                debug!("Inserted chunk of {} rows into {}", chunk.len(), schema);
            }
        }
        tx.commit()?;

        info!("Inserted {} records into {}", inserted, schema);
        Ok(inserted)
    }
}
