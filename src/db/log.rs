use crate::errors::AppResult;
use chrono::Local;
use rusqlite::Connection;
use rusqlite::params;

/// Write an internal log line into the `log` table.
pub fn ptlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now, operation, target, message])?;

    Ok(())
}

/// Same as [`ptlog`] but never fails: a broken audit trail must not abort
/// the command that produced it.
pub fn ptlog_quiet(conn: &Connection, operation: &str, target: &str, message: &str) {
    if let Err(e) = ptlog(conn, operation, target, message) {
        tracing::warn!(error = %e, operation, "failed to write internal log");
    }
}
