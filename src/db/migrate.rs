use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// A single schema step. Applied steps are remembered as
/// `migration_applied` rows in the `log` table.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_kv_store",
        description: "Created kv_store table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250412_0002_index_log_operation",
        description: "Added index on log(operation)",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_log_operation ON log(operation);
        "#,
    },
];

/// Ensure that the `log` table exists. It doubles as the migration ledger,
/// so it is created outside the migration list.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;
    tx.commit()?;

    info!(version = m.version, "migration applied");
    Ok(())
}

/// Public entry point: run all pending migrations, oldest first.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            apply(conn, m)?;
        }
    }

    Ok(())
}

/// Versions already recorded in the ledger, in application order.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}
