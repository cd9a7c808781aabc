use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::ptlog_quiet;
use crate::errors::AppResult;
use crate::storage::SqliteStorage;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite storage database and its migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.test)?;

    info("Initializing pixeltracker…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &cfg.database);

    let storage = SqliteStorage::open(&cfg.database)?;
    storage.with_conn(|conn| {
        ptlog_quiet(
            conn,
            "init",
            "storage",
            &format!("Storage initialized at {}", &cfg.database),
        );
        Ok(())
    })?;

    success("pixeltracker initialization completed!");
    Ok(())
}
