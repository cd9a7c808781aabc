use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::errors::AppResult;
use crate::storage::SqliteStorage;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let storage = SqliteStorage::open(&cfg.database)?;
        storage.with_conn(LogLogic::print_log)?;
    }

    Ok(())
}
