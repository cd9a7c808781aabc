use crate::errors::AppResult;
use crate::utils::time::local_display;
use ansi_term::Colour;
use rusqlite::Connection;

/// ANSI colour for an operation name
fn color_for_operation(op: &str) -> Colour {
    match op {
        "settings_saved" => Colour::Green,
        "settings_reset" => Colour::Red,
        "feedback_sent" => Colour::Cyan,
        "feedback_failed" | "webhook_failed" => Colour::Yellow,
        "webhook_sent" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

pub struct LogRow {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

pub struct LogLogic;

impl LogLogic {
    pub fn load(conn: &Connection) -> AppResult<Vec<LogRow>> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(LogRow {
                id: row.get(0)?,
                date: row.get(1)?,
                operation: row.get(2)?,
                target: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                message: row.get(4)?,
            })
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }
        Ok(entries)
    }

    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let entries = Self::load(conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);

        println!("📜 Internal log:\n");

        for e in entries {
            let date = local_display(&e.date);
            let label = if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, e.target)
            };
            // Padding computed on the visible text, before colouring.
            let padding = " ".repeat(40usize.saturating_sub(label.chars().count()));
            let colored = match label.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color_for_operation(&e.operation).paint(op), rest),
                None => color_for_operation(&e.operation).paint(label.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {:<19} | {}{} => {}",
                e.id,
                date,
                colored,
                padding,
                e.message,
                id_w = id_w
            );
        }

        Ok(())
    }
}
