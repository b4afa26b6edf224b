use std::path::Path;

use anyhow::{Context, Result};

use bodylog_core::backup;
use bodylog_core::csv_codec;
use bodylog_core::db::Database;

pub(crate) fn cmd_export_csv(db: &Database, output: Option<&Path>) -> Result<()> {
    let records = db.get_all()?;
    let text = csv_codec::encode(&records)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} records to {}", records.len(), path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}

pub(crate) fn cmd_export_json(db: &Database, output: Option<&Path>) -> Result<()> {
    let data = backup::export_backup(db)?;
    let text = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} records to {}", data.records.len(), path.display());
        }
        None => println!("{text}"),
    }

    Ok(())
}

pub(crate) fn cmd_import_json(db: &Database, path: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let applied = backup::import_backup(db, &text)?;

    if json {
        println!("{}", serde_json::json!({ "applied": applied }));
    } else {
        println!("Restored {applied} records from backup.");
    }

    Ok(())
}
