mod backup;
mod helpers;
mod history;
mod import;
mod record;
mod stats;

pub(crate) use backup::{cmd_export_csv, cmd_export_json, cmd_import_json};
pub(crate) use history::cmd_history;
pub(crate) use import::cmd_import_csv;
pub(crate) use record::{cmd_delete, cmd_log, cmd_show};
pub(crate) use stats::cmd_stats;
