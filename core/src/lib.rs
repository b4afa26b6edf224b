//! Core library for bodylog: the record store, the date/number normalizer,
//! the CSV codec, and the import reconciliation engine.

pub mod backup;
pub mod csv_codec;
pub mod db;
pub mod import;
pub mod models;
pub mod normalize;
pub mod stats;
