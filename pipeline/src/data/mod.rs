//! @ai:module:intent Loading and cleaning of processed and raw race tables
//! @ai:module:layer infrastructure
//! @ai:module:public_api RawTable, CleanReport, PreparedData, load_processed_dir, clean_table, prepare_datasets, RaceData, load_raw_dir

pub mod loader;
pub mod raw;

pub use loader::{
    clean_table, load_processed_dir, prepare_datasets, CleanReport, PreparedData, RawTable,
    SEASON_TABLE,
};
pub use raw::{load_raw_dir, ConstructorRow, RaceData, RaceRow, ResultRow};
