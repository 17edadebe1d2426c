pub mod replay;
pub mod utils;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PowerTable(#[from] power_table_lib::Error),

    #[error("block at height {height} does not follow block at height {previous}")]
    NonMonotonicHeight { previous: u64, height: u64 },

    #[error("unsupported file format {0:?}, expected json or yaml")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
