use color_eyre::Report;
use power_table_lib::Params;
use power_table_toolbox::replay::{replay, BlockScript};
use power_table_toolbox::utils::{csv, load_from_file};
use structopt::StructOpt;
use tracing::info;

use std::path::PathBuf;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Replay {
    /// Path to a json or yaml encoded list of blocks
    #[structopt(long)]
    blocks: PathBuf,

    /// Path to a json or yaml encoded `Params`. Defaults apply to every
    /// missing field
    #[structopt(long)]
    params: Option<PathBuf>,

    /// CSV output path, stdout if missing
    #[structopt(long)]
    output: Option<PathBuf>,
}

impl Replay {
    pub fn exec(self) -> Result<(), Report> {
        let Replay {
            blocks,
            params,
            output,
        } = self;

        let blocks: Vec<BlockScript> = load_from_file(&blocks)?;
        let params: Params = match params {
            Some(path) => load_from_file(&path)?,
            None => Params::default(),
        };

        let report = replay(&blocks, &params)?;
        match report.activation_height {
            Some(height) => info!(height, "BTC staking protocol activated"),
            None => info!("BTC staking protocol never activated"),
        }

        match output {
            Some(path) => csv::dump_data_to_csv(&report.entries, &path)?,
            None => csv::dump_data_to_writer(&report.entries, std::io::stdout().lock())?,
        }
        Ok(())
    }
}
