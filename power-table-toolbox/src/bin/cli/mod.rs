mod replay;

use color_eyre::Report;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Cli {
    /// Replay a block script and dump the recorded voting power tables
    Replay(replay::Replay),
}

impl Cli {
    pub fn exec(self) -> Result<(), Report> {
        match self {
            Self::Replay(cmd) => cmd.exec(),
        }
    }
}
