use crate::kv::WriteBatch;
use crate::params::Params;
use crate::Error;

/// Source of the current BTC tip height, usually the BTC light client.
/// A lookup may fail, e.g. before the light client received any header.
pub trait BtcTipOracle {
    fn tip_height(&self) -> Result<u64, Error>;
}

impl<F> BtcTipOracle for F
where
    F: Fn() -> Result<u64, Error>,
{
    fn tip_height(&self) -> Result<u64, Error> {
        self()
    }
}

/// Everything the tally may read or write while processing one block.
///
/// The writes staged here become visible once the block harness commits the
/// batch returned by [`BlockContext::into_batch`].
pub struct BlockContext<'a> {
    height: u64,
    params: &'a Params,
    btc_tip: &'a dyn BtcTipOracle,
    batch: WriteBatch,
}

impl<'a> BlockContext<'a> {
    pub fn new(height: u64, params: &'a Params, btc_tip: &'a dyn BtcTipOracle) -> Self {
        Self {
            height,
            params,
            btc_tip,
            batch: WriteBatch::new(),
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn params(&self) -> &Params {
        self.params
    }

    pub fn btc_tip_height(&self) -> Result<u64, Error> {
        self.btc_tip.tip_height()
    }

    pub fn batch(&self) -> &WriteBatch {
        &self.batch
    }

    pub fn batch_mut(&mut self) -> &mut WriteBatch {
        &mut self.batch
    }

    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }
}
