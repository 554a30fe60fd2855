//! Independent conversions on the rayon pool.
//!
//! A failure is attributed to its file and never stops the others.

use crate::converter::{Conversion, Converter};
use crate::FileFailure;
use rayon::prelude::*;
use tracing::{info, warn};

/// Outcome of one batch entry.
pub type BatchResult = std::result::Result<Conversion, FileFailure>;

impl Converter {
    /// Converts `(name, bytes)` pairs in parallel. Results keep input order.
    pub fn convert_batch<N, B>(&self, inputs: &[(N, B)]) -> Vec<BatchResult>
    where
        N: AsRef<str> + Sync,
        B: AsRef<[u8]> + Sync,
    {
        let results: Vec<BatchResult> = inputs
            .par_iter()
            .map(|(name, bytes)| {
                let name = name.as_ref();
                self.convert(name, bytes.as_ref()).map_err(|error| {
                    warn!(name, %error, "conversion failed");
                    FileFailure {
                        name: name.to_string(),
                        error,
                    }
                })
            })
            .collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(files = inputs.len(), failed, "batch complete");
        results
    }
}
