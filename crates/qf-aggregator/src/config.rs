//! Static feed configuration.

use serde::Deserialize;

/// Construction-time parameters of one aggregator instance.
///
/// These describe the feed itself and never change at runtime; everything
/// that rotates (roster membership, thresholds, digest) lives in the config
/// epoch instead.
#[derive(Clone, Debug, Deserialize)]
pub struct AggregatorConfig {
    /// Fixed-point precision of reported answers.
    pub decimals: u8,

    /// Human-readable feed description, e.g. an asset pair.
    pub description: String,

    /// Interface version reported on the read surface.
    pub version: u64,

    /// Minimum count of distinct valid signers a co-signed report must
    /// carry. Signature presence alone is not treated as safety.
    pub min_signatures: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            decimals: 8,
            description: String::new(),
            version: 1,
            min_signatures: 1,
        }
    }
}
