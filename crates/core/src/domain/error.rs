// Domain Error Types

use thiserror::Error;

/// Why a queue payload cannot become a job.
///
/// Either way the payload is poison: no number of redeliveries will fix it,
/// so consumers discard without requeueing.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("payload is not a valid JSON job record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload has no url field")]
    MissingUrl,
}
