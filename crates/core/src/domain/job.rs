// Job Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::PayloadError;

/// Unit of work: one page to capture.
///
/// The wire form is a single UTF-8 JSON object carrying exactly the `url`
/// field. Decoding ignores unknown fields, so the record stays
/// forward-compatible by field addition only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub url: String,
}

impl Job {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Encode to the queue wire form (`{"url": "<string>"}`).
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from the queue wire form.
    ///
    /// A missing or empty `url` is reported separately from unparseable
    /// JSON, but both are permanent conditions.
    pub fn from_payload(payload: &[u8]) -> Result<Self, PayloadError> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            url: String,
        }

        let wire: Wire = serde_json::from_slice(payload)?;
        if wire.url.is_empty() {
            return Err(PayloadError::MissingUrl);
        }
        Ok(Self { url: wire.url })
    }
}
