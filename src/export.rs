//! Artifact transport — persist compressed documents at the process boundary.
//!
//! An artifact travels as one JSON object with the guide hex-encoded:
//!
//! ```text
//! {
//!   "source_language": "fr",
//!   "semantic_payload": "{\"sequence\":[...],\"graph\":{...}}",
//!   "guide": "01000b0100070863...",
//!   "original_hash": "9f86d0...",
//!   "stats": { "original_size": 27, ... }
//! }
//! ```

use std::io::{Read, Write};

use crate::pipeline::Artifact;
use crate::{Error, Result};

/// Serde adapter storing bytes as lowercase hex.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

impl Artifact {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.check()?;
        Ok(artifact)
    }

    /// JSON encoding as UTF-8 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let artifact: Self = serde_json::from_slice(bytes)?;
        artifact.check()?;
        Ok(artifact)
    }

    /// Shape checks that do not need the lexicon.
    fn check(&self) -> Result<()> {
        let digest = hex::decode(&self.original_hash)?;
        if digest.len() != 32 {
            return Err(Error::InvalidPayload(format!(
                "original_hash holds {} bytes, expected a SHA-256 digest",
                digest.len()
            )));
        }
        Ok(())
    }
}

/// Write one artifact as a JSON line.
pub fn write_artifact(artifact: &Artifact, writer: &mut dyn Write) -> Result<()> {
    let json = artifact.to_json()?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    tracing::debug!(bytes = json.len() + 1, "artifact written");
    Ok(())
}

/// Read one artifact written by [`write_artifact`].
pub fn read_artifact(reader: &mut dyn Read) -> Result<Artifact> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Artifact::from_json(buf.trim_end())
}
