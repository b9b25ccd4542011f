use std::fmt;

use thiserror::Error;

use crate::document::Document;

/// Text formats a codec speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// The format documents are persisted in before encryption.
    Canonical,
    /// JSON interchange text.
    Json,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Canonical => f.write_str("canonical"),
            TextFormat::Json => f.write_str("JSON"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed {format} text: {reason}")]
    Decode { format: TextFormat, reason: String },
    #[error("cannot render {format} text: {reason}")]
    Encode { format: TextFormat, reason: String },
}

/// Serializes documents to and from the canonical text format, and bridges
/// them to JSON text for interchange.
pub trait StructuredCodec: Send + Sync {
    fn encode(&self, document: &Document) -> Result<String, CodecError>;

    fn decode(&self, text: &str) -> Result<Document, CodecError>;

    /// Indented JSON rendering of `document`.
    fn to_json_text(&self, document: &Document) -> Result<String, CodecError>;

    /// Parses JSON text whose top level must be an object.
    fn from_json_text(&self, text: &str) -> Result<Document, CodecError>;
}
