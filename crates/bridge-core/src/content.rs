//! Tool descriptors and result content
//!
//! A tool result is an ordered sequence of [`ContentBlock`]s. Order matters:
//! descriptive text for an attachment always precedes the binary payload or
//! fallback notice for that same attachment.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Arguments passed to a tool invocation
pub type Arguments = serde_json::Map<String, Value>;

/// A named, schema-described operation exposed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Object schema, passed through to the client untouched
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// One unit of a tool result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Human-readable text
    Text { text: String },
    /// Base64-encoded binary payload
    Binary { mime_type: String, data: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Encode raw bytes into a binary block
    pub fn binary(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Binary {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Text of a text block, `None` for binary blocks
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Binary { .. } => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary { .. })
    }

    /// Decode the payload of a binary block
    ///
    /// Text blocks decode to their UTF-8 bytes.
    pub fn decoded(&self) -> Result<Vec<u8>> {
        match self {
            Self::Text { text } => Ok(text.as_bytes().to_vec()),
            Self::Binary { data, .. } => Ok(STANDARD.decode(data)?),
        }
    }
}

/// Ordered result of a tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// A successful single-text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: None,
        }
    }

    /// A single-text result flagged as an error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(message)],
            is_error: Some(true),
        }
    }

    pub fn from_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            is_error: None,
        }
    }

    pub fn push(&mut self, block: ContentBlock) {
        self.content.push(block);
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Concatenated text of every text block, for logging and assertions
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}
