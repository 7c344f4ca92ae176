//! The hybrid retrieval-and-generation pipeline.

pub mod hybrid;
pub mod probe;
pub mod prompt;
pub mod window;

pub use hybrid::HybridPipeline;
pub use probe::{ConnectivityProbe, TcpProbe};

use serde::{Deserialize, Serialize};

/// One conversation turn, owned by the caller. The pipeline only ever reads
/// a suffix of the history; it never mutates or persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
