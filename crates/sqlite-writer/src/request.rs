//! The JSON envelope carried on the request topic.
//!
//! ```json
//! { "sql": "INSERT INTO t(a) VALUES (?)", "params": [42] }
//! ```
//!
//! Both fields are required. Extra fields are ignored.

use serde::{Deserialize, Serialize};
use writer_database::SqlParam;

/// A SQL statement plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlRequest {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlRequest {
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Decode a message body.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encode as a message body.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
