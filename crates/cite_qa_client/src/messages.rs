//! HTTP message types for the `/api/ask` endpoint. Server → client JSON.

use serde::{Deserialize, Serialize};

/// Name of the query-string parameter carrying the user's question.
pub const QUERY_PARAM: &str = "query";

/// One cited law: its number label and body text, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCitation {
    pub number: String,
    pub text: String,
}

/// Server → client: answer to one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutput {
    #[serde(default)]
    pub query: String,
    pub response: String,
    /// Missing or `null` in the body decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub citations: Vec<QueryCitation>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<QueryCitation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<Vec<QueryCitation>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl QueryOutput {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
