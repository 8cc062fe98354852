//! # Response Normalization
//!
//! The backend is inconsistent about its response shapes. This module turns
//! raw JSON bodies into typed values.
//!
//! ## Accepted Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  List                                                                   │
//! │    { "data": [ {...}, {...} ] }   ──► Vec<T>                            │
//! │    [ {...}, {...} ]               ──► Vec<T>                            │
//! │    anything else                  ──► MalformedResponse                 │
//! │                                                                         │
//! │    A row that fails to decode is skipped and logged, not fatal.         │
//! │                                                                         │
//! │  Mutation                                                               │
//! │    { "message": "Lead created" }  ──► Ok(MutationReply)                 │
//! │    { "error": "Duplicate email" } ──► Rejected("Duplicate email")       │
//! │    {} / null                      ──► Ok(MutationReply::default())      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{ClientError, ClientResult};

/// Extracts and decodes the rows of a list response.
pub fn normalize_list<T: DeserializeOwned>(body: Value) -> ClientResult<Vec<T>> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(ClientError::MalformedResponse(format!(
                    "`data` is not an array: {}",
                    json_kind(&other)
                )))
            }
            None => {
                return Err(ClientError::MalformedResponse(
                    "object without a `data` array".to_string(),
                ))
            }
        },
        other => {
            return Err(ClientError::MalformedResponse(format!(
                "expected an array or {{ data: [...] }}, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<T>(row) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(index, error = %e, "Skipping row that failed to decode");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!(total, kept = decoded.len(), "Dropped undecodable rows from list response");
    }

    Ok(decoded)
}

/// Body returned by create, update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MutationReply {
    /// Parses a reply; an `error` field becomes [`ClientError::Rejected`].
    pub fn parse(body: Value) -> ClientResult<Self> {
        let reply = match body {
            Value::Null => MutationReply::default(),
            Value::Object(_) => serde_json::from_value::<MutationReply>(body).map_err(|e| {
                ClientError::MalformedResponse(format!("mutation reply: {}", e))
            })?,
            other => {
                return Err(ClientError::MalformedResponse(format!(
                    "mutation reply must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        match reply.error {
            Some(error) => Err(ClientError::Rejected(error)),
            None => Ok(reply),
        }
    }

    /// Backend message, or `fallback` when it sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
