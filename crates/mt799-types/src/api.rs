use serde::{Deserialize, Serialize};

use crate::models::ParsedMessage;

// -- Upload --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub parsed_fields: ParsedMessage,
    pub saved_to_database: bool,
    /// Row id assigned by the store; absent when the write failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

// -- Stored messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwiftMessageResponse {
    pub id: i64,
    pub reference: String,
    pub related_reference: String,
    pub narrative: String,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
