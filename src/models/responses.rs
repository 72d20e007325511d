use serde::{Deserialize, Serialize};

use crate::models::domain::SizeRecommendation;

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendation: SizeRecommendation,
}

/// Response for the feedback endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub detail: String,
    pub recommendation: SizeRecommendation,
    #[serde(rename = "returnReported")]
    pub return_reported: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub recommendations: Vec<SizeRecommendation>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
