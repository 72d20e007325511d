use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::domain::FitPreference;

/// Request a size recommendation for one garment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendSizeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "garment_id", rename = "garmentId")]
    pub garment_id: String,
    #[serde(default, alias = "fit_preference", rename = "fitPreference")]
    pub fit_preference: FitPreference,
}

/// Report what the user actually did with a recommendation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SizeFeedbackRequest {
    #[serde(alias = "recommendation_id", rename = "recommendationId")]
    pub recommendation_id: Uuid,
    #[validate(length(min = 1, max = 10))]
    #[serde(alias = "user_selected_size", rename = "userSelectedSize")]
    pub user_selected_size: String,
    #[validate(length(min = 1))]
    #[serde(alias = "user_feedback", rename = "userFeedback")]
    pub user_feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OutfitItemRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "garment_id", rename = "garmentId")]
    pub garment_id: String,
    #[validate(length(min = 1, max = 10))]
    pub size: String,
    #[validate(range(min = 1))]
    pub layer: u32,
    #[serde(default, alias = "fit_preference", rename = "fitPreference")]
    pub fit_preference: Option<FitPreference>,
}

/// Evaluate a layered outfit
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateOutfitRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: String,
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<OutfitItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    50
}
