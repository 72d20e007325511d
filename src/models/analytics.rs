use serde::{Deserialize, Serialize};

use super::domain::{BodyProfile, GarmentCategory, SizeRecommendation};

const UNKNOWN: &str = "Unknown";

/// Anonymized record of a recommendation being served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRecommendationEvent {
    pub brand: String,
    pub garment_category: GarmentCategory,
    pub recommended_size: String,
    pub fit_score: f64,
    pub height_range: String,
    pub weight_range: Option<String>,
    pub body_type: String,
}

impl SizeRecommendationEvent {
    pub fn new(recommendation: &SizeRecommendation, profile: &BodyProfile) -> Self {
        Self {
            brand: brand_or_unknown(recommendation.garment_brand.as_deref()),
            garment_category: recommendation.garment_category,
            recommended_size: recommendation.recommended_size.clone(),
            fit_score: recommendation.fit_score,
            height_range: value_range(profile.height, 10),
            weight_range: profile.weight.map(|w| value_range(Some(w), 10)),
            body_type: profile
                .body_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "average".to_string()),
        }
    }
}

/// Correction signal attached to the matching analytics record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeFeedbackEvent {
    pub brand: String,
    pub garment_category: GarmentCategory,
    pub recommended_size: String,
    pub actual_size: Option<String>,
    pub return_reported: bool,
}

impl SizeFeedbackEvent {
    pub fn new(recommendation: &SizeRecommendation) -> Self {
        Self {
            brand: brand_or_unknown(recommendation.garment_brand.as_deref()),
            garment_category: recommendation.garment_category,
            recommended_size: recommendation.recommended_size.clone(),
            actual_size: recommendation.user_selected_size.clone(),
            return_reported: recommendation.is_return_signal(),
        }
    }
}

fn brand_or_unknown(brand: Option<&str>) -> String {
    brand
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Bucket a value into a `lower-upper` range of width `step`
pub fn value_range(value: Option<f64>, step: u32) -> String {
    match value {
        Some(v) if v > 0.0 && step > 0 => {
            let step = step as i64;
            let lower = (v as i64 / step) * step;
            format!("{}-{}", lower, lower + step)
        }
        _ => UNKNOWN.to_string(),
    }
}
