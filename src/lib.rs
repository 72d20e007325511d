//! Sizefit - fit scoring and size recommendation service
//!
//! Scores how well a garment size fits a body profile, recommends the best
//! size with an alternative and a confidence figure, evaluates layered
//! outfits and records size feedback for anonymized analytics.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    BrandChartCatalog, FeedbackRecorder, FitError, FitScoreCalculator, MeasurementResolver,
    OutfitFitAggregator, RecommendationResult, SizeRecommendationEngine,
};
pub use models::{
    BodyProfile, FitPreference, Garment, GarmentCategory, MeasurementSet, OutfitFitResult,
    OutfitItem, SizeRecommendation,
};
