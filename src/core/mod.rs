// Core engine exports
pub mod error;
pub mod feedback;
pub mod outfit;
pub mod recommender;
pub mod resolver;
pub mod scoring;

pub use error::FitError;
pub use feedback::{AnalyticsError, AnalyticsSink, FeedbackRecorder};
pub use outfit::{DrapeModel, OutfitFitAggregator, PlaceholderDrape};
pub use recommender::{RecommendationResult, SizeRecommendationEngine};
pub use resolver::{
    BrandChartCatalog, BrandChartSource, ChartSource, MeasurementResolver, NoBrandCharts,
    ResolvedMeasurements,
};
pub use scoring::{diff_percent, FitScoreCalculator};

/// Round to two decimals for reported scores
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
