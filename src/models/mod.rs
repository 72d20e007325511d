// Model exports
pub mod analytics;
pub mod domain;
pub mod requests;
pub mod responses;
pub mod scoring;

pub use analytics::{value_range, SizeFeedbackEvent, SizeRecommendationEvent};
pub use domain::{
    BodyProfile, BrandChartKey, BrandSizeChart, DrapeEstimate, FeedbackCategory, FitIssue,
    FitPreference, Garment, GarmentCategory, GarmentFitResult, Gender, Measurement,
    MeasurementSet, OutfitFitResult, OutfitItem, SizeChart, SizeMap, SizeRecommendation,
    SizeScores, SizeSystem,
};
pub use requests::{
    EvaluateOutfitRequest, HistoryQuery, OutfitItemRequest, RecommendSizeRequest,
    SizeFeedbackRequest,
};
pub use responses::{
    ErrorResponse, FeedbackResponse, HealthResponse, HistoryResponse, RecommendationResponse,
};
pub use scoring::{
    Breakpoint, ConfidenceTuning, MeasurementWeights, OutfitTuning, PreferenceAdjustments,
    RecommendationTuning, ScoreTier, ScoringTables, SizingTables,
};
