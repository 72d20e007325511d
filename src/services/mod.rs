// Service exports
pub mod analytics;
pub mod appwrite;
pub mod cache;
pub mod catalog;
pub mod postgres;

pub use analytics::{spawn_analytics_worker, AnalyticsChannel, AnalyticsEvent, AnalyticsStore};
pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use catalog::{load_brand_charts, BrandChartStore, ChartRequest};
pub use postgres::{PostgresClient, PostgresError};
