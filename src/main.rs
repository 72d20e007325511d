use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use sizefit::config::{LoggingSettings, Settings};
use sizefit::core::{
    FeedbackRecorder, FitScoreCalculator, MeasurementResolver, OutfitFitAggregator,
    SizeRecommendationEngine,
};
use sizefit::routes::{self, AppState};
use sizefit::services::{
    spawn_analytics_worker, AnalyticsChannel, AppwriteClient, AppwriteCollections, CacheManager,
    PostgresClient,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging);
    info!("Starting sizefit service...");

    let appwrite_collections = AppwriteCollections {
        garments: settings.collection.garments.clone(),
        body_profiles: settings.collection.body_profiles.clone(),
        brand_size_charts: settings.collection.brand_size_charts.clone(),
    };

    let appwrite = AppwriteClient::new(
        settings.appwrite.endpoint.clone(),
        settings.appwrite.api_key.clone(),
        settings.appwrite.project_id.clone(),
        settings.appwrite.database_id.clone(),
        appwrite_collections,
    )
    .map(Arc::new)
    .map_err(|e| startup_error("Failed to build Appwrite client", e))?;

    info!("Appwrite client initialized");

    // Cache is optional; brand charts are fetched directly without it
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(3600);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                Some(Arc::new(c))
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running without cache", e);
                None
            }
        },
        None => {
            info!("No Redis URL configured, running without cache");
            None
        }
    };

    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = PostgresClient::new(
        &settings.database.url,
        db_max_conn,
        settings.database.min_connections.unwrap_or(1),
        settings.database.acquire_timeout_secs.unwrap_or(5),
        settings.database.idle_timeout_secs.unwrap_or(600),
    )
    .await
    .map(Arc::new)
    .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let (analytics, analytics_rx) = AnalyticsChannel::new();
    spawn_analytics_worker(analytics_rx, postgres.clone());

    let calculator = FitScoreCalculator::new(settings.scoring.clone());
    let resolver = MeasurementResolver::new(settings.sizing.clone());
    let engine = SizeRecommendationEngine::new(
        calculator.clone(),
        resolver.clone(),
        settings.recommendation.clone(),
    );
    let aggregator = OutfitFitAggregator::new(calculator, resolver, settings.outfit);

    info!(
        "Engine initialized with weights {:?}, fallback sizes {:?}",
        settings.scoring.weights, settings.sizing.fallback_sizes
    );

    let app_state = AppState {
        appwrite,
        cache,
        postgres,
        engine: Arc::new(engine),
        aggregator: Arc::new(aggregator),
        recorder: Arc::new(FeedbackRecorder::new(analytics)),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
