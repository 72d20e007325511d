use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{FeedbackRecorder, FitError, OutfitFitAggregator, SizeRecommendationEngine};
use crate::models::{
    BodyProfile, ErrorResponse, EvaluateOutfitRequest, FeedbackResponse, Garment, HealthResponse,
    HistoryQuery, HistoryResponse, OutfitItem, RecommendSizeRequest, RecommendationResponse,
    SizeFeedbackRequest,
};
use crate::services::{
    load_brand_charts, AnalyticsChannel, AppwriteClient, AppwriteError, CacheManager,
    ChartRequest, PostgresClient,
};

const MAX_HISTORY_LIMIT: u32 = 100;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub appwrite: Arc<AppwriteClient>,
    pub cache: Option<Arc<CacheManager>>,
    pub postgres: Arc<PostgresClient>,
    pub engine: Arc<SizeRecommendationEngine>,
    pub aggregator: Arc<OutfitFitAggregator>,
    pub recorder: Arc<FeedbackRecorder<AnalyticsChannel>>,
}

/// Configure all fit and sizing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend_size))
        .route("/recommendations/feedback", web::post().to(submit_feedback))
        .route("/recommendations/history", web::get().to(recommendation_history))
        .route("/outfits/evaluate", web::post().to(evaluate_outfit));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);
    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommend a size for one garment
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "profileId": "string",
///   "garmentId": "string",
///   "fitPreference": "slim|regular|relaxed"
/// }
/// ```
async fn recommend_size(
    state: web::Data<AppState>,
    req: web::Json<RecommendSizeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let profile = match fetch_profile(&state, &req.profile_id).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };
    let garment = match fetch_garment(&state, &req.garment_id).await {
        Ok(garment) => garment,
        Err(response) => return response,
    };

    let sizes = state.engine.available_sizes(&garment);
    let brand_charts = load_brand_charts(
        [ChartRequest::new(&garment, sizes.iter().map(String::as_str))],
        &*state.appwrite,
        state.cache.as_deref(),
    )
    .await;

    let result = match state
        .engine
        .recommend(&profile, &garment, req.fit_preference, &brand_charts)
    {
        Ok(result) => result,
        Err(e) => return fit_error_response(&e),
    };

    let recommendation = result.into_record(req.user_id.clone(), req.profile_id.clone(), &garment);

    if let Err(e) = state.postgres.insert_recommendation(&recommendation).await {
        tracing::error!("Failed to store recommendation for {}: {}", req.user_id, e);
        return internal_error("Failed to store recommendation", e);
    }

    state.recorder.track_recommendation(&recommendation, &profile);

    tracing::info!(
        "Recommended {} for garment {} (fit {}, confidence {})",
        recommendation.recommended_size,
        recommendation.garment_id,
        recommendation.fit_score,
        recommendation.confidence_score
    );

    HttpResponse::Ok().json(RecommendationResponse { recommendation })
}

/// Record what the user bought and how it fit
///
/// POST /api/v1/recommendations/feedback
async fn submit_feedback(
    state: web::Data<AppState>,
    req: web::Json<SizeFeedbackRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let recommendation = match state.postgres.get_recommendation(req.recommendation_id).await {
        Ok(Some(recommendation)) => recommendation,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Recommendation not found".to_string(),
                message: format!("No recommendation with id {}", req.recommendation_id),
                status_code: 404,
            })
        }
        Err(e) => {
            tracing::error!("Failed to load recommendation {}: {}", req.recommendation_id, e);
            return internal_error("Failed to load recommendation", e);
        }
    };

    let updated = match state.recorder.apply(
        recommendation,
        req.user_selected_size.clone(),
        &req.user_feedback,
    ) {
        Ok(updated) => updated,
        Err(e) => return fit_error_response(&e),
    };

    if let Err(e) = state.postgres.update_feedback(&updated).await {
        tracing::error!("Failed to store feedback for {}: {}", updated.id, e);
        return internal_error("Failed to store feedback", e);
    }

    state.recorder.track_feedback(&updated);

    HttpResponse::Ok().json(FeedbackResponse {
        detail: "Feedback recorded".to_string(),
        return_reported: updated.is_return_signal(),
        recommendation: updated,
    })
}

/// GET /api/v1/recommendations/history?userId=...&limit=...
async fn recommendation_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    let limit = query.limit.min(MAX_HISTORY_LIMIT);

    match state
        .postgres
        .list_recommendations(&query.user_id, i64::from(limit))
        .await
    {
        Ok(recommendations) => HttpResponse::Ok().json(HistoryResponse {
            total: recommendations.len(),
            recommendations,
        }),
        Err(e) => {
            tracing::error!("Failed to list recommendations for {}: {}", query.user_id, e);
            internal_error("Failed to list recommendations", e)
        }
    }
}

/// Evaluate a layered outfit
///
/// POST /api/v1/outfits/evaluate
///
/// Request body:
/// ```json
/// {
///   "profileId": "string",
///   "items": [{"garmentId": "string", "size": "M", "layer": 1}]
/// }
/// ```
async fn evaluate_outfit(
    state: web::Data<AppState>,
    req: web::Json<EvaluateOutfitRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let profile = match fetch_profile(&state, &req.profile_id).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let garment = match fetch_garment(&state, &item.garment_id).await {
            Ok(garment) => garment,
            Err(response) => return response,
        };
        let mut outfit_item = OutfitItem::new(garment, item.size.clone(), item.layer);
        outfit_item.preference = item.fit_preference;
        items.push(outfit_item);
    }

    let brand_charts = load_brand_charts(
        items
            .iter()
            .map(|item| ChartRequest::new(&item.garment, [item.size.as_str()])),
        &*state.appwrite,
        state.cache.as_deref(),
    )
    .await;

    match state.aggregator.evaluate(&profile, &items, &brand_charts) {
        Ok(result) => {
            tracing::info!(
                "Evaluated outfit of {} items for profile {} (fit {})",
                result.garments.len(),
                req.profile_id,
                result.overall_fit_score
            );
            HttpResponse::Ok().json(result)
        }
        Err(e) => fit_error_response(&e),
    }
}

async fn fetch_profile(state: &AppState, profile_id: &str) -> Result<BodyProfile, HttpResponse> {
    state
        .appwrite
        .get_body_profile(profile_id)
        .await
        .map_err(|e| store_error_response("body profile", profile_id, e))
}

async fn fetch_garment(state: &AppState, garment_id: &str) -> Result<Garment, HttpResponse> {
    state
        .appwrite
        .get_garment(garment_id)
        .await
        .map_err(|e| store_error_response("garment", garment_id, e))
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: {}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn internal_error(error: &str, cause: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: error.to_string(),
        message: cause.to_string(),
        status_code: 500,
    })
}

fn store_error_response(kind: &str, id: &str, err: AppwriteError) -> HttpResponse {
    match err {
        AppwriteError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Unknown {}", kind),
            message: format!("No {} with id {}", kind, id),
            status_code: 404,
        }),
        e => {
            tracing::error!("Failed to fetch {} {}: {}", kind, id, e);
            internal_error(&format!("Failed to fetch {}", kind), e)
        }
    }
}

/// Map engine errors onto client errors
pub fn fit_error_response(err: &FitError) -> HttpResponse {
    let (status, error) = match err {
        FitError::NoSizeData(_) => (
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "No size data",
        ),
        FitError::InvalidFeedbackCategory(_) => (
            actix_web::http::StatusCode::BAD_REQUEST,
            "Invalid feedback category",
        ),
        FitError::DuplicateLayer(_) | FitError::InvalidLayer(_) => (
            actix_web::http::StatusCode::BAD_REQUEST,
            "Invalid outfit layers",
        ),
    };

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: status.as_u16(),
    })
}
