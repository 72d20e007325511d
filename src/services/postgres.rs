use crate::models::{
    FeedbackCategory, SizeFeedbackEvent, SizeRecommendation, SizeRecommendationEvent, SizeScores,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// PostgreSQL store for recommendations and size analytics
///
/// `size_recommendations` keeps every recommendation served along with the
/// feedback later attached to it. `size_analytics` holds the anonymized
/// aggregate rows fed by the analytics worker.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn insert_recommendation(
        &self,
        recommendation: &SizeRecommendation,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO size_recommendations (
                id, user_id, profile_id, garment_id, garment_brand, garment_category,
                recommended_size, fit_score, confidence_score, alternative_size,
                size_scores, fit_preference, user_selected_size, user_feedback, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#;

        sqlx::query(query)
            .bind(recommendation.id)
            .bind(&recommendation.user_id)
            .bind(&recommendation.profile_id)
            .bind(&recommendation.garment_id)
            .bind(&recommendation.garment_brand)
            .bind(recommendation.garment_category.as_str())
            .bind(&recommendation.recommended_size)
            .bind(recommendation.fit_score)
            .bind(recommendation.confidence_score)
            .bind(&recommendation.alternative_size)
            .bind(Json(&recommendation.size_scores))
            .bind(recommendation.fit_preference.as_str())
            .bind(&recommendation.user_selected_size)
            .bind(recommendation.user_feedback.map(|f| f.as_str()))
            .bind(recommendation.created_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Stored recommendation {} for user {}",
            recommendation.id,
            recommendation.user_id
        );

        Ok(())
    }

    pub async fn get_recommendation(
        &self,
        id: Uuid,
    ) -> Result<Option<SizeRecommendation>, PostgresError> {
        let query = r#"
            SELECT *
            FROM size_recommendations
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(recommendation_from_row).transpose()
    }

    /// Persist the feedback fields of an existing recommendation
    pub async fn update_feedback(
        &self,
        recommendation: &SizeRecommendation,
    ) -> Result<(), PostgresError> {
        let query = r#"
            UPDATE size_recommendations
            SET user_selected_size = $2, user_feedback = $3
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(recommendation.id)
            .bind(&recommendation.user_selected_size)
            .bind(recommendation.user_feedback.map(|f| f.as_str()))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PostgresError::NotFound(format!(
                "recommendation {}",
                recommendation.id
            )));
        }

        Ok(())
    }

    /// Most recent recommendations for a user, newest first
    pub async fn list_recommendations(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<SizeRecommendation>, PostgresError> {
        let query = r#"
            SELECT *
            FROM size_recommendations
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(recommendation_from_row).collect()
    }

    pub async fn insert_size_analytics(
        &self,
        event: &SizeRecommendationEvent,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO size_analytics (
                brand, garment_category, recommended_size, fit_score,
                height_range, weight_range, body_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;

        sqlx::query(query)
            .bind(&event.brand)
            .bind(event.garment_category.as_str())
            .bind(&event.recommended_size)
            .bind(event.fit_score)
            .bind(&event.height_range)
            .bind(&event.weight_range)
            .bind(&event.body_type)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Attach feedback to today's latest matching analytics row
    ///
    /// Returns false when no row matched.
    pub async fn apply_size_feedback(
        &self,
        event: &SizeFeedbackEvent,
    ) -> Result<bool, PostgresError> {
        let query = r#"
            UPDATE size_analytics
            SET actual_size = $4, return_reported = $5
            WHERE id = (
                SELECT id
                FROM size_analytics
                WHERE brand = $1
                  AND garment_category = $2
                  AND recommended_size = $3
                  AND created_at::date = CURRENT_DATE
                ORDER BY created_at DESC
                LIMIT 1
            )
        "#;

        let result = sqlx::query(query)
            .bind(&event.brand)
            .bind(event.garment_category.as_str())
            .bind(&event.recommended_size)
            .bind(&event.actual_size)
            .bind(event.return_reported)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn recommendation_from_row(row: &PgRow) -> Result<SizeRecommendation, PostgresError> {
    let category: String = row.try_get("garment_category")?;
    let preference: String = row.try_get("fit_preference")?;
    let feedback: Option<String> = row.try_get("user_feedback")?;
    let size_scores: Json<SizeScores> = row.try_get("size_scores")?;

    Ok(SizeRecommendation {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        profile_id: row.try_get("profile_id")?,
        garment_id: row.try_get("garment_id")?,
        garment_brand: row.try_get("garment_brand")?,
        garment_category: category.parse().map_err(PostgresError::InvalidRow)?,
        recommended_size: row.try_get("recommended_size")?,
        fit_score: row.try_get("fit_score")?,
        confidence_score: row.try_get("confidence_score")?,
        alternative_size: row.try_get("alternative_size")?,
        size_scores: size_scores.0,
        fit_preference: preference.parse().map_err(PostgresError::InvalidRow)?,
        user_selected_size: row.try_get("user_selected_size")?,
        user_feedback: feedback
            .map(|f| f.parse::<FeedbackCategory>())
            .transpose()
            .map_err(|e| PostgresError::InvalidRow(e.to_string()))?,
        created_at: row.try_get("created_at")?,
    })
}
