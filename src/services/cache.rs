use crate::models::BrandChartKey;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for store lookups
///
/// L1 is a per-process moka cache, L2 is Redis shared across instances.
/// Brand charts change rarely, so both tiers share one TTL.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value, L1 first then L2
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1_cache
                    .insert(key.to_string(), json.as_bytes().to_vec())
                    .await;
                Ok(serde_json::from_str(&json)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::CacheMiss(key.to_string()))
            }
        }
    }

    /// Write a value to both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Brand chart lookups, including negative results
    pub fn brand_chart(key: &BrandChartKey) -> String {
        format!("brand_chart:{}", key)
    }

    pub fn garment(garment_id: &str) -> String {
        format!("garment:{}", garment_id)
    }

    pub fn profile(profile_id: &str) -> String {
        format!("profile:{}", profile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrandSizeChart, GarmentCategory, Gender, SizeChart, SizeSystem};

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_brand_chart_round_trip() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 100, 60)
            .await
            .expect("Failed to create cache");

        let chart = BrandSizeChart {
            brand: "Acme".to_string(),
            garment_type: GarmentCategory::Jacket,
            gender: Gender::Unisex,
            size_system: SizeSystem::Int,
            size_data: SizeChart::new(),
        };
        let key = CacheKey::brand_chart(&chart.key());

        cache.set(&key, &Some(chart.clone())).await.unwrap();
        let cached: Option<BrandSizeChart> = cache.get(&key).await.unwrap();
        assert_eq!(cached, Some(chart));

        cache.delete(&key).await.unwrap();
        assert!(cache.get::<Option<BrandSizeChart>>(&key).await.is_err());
    }

    #[test]
    fn test_cache_key_builder() {
        let key = BrandChartKey {
            brand: "Acme".to_string(),
            garment_type: GarmentCategory::TShirt,
            gender: Gender::Female,
            size_system: SizeSystem::Eu,
        };

        assert_eq!(CacheKey::brand_chart(&key), "brand_chart:Acme:t-shirt:female:EU");
        assert_eq!(CacheKey::garment("g1"), "garment:g1");
        assert_eq!(CacheKey::profile("p1"), "profile:p1");
    }
}
