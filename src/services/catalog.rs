use crate::core::BrandChartCatalog;
use crate::models::{BrandChartKey, BrandSizeChart, Garment};
use crate::services::appwrite::{AppwriteClient, AppwriteError};
use crate::services::cache::{CacheKey, CacheManager};

/// Remote lookup of brand charts by key
#[async_trait::async_trait]
pub trait BrandChartStore: Send + Sync {
    async fn find_brand_chart(
        &self,
        key: &BrandChartKey,
    ) -> Result<Option<BrandSizeChart>, AppwriteError>;
}

#[async_trait::async_trait]
impl BrandChartStore for AppwriteClient {
    async fn find_brand_chart(
        &self,
        key: &BrandChartKey,
    ) -> Result<Option<BrandSizeChart>, AppwriteError> {
        AppwriteClient::find_brand_chart(self, key).await
    }
}

/// A garment together with the size labels about to be resolved for it
#[derive(Debug, Clone)]
pub struct ChartRequest<'a> {
    pub garment: &'a Garment,
    pub sizes: Vec<&'a str>,
}

impl<'a> ChartRequest<'a> {
    pub fn new<S>(garment: &'a Garment, sizes: S) -> Self
    where
        S: IntoIterator<Item = &'a str>,
    {
        Self {
            garment,
            sizes: sizes.into_iter().collect(),
        }
    }

    /// The brand chart is only consulted for sizes the garment's own chart lacks
    fn needs_brand_chart(&self) -> bool {
        self.sizes
            .iter()
            .any(|size| !self.garment.size_chart.contains(size))
    }
}

/// Fetch the brand charts needed to resolve the requested sizes
///
/// Garments without a brand, or whose own chart covers every requested size,
/// are skipped. Lookups go through the cache when one is configured, and
/// misses (including "no chart published") are cached. A failed lookup is
/// logged and leaves the garment to the standard chart.
pub async fn load_brand_charts<'a, I>(
    requests: I,
    store: &dyn BrandChartStore,
    cache: Option<&CacheManager>,
) -> BrandChartCatalog
where
    I: IntoIterator<Item = ChartRequest<'a>>,
{
    let mut catalog = BrandChartCatalog::new();
    let mut seen = Vec::new();

    for request in requests {
        if !request.needs_brand_chart() {
            continue;
        }
        let Some(key) = request.garment.brand_chart_key() else {
            continue;
        };
        if seen.contains(&key) {
            continue;
        }

        if let Some(chart) = lookup(&key, store, cache).await {
            catalog.insert(chart);
        }
        seen.push(key);
    }

    tracing::debug!("Loaded {} brand charts", catalog.len());
    catalog
}

async fn lookup(
    key: &BrandChartKey,
    store: &dyn BrandChartStore,
    cache: Option<&CacheManager>,
) -> Option<BrandSizeChart> {
    let cache_key = CacheKey::brand_chart(key);

    if let Some(cache) = cache {
        if let Ok(cached) = cache.get::<Option<BrandSizeChart>>(&cache_key).await {
            return cached;
        }
    }

    match store.find_brand_chart(key).await {
        Ok(chart) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.set(&cache_key, &chart).await {
                    tracing::warn!("Failed to cache brand chart {}: {}", key, e);
                }
            }
            chart
        }
        Err(e) => {
            tracing::warn!("Brand chart lookup failed for {}: {}", key, e);
            None
        }
    }
}
