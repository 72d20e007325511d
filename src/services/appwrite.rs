use crate::models::{BodyProfile, BrandChartKey, BrandSizeChart, Garment};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client
///
/// Read-only access to the stores the engine consumes:
/// - Garments (sizes, size chart, brand, category, gender)
/// - Body profiles
/// - Brand size charts
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub garments: String,
    pub body_profiles: String,
    pub brand_size_charts: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    /// Fetch a garment by document ID
    pub async fn get_garment(&self, garment_id: &str) -> Result<Garment, AppwriteError> {
        self.get_document(&self.collections.garments, garment_id, "garment")
            .await
    }

    /// Fetch a body profile by document ID
    pub async fn get_body_profile(&self, profile_id: &str) -> Result<BodyProfile, AppwriteError> {
        self.get_document(&self.collections.body_profiles, profile_id, "body profile")
            .await
    }

    /// Look up the brand chart for a key; `Ok(None)` when none is published
    pub async fn find_brand_chart(
        &self,
        key: &BrandChartKey,
    ) -> Result<Option<BrandSizeChart>, AppwriteError> {
        let queries = vec![
            format!("equal(\"brand\", \"{}\")", key.brand),
            format!("equal(\"garmentType\", \"{}\")", key.garment_type.as_str()),
            format!("equal(\"gender\", \"{}\")", key.gender.as_str()),
            format!("equal(\"sizeSystem\", \"{}\")", key.size_system.as_str()),
            "limit(1)".to_string(),
        ];

        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        let full_url = format!(
            "{}?query={}",
            self.documents_url(&self.collections.brand_size_charts),
            urlencoding::encode(&queries_json)
        );

        tracing::debug!("Looking up brand chart {}", key);

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(AppwriteError::Unauthorized),
            status => {
                return Err(AppwriteError::ApiError(format!(
                    "Failed to query brand charts: {}",
                    status
                )))
            }
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        match documents.first() {
            Some(doc) => {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).map(Some).map_err(|e| {
                    AppwriteError::InvalidResponse(format!("Failed to parse brand chart: {}", e))
                })
            }
            None => Ok(None),
        }
    }

    async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
        kind: &str,
    ) -> Result<T, AppwriteError> {
        let url = format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(document_id)
        );

        tracing::debug!("Fetching {} {}", kind, document_id);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(AppwriteError::NotFound(format!("{} {}", kind, document_id)))
            }
            StatusCode::UNAUTHORIZED => return Err(AppwriteError::Unauthorized),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Failed to fetch {} {}: {} - {}", kind, document_id, status, body);
                return Err(AppwriteError::ApiError(format!(
                    "Failed to fetch {}: {}",
                    kind, status
                )));
            }
        }

        let json: Value = response.json().await?;
        let data = json.get("data").unwrap_or(&json);

        serde_json::from_value(data.clone())
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse {}: {}", kind, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Garment, GarmentCategory, Gender, SizeSystem};

    fn client(base_url: String) -> AppwriteClient {
        let collections = AppwriteCollections {
            garments: "garments".to_string(),
            body_profiles: "body_profiles".to_string(),
            brand_size_charts: "brand_size_charts".to_string(),
        };

        AppwriteClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            collections,
        )
        .unwrap()
    }

    #[test]
    fn test_appwrite_client_creation() {
        let client = client("https://appwrite.test/v1/".to_string());

        assert_eq!(client.api_key, "test_key");
        assert_eq!(
            client.documents_url("garments"),
            "https://appwrite.test/v1/databases/test_db/collections/garments/documents"
        );
    }

    #[tokio::test]
    async fn test_get_garment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/test_db/collections/garments/documents/g1")
            .match_header("X-Appwrite-Key", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"$id": "g1", "brand": "Acme", "category": "jeans",
                    "availableSizes": ["30", "32"], "sizeChart": {"30": {"waist": 76}}}"#,
            )
            .create_async()
            .await;

        let garment: Garment = client(server.url()).get_garment("g1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(garment.garment_id, "g1");
        assert_eq!(garment.category, GarmentCategory::Jeans);
        assert_eq!(garment.available_sizes, vec!["30", "32"]);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/databases/test_db/collections/body_profiles/documents/nope")
            .with_status(404)
            .create_async()
            .await;

        let result = client(server.url()).get_body_profile("nope").await;

        assert!(matches!(result, Err(AppwriteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_brand_chart() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/databases/test_db/collections/brand_size_charts/documents")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 1, "documents": [{"brand": "Acme", "garmentType": "shirt",
                    "gender": "male", "sizeSystem": "EU", "sizeData": {"48": {"chest": 96}}}]}"#,
            )
            .create_async()
            .await;

        let key = BrandChartKey {
            brand: "Acme".to_string(),
            garment_type: GarmentCategory::Shirt,
            gender: Gender::Male,
            size_system: SizeSystem::Eu,
        };
        let chart = client(server.url()).find_brand_chart(&key).await.unwrap().unwrap();

        assert_eq!(chart.key(), key);
        assert_eq!(chart.size_data.get("48").and_then(|m| m.chest), Some(96.0));
    }

    #[tokio::test]
    async fn test_no_brand_chart() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/databases/test_db/collections/brand_size_charts/documents")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total": 0, "documents": []}"#)
            .create_async()
            .await;

        let key = BrandChartKey {
            brand: "Nobody".to_string(),
            garment_type: GarmentCategory::Coat,
            gender: Gender::Unisex,
            size_system: SizeSystem::Int,
        };

        assert!(client(server.url()).find_brand_chart(&key).await.unwrap().is_none());
    }
}
