use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::{AnalyticsError, AnalyticsSink};
use crate::models::{SizeFeedbackEvent, SizeRecommendationEvent};
use crate::services::postgres::{PostgresClient, PostgresError};

/// Event queued for the analytics worker
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    Recommendation(SizeRecommendationEvent),
    Feedback(SizeFeedbackEvent),
}

/// Storage the analytics worker drains into
#[async_trait::async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), PostgresError>;
}

#[async_trait::async_trait]
impl AnalyticsStore for PostgresClient {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), PostgresError> {
        match event {
            AnalyticsEvent::Recommendation(event) => self.insert_size_analytics(event).await,
            AnalyticsEvent::Feedback(event) => {
                if !self.apply_size_feedback(event).await? {
                    tracing::debug!(
                        "No analytics row today for {}/{}/{}",
                        event.brand,
                        event.garment_category.as_str(),
                        event.recommended_size
                    );
                }
                Ok(())
            }
        }
    }
}

/// Non-blocking analytics sink backed by an unbounded channel
#[derive(Debug, Clone)]
pub struct AnalyticsChannel {
    tx: mpsc::UnboundedSender<AnalyticsEvent>,
}

impl AnalyticsChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.tx.send(event).map_err(|_| AnalyticsError::ChannelClosed)
    }
}

impl AnalyticsSink for AnalyticsChannel {
    fn track_size_recommendation(&self, event: SizeRecommendationEvent) -> Result<(), AnalyticsError> {
        self.send(AnalyticsEvent::Recommendation(event))
    }

    fn track_size_feedback(&self, event: SizeFeedbackEvent) -> Result<(), AnalyticsError> {
        self.send(AnalyticsEvent::Feedback(event))
    }
}

/// Drain queued events into the store until every sender is dropped
pub fn spawn_analytics_worker<S>(
    mut rx: mpsc::UnboundedReceiver<AnalyticsEvent>,
    store: Arc<S>,
) -> JoinHandle<()>
where
    S: AnalyticsStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = store.record(&event).await {
                tracing::warn!("Failed to store analytics event: {}", e);
            }
        }
        tracing::info!("Analytics worker stopped");
    })
}
