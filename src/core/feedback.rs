use thiserror::Error;

use crate::core::error::FitError;
use crate::models::{
    BodyProfile, FeedbackCategory, SizeFeedbackEvent, SizeRecommendation, SizeRecommendationEvent,
};

/// Errors from the anonymized analytics sink
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Analytics channel closed")]
    ChannelClosed,

    #[error("Analytics storage error: {0}")]
    Storage(String),
}

/// Fire-and-forget receiver of anonymized sizing events
pub trait AnalyticsSink: Send + Sync {
    fn track_size_recommendation(&self, event: SizeRecommendationEvent) -> Result<(), AnalyticsError>;

    fn track_size_feedback(&self, event: SizeFeedbackEvent) -> Result<(), AnalyticsError>;
}

/// Applies user feedback to recommendations and reports it to analytics
///
/// Analytics failures are logged and never returned to the caller.
#[derive(Debug, Clone)]
pub struct FeedbackRecorder<S> {
    sink: S,
}

impl<S: AnalyticsSink> FeedbackRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Attach the user's chosen size and feedback to a recommendation
    ///
    /// Re-submitting overwrites earlier feedback. The mismatch/return flag is
    /// raised when the chosen size differs from the recommended one or the
    /// feedback is `too_small`/`too_large`. Nothing is reported until
    /// [`track_feedback`](Self::track_feedback) is called with the stored result.
    pub fn apply(
        &self,
        mut recommendation: SizeRecommendation,
        user_selected_size: impl Into<String>,
        feedback_category: &str,
    ) -> Result<SizeRecommendation, FitError> {
        let feedback: FeedbackCategory = feedback_category.parse()?;

        recommendation.user_selected_size = Some(user_selected_size.into());
        recommendation.user_feedback = Some(feedback);

        Ok(recommendation)
    }

    /// Report feedback that has been stored, anonymized
    pub fn track_feedback(&self, recommendation: &SizeRecommendation) {
        let event = SizeFeedbackEvent::new(recommendation);
        tracing::info!(
            "Recorded feedback {} on recommendation {} (return reported: {})",
            recommendation
                .user_feedback
                .map(|feedback| feedback.as_str())
                .unwrap_or("none"),
            recommendation.id,
            event.return_reported
        );

        if let Err(e) = self.sink.track_size_feedback(event) {
            tracing::warn!("Failed to track size feedback for {}: {}", recommendation.id, e);
        }
    }

    /// Report a freshly served recommendation, anonymized
    pub fn track_recommendation(&self, recommendation: &SizeRecommendation, profile: &BodyProfile) {
        let event = SizeRecommendationEvent::new(recommendation, profile);
        if let Err(e) = self.sink.track_size_recommendation(event) {
            tracing::warn!(
                "Failed to track size recommendation {}: {}",
                recommendation.id,
                e
            );
        }
    }
}
