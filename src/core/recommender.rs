use chrono::Utc;
use uuid::Uuid;

use crate::core::{
    error::FitError,
    resolver::{BrandChartSource, MeasurementResolver},
    round2,
    scoring::FitScoreCalculator,
};
use crate::models::{
    BodyProfile, FitPreference, Garment, RecommendationTuning, SizeRecommendation, SizeScores,
};

/// Outcome of scoring every size of one garment
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub recommended_size: String,
    pub fit_score: f64,
    pub confidence_score: f64,
    pub alternative_size: Option<String>,
    pub size_scores: SizeScores,
    pub fit_preference: FitPreference,
}

impl RecommendationResult {
    /// Build the persisted record for this result
    pub fn into_record(
        self,
        user_id: impl Into<String>,
        profile_id: impl Into<String>,
        garment: &Garment,
    ) -> SizeRecommendation {
        SizeRecommendation {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            profile_id: profile_id.into(),
            garment_id: garment.garment_id.clone(),
            garment_brand: garment.brand.clone(),
            garment_category: garment.category,
            recommended_size: self.recommended_size,
            fit_score: self.fit_score,
            confidence_score: self.confidence_score,
            alternative_size: self.alternative_size,
            size_scores: self.size_scores,
            fit_preference: self.fit_preference,
            user_selected_size: None,
            user_feedback: None,
            created_at: Utc::now(),
        }
    }
}

/// Size recommendation pipeline
///
/// # Pipeline Stages
/// 1. Determine the candidate sizes
/// 2. Resolve measurements and score each size
/// 3. Pick the best size, first candidate wins ties
/// 4. Propose a borderline alternative
/// 5. Estimate confidence
#[derive(Debug, Clone, Default)]
pub struct SizeRecommendationEngine {
    calculator: FitScoreCalculator,
    resolver: MeasurementResolver,
    tuning: RecommendationTuning,
}

impl SizeRecommendationEngine {
    pub fn new(
        calculator: FitScoreCalculator,
        resolver: MeasurementResolver,
        tuning: RecommendationTuning,
    ) -> Self {
        Self {
            calculator,
            resolver,
            tuning,
        }
    }

    /// Explicit list, else the garment chart's labels, else the fallback list
    pub fn available_sizes(&self, garment: &Garment) -> Vec<String> {
        if !garment.available_sizes.is_empty() {
            return garment.available_sizes.clone();
        }
        if garment.has_embedded_chart() {
            return garment.size_chart.labels().map(str::to_string).collect();
        }
        self.resolver.sizing().fallback_sizes.clone()
    }

    /// Recommend a size of `garment` for `profile`
    ///
    /// # Returns
    /// `FitError::NoSizeData` when there are no candidate sizes or a size
    /// cannot be resolved from any chart.
    pub fn recommend(
        &self,
        profile: &BodyProfile,
        garment: &Garment,
        preference: FitPreference,
        brand_charts: &dyn BrandChartSource,
    ) -> Result<RecommendationResult, FitError> {
        let sizes = self.available_sizes(garment);
        if sizes.is_empty() {
            return Err(FitError::NoSizeData(garment.garment_id.clone()));
        }

        let mut size_scores = SizeScores::new();
        for size in &sizes {
            let resolved = self
                .resolver
                .resolve(garment, size, brand_charts)
                .ok_or_else(|| FitError::NoSizeData(garment.garment_id.clone()))?;

            let score = self.calculator.score(
                profile,
                &resolved.measurements,
                preference,
                garment.category,
            );
            tracing::debug!(
                "Scored size {} of {} at {:.2} ({:?} chart)",
                size,
                garment.garment_id,
                score,
                resolved.source
            );
            size_scores.insert(size.as_str(), score);
        }

        let (best_size, best_score) = best_size(&size_scores)
            .ok_or_else(|| FitError::NoSizeData(garment.garment_id.clone()))?;
        let ranked = ranked_sizes(&size_scores);

        let alternative_size = self.alternative_size(&ranked, best_size, best_score);
        let confidence = self.confidence(&ranked, best_score, garment);
        let recommended_size = best_size.to_string();

        tracing::debug!(
            "Recommended {} for {} (score {:.2}, confidence {:.2})",
            recommended_size,
            garment.garment_id,
            best_score,
            confidence
        );

        Ok(RecommendationResult {
            recommended_size,
            fit_score: round2(best_score),
            confidence_score: round2(confidence),
            alternative_size,
            size_scores,
            fit_preference: preference,
        })
    }

    /// Runner-up for borderline cases
    ///
    /// Only proposed when the best score is below the alternative threshold
    /// and the runner-up is within the margin.
    fn alternative_size(
        &self,
        ranked: &[(&str, f64)],
        best_size: &str,
        best_score: f64,
    ) -> Option<String> {
        if best_score >= self.tuning.alternative_threshold {
            return None;
        }

        ranked
            .iter()
            .find(|(size, _)| *size != best_size)
            .filter(|(_, score)| *score > best_score - self.tuning.alternative_margin)
            .map(|(size, _)| size.to_string())
    }

    /// Mean of best-score, score-gap and data-quality factors, scaled to 0-100
    fn confidence(&self, ranked: &[(&str, f64)], best_score: f64, garment: &Garment) -> f64 {
        let tuning = &self.tuning.confidence;
        let mut factors = Vec::with_capacity(3);

        factors.push(
            tuning
                .best_score_tiers
                .iter()
                .find(|tier| best_score >= tier.threshold)
                .map(|tier| tier.factor)
                .unwrap_or(tuning.best_score_floor),
        );

        if let [(_, first), (_, second), ..] = ranked {
            let gap = first - second;
            factors.push(
                tuning
                    .gap_tiers
                    .iter()
                    .find(|tier| gap > tier.threshold)
                    .map(|tier| tier.factor)
                    .unwrap_or(tuning.gap_floor),
            );
        }

        factors.push(if garment.has_embedded_chart() {
            tuning.embedded_chart_quality
        } else {
            tuning.fallback_chart_quality
        });

        let mean = factors.iter().sum::<f64>() / factors.len() as f64;
        (mean * 100.0).clamp(0.0, 100.0)
    }
}

/// Highest score; on ties the earliest size wins
fn best_size(scores: &SizeScores) -> Option<(&str, f64)> {
    scores.iter().fold(None, |best, (size, &score)| match best {
        Some((_, best_score)) if score <= best_score => best,
        _ => Some((size, score)),
    })
}

/// Sizes by descending score, keeping candidate order among equal scores
fn ranked_sizes(scores: &SizeScores) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = scores.iter().map(|(size, &score)| (size, score)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::NoBrandCharts;
    use crate::models::{GarmentCategory, MeasurementSet, SizeChart};

    fn profile() -> BodyProfile {
        BodyProfile::new(95.0, 80.0, 95.0)
    }

    fn shirt(chart: SizeChart) -> Garment {
        Garment::new("shirt-1", GarmentCategory::Shirt).with_size_chart(chart)
    }

    #[test]
    fn test_exact_size_recommended() {
        let engine = SizeRecommendationEngine::default();
        let garment = shirt(
            [
                ("M", MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0)),
                ("L", MeasurementSet::chest_waist_hips(100.0, 85.0, 100.0)),
            ]
            .into_iter()
            .collect(),
        );

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();

        assert_eq!(result.recommended_size, "M");
        assert_eq!(result.fit_score, 98.0);
        assert_eq!(result.alternative_size, None);
        assert_eq!(result.size_scores.labels().collect::<Vec<_>>(), vec!["M", "L"]);
    }

    #[test]
    fn test_ties_go_to_first_available_size() {
        let engine = SizeRecommendationEngine::default();
        let same = MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0);
        let garment = shirt([("L", same), ("M", same)].into_iter().collect());

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();
        assert_eq!(result.recommended_size, "L");

        let reordered = garment.clone().with_available_sizes(["M", "L"]);
        let result = engine
            .recommend(&profile(), &reordered, FitPreference::Regular, &NoBrandCharts)
            .unwrap();
        assert_eq!(result.recommended_size, "M");
    }

    #[test]
    fn test_borderline_alternative_proposed() {
        let engine = SizeRecommendationEngine::default();
        // chest off by 5.3% and 6.3%: both sizes land on the 70 breakpoint
        let garment = Garment::new("dress-2", GarmentCategory::Dress).with_size_chart(
            [
                ("S", MeasurementSet::chest_waist_hips(90.0, 75.0, 90.0)),
                ("L", MeasurementSet::chest_waist_hips(101.0, 85.0, 101.0)),
            ]
            .into_iter()
            .collect(),
        );

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();

        assert!(result.fit_score < 80.0);
        assert_eq!(result.recommended_size, "S");
        assert_eq!(result.alternative_size.as_deref(), Some("L"));
    }

    #[test]
    fn test_distant_runner_up_not_proposed() {
        let engine = SizeRecommendationEngine::default();
        let garment = Garment::new("dress-1", GarmentCategory::Dress).with_size_chart(
            [
                ("M", MeasurementSet::chest_waist_hips(90.0, 75.0, 90.0)),
                ("XXL", MeasurementSet::chest_waist_hips(120.0, 105.0, 120.0)),
            ]
            .into_iter()
            .collect(),
        );

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();

        assert_eq!(result.recommended_size, "M");
        assert!(result.fit_score < 80.0);
        assert_eq!(result.alternative_size, None);
    }

    #[test]
    fn test_single_size_has_no_alternative() {
        let engine = SizeRecommendationEngine::default();
        let garment = shirt([("S", MeasurementSet::chest_waist_hips(85.0, 70.0, 85.0))].into_iter().collect());

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();

        assert_eq!(result.recommended_size, "S");
        assert_eq!(result.fit_score, 42.0);
        assert_eq!(result.alternative_size, None);
        // best tier 0.4, no gap factor, embedded chart 0.9
        assert_eq!(result.confidence_score, 65.0);
    }

    #[test]
    fn test_confidence_factors() {
        let engine = SizeRecommendationEngine::default();
        let garment = Garment::new("dress-1", GarmentCategory::Dress).with_size_chart(
            [
                ("M", MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0)),
                ("XL", MeasurementSet::chest_waist_hips(110.0, 95.0, 110.0)),
            ]
            .into_iter()
            .collect(),
        );

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();

        // best 100 -> 1.0, gap > 20 -> 1.0, embedded chart -> 0.9
        assert_eq!(result.confidence_score, 96.67);
    }

    #[test]
    fn test_fallback_sizes_use_standard_chart() {
        let engine = SizeRecommendationEngine::default();
        let garment = Garment::new("tee-1", GarmentCategory::TShirt);

        assert_eq!(engine.available_sizes(&garment), vec!["XS", "S", "M", "L", "XL"]);

        let result = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap();
        assert_eq!(result.recommended_size, "M");
        assert_eq!(result.size_scores.len(), 5);
        // t-shirt +5 clamps M to 100; S and L reach 75
        assert_eq!(result.size_scores.get("S"), Some(&75.0));
        // best 100 -> 1.0, gap 25 -> 1.0, standard chart -> 0.6
        assert_eq!(result.confidence_score, 86.67);
    }

    #[test]
    fn test_no_size_data() {
        let sizing = crate::models::SizingTables {
            fallback_sizes: vec![],
            ..Default::default()
        };
        let engine = SizeRecommendationEngine::new(
            FitScoreCalculator::default(),
            MeasurementResolver::new(sizing),
            RecommendationTuning::default(),
        );
        let garment = Garment::new("tee-1", GarmentCategory::TShirt);

        let err = engine
            .recommend(&profile(), &garment, FitPreference::Regular, &NoBrandCharts)
            .unwrap_err();
        assert_eq!(err, FitError::NoSizeData("tee-1".to_string()));
    }

    #[test]
    fn test_into_record_snapshots_garment() {
        let engine = SizeRecommendationEngine::default();
        let garment = Garment::new("tee-1", GarmentCategory::TShirt).with_brand("Acme");

        let record = engine
            .recommend(&profile(), &garment, FitPreference::Slim, &NoBrandCharts)
            .unwrap()
            .into_record("user-1", "profile-1", &garment);

        assert_eq!(record.garment_brand.as_deref(), Some("Acme"));
        assert_eq!(record.fit_preference, FitPreference::Slim);
        assert!(record.user_selected_size.is_none());
        assert!(!record.is_return_signal());
    }
}
