use std::collections::HashSet;

use crate::core::{
    error::FitError,
    resolver::{BrandChartSource, MeasurementResolver},
    round2,
    scoring::FitScoreCalculator,
};
use crate::models::{
    BodyProfile, DrapeEstimate, FitIssue, FitPreference, Garment, GarmentFitResult,
    MeasurementSet, OutfitFitResult, OutfitItem, OutfitTuning,
};

/// Source of drape signals for one worn garment
pub trait DrapeModel {
    fn estimate(
        &self,
        profile: &BodyProfile,
        garment: &Garment,
        measurements: &MeasurementSet,
        layer: u32,
    ) -> DrapeEstimate;
}

/// Fixed drape signals; there is no cloth simulation behind them
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderDrape {
    drape_quality: f64,
    movement_restriction: f64,
}

impl PlaceholderDrape {
    pub fn new(tuning: &OutfitTuning) -> Self {
        Self {
            drape_quality: tuning.drape_quality,
            movement_restriction: tuning.movement_restriction,
        }
    }
}

impl Default for PlaceholderDrape {
    fn default() -> Self {
        Self::new(&OutfitTuning::default())
    }
}

impl DrapeModel for PlaceholderDrape {
    fn estimate(
        &self,
        _profile: &BodyProfile,
        _garment: &Garment,
        _measurements: &MeasurementSet,
        _layer: u32,
    ) -> DrapeEstimate {
        DrapeEstimate {
            drape_quality: self.drape_quality,
            stretch_areas: Vec::new(),
            collision_areas: Vec::new(),
            movement_restriction: self.movement_restriction,
        }
    }
}

/// Evaluates a layered outfit garment by garment
#[derive(Debug, Clone)]
pub struct OutfitFitAggregator<D = PlaceholderDrape> {
    calculator: FitScoreCalculator,
    resolver: MeasurementResolver,
    tuning: OutfitTuning,
    drape: D,
}

impl OutfitFitAggregator<PlaceholderDrape> {
    pub fn new(
        calculator: FitScoreCalculator,
        resolver: MeasurementResolver,
        tuning: OutfitTuning,
    ) -> Self {
        let drape = PlaceholderDrape::new(&tuning);
        Self {
            calculator,
            resolver,
            tuning,
            drape,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            FitScoreCalculator::default(),
            MeasurementResolver::default(),
            OutfitTuning::default(),
        )
    }
}

impl Default for OutfitFitAggregator<PlaceholderDrape> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<D: DrapeModel> OutfitFitAggregator<D> {
    pub fn with_drape_model<M: DrapeModel>(self, drape: M) -> OutfitFitAggregator<M> {
        OutfitFitAggregator {
            calculator: self.calculator,
            resolver: self.resolver,
            tuning: self.tuning,
            drape,
        }
    }

    /// Score every item and aggregate the outfit
    ///
    /// Layers must be unique and start at 1. Results come back innermost
    /// first. An empty outfit scores 0 with 0 confidence.
    pub fn evaluate(
        &self,
        profile: &BodyProfile,
        items: &[OutfitItem],
        brand_charts: &dyn BrandChartSource,
    ) -> Result<OutfitFitResult, FitError> {
        validate_layers(items)?;

        let mut ordered: Vec<&OutfitItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.layer);

        let garments = ordered
            .into_iter()
            .map(|item| self.evaluate_item(profile, item, brand_charts))
            .collect::<Result<Vec<_>, _>>()?;

        if garments.is_empty() {
            return Ok(OutfitFitResult {
                garments,
                overall_fit_score: 0.0,
                confidence: 0.0,
            });
        }

        let count = garments.len() as f64;
        let overall = garments.iter().map(|g| g.fit_score).sum::<f64>() / count;
        let confidence = garments
            .iter()
            .map(|g| (g.fit_score / 100.0 + g.drape.drape_quality) / 2.0)
            .sum::<f64>()
            / count
            * 100.0;

        tracing::debug!(
            "Evaluated outfit of {} garments: fit {:.2}, confidence {:.2}",
            garments.len(),
            overall,
            confidence
        );

        Ok(OutfitFitResult {
            garments,
            overall_fit_score: round2(overall),
            confidence: round2(confidence),
        })
    }

    fn evaluate_item(
        &self,
        profile: &BodyProfile,
        item: &OutfitItem,
        brand_charts: &dyn BrandChartSource,
    ) -> Result<GarmentFitResult, FitError> {
        let garment = &item.garment;
        let resolved = self
            .resolver
            .resolve(garment, &item.size, brand_charts)
            .ok_or_else(|| FitError::NoSizeData(garment.garment_id.clone()))?;

        let preference = item.preference.unwrap_or(FitPreference::Regular);
        let fit_score =
            self.calculator
                .score(profile, &resolved.measurements, preference, garment.category);
        let drape = self
            .drape
            .estimate(profile, garment, &resolved.measurements, item.layer);
        let issues = self.classify_issues(fit_score, &drape);

        Ok(GarmentFitResult {
            garment_id: garment.garment_id.clone(),
            layer: item.layer,
            size: item.size.clone(),
            fit_score: round2(fit_score),
            drape,
            issues,
        })
    }

    /// All matching issues, in check order
    pub fn classify_issues(&self, fit_score: f64, drape: &DrapeEstimate) -> Vec<FitIssue> {
        let mut issues = Vec::new();

        if fit_score < self.tuning.poor_fit_below {
            issues.push(FitIssue::PoorOverallFit);
        } else if fit_score < self.tuning.marginal_fit_below {
            issues.push(FitIssue::MarginalFit);
        }
        if !drape.stretch_areas.is_empty() {
            issues.push(FitIssue::ExcessiveStretching);
        }
        if !drape.collision_areas.is_empty() {
            issues.push(FitIssue::ClippingDetected);
        }
        if drape.movement_restriction > self.tuning.restriction_threshold {
            issues.push(FitIssue::RestrictsMovement);
        }

        issues
    }
}

fn validate_layers(items: &[OutfitItem]) -> Result<(), FitError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.layer == 0 {
            return Err(FitError::InvalidLayer(item.layer));
        }
        if !seen.insert(item.layer) {
            return Err(FitError::DuplicateLayer(item.layer));
        }
    }
    Ok(())
}
