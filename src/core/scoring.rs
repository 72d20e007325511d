use crate::models::{BodyProfile, FitPreference, GarmentCategory, MeasurementSet, ScoringTables};

/// Calculate a fit score (0-100) for a body against one size's measurements
///
/// Scoring formula:
/// score = clamp(
///     base_score +                 # weighted per-measurement breakpoint scores
///     preference_adjustment +      # slim/relaxed bias on the mean size-body gap
///     category_adjustment,         # per-category forgiveness
///     0, 100)
///
/// The base score divides by the weights of the measurements actually
/// compared, so a partial chart is not penalized for what it omits. With
/// nothing to compare the base is the neutral score.
#[derive(Debug, Clone, Default)]
pub struct FitScoreCalculator {
    tables: ScoringTables,
}

impl FitScoreCalculator {
    pub fn new(tables: ScoringTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    pub fn score(
        &self,
        profile: &BodyProfile,
        measurements: &MeasurementSet,
        preference: FitPreference,
        category: GarmentCategory,
    ) -> f64 {
        let base = self.base_score(profile, measurements);
        let adjusted = base
            + self.preference_adjustment(profile, measurements, preference)
            + self.tables.category_adjustment(category);

        adjusted.clamp(0.0, 100.0)
    }

    /// Weighted breakpoint score before any adjustment
    pub fn base_score(&self, profile: &BodyProfile, measurements: &MeasurementSet) -> f64 {
        let mut weighted = 0.0;
        let mut matched_weight = 0.0;

        for (measurement, weight) in self.tables.weights.pairs() {
            let (Some(body), Some(size)) = (profile.get(measurement), measurements.get(measurement))
            else {
                continue;
            };
            if body <= 0.0 {
                continue;
            }

            weighted += self.measurement_score(diff_percent(body, size)) * weight;
            matched_weight += weight;
        }

        if matched_weight > 0.0 {
            weighted / matched_weight
        } else {
            self.tables.neutral_score
        }
    }

    /// Map an absolute percentage difference onto the breakpoint table
    #[inline]
    pub fn measurement_score(&self, diff_pct: f64) -> f64 {
        self.tables
            .breakpoints
            .iter()
            .find(|bp| diff_pct <= bp.max_diff_pct)
            .map(|bp| bp.score)
            .unwrap_or(self.tables.floor_score)
    }

    pub fn preference_adjustment(
        &self,
        profile: &BodyProfile,
        measurements: &MeasurementSet,
        preference: FitPreference,
    ) -> f64 {
        let adj = &self.tables.preference;
        let avg_diff = mean_size_gap(profile, measurements, &self.tables);

        match preference {
            FitPreference::Regular => 0.0,
            FitPreference::Slim => {
                if avg_diff < 0.0 {
                    adj.bonus
                } else if avg_diff > adj.slim_loose_threshold {
                    -adj.penalty
                } else {
                    0.0
                }
            }
            FitPreference::Relaxed => {
                if avg_diff > 0.0 && avg_diff < adj.relaxed_ease_ceiling {
                    adj.bonus
                } else if avg_diff < -adj.relaxed_tight_threshold {
                    -adj.penalty
                } else {
                    0.0
                }
            }
        }
    }
}

/// Absolute difference between body and size value, as a percentage of the body value
#[inline]
pub fn diff_percent(body_value: f64, size_value: f64) -> f64 {
    (body_value - size_value).abs() / body_value * 100.0
}

/// Mean of (size - body) over the weighted measurements present on both sides
///
/// Non-positive body values count as missing, as in `base_score`.
fn mean_size_gap(profile: &BodyProfile, measurements: &MeasurementSet, tables: &ScoringTables) -> f64 {
    let diffs: Vec<f64> = tables
        .weights
        .pairs()
        .iter()
        .filter_map(|(measurement, _)| {
            let body = profile.get(*measurement).filter(|value| *value > 0.0)?;
            Some(measurements.get(*measurement)? - body)
        })
        .collect();

    if diffs.is_empty() {
        0.0
    } else {
        diffs.iter().sum::<f64>() / diffs.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BodyProfile {
        BodyProfile::new(95.0, 80.0, 95.0)
    }

    #[test]
    fn test_exact_match_scores_full() {
        let calc = FitScoreCalculator::default();
        let size = MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0);

        assert_eq!(calc.base_score(&profile(), &size), 100.0);
        assert_eq!(
            calc.score(&profile(), &size, FitPreference::Regular, GarmentCategory::Dress),
            100.0
        );
    }

    #[test]
    fn test_breakpoints() {
        let calc = FitScoreCalculator::default();
        assert_eq!(calc.measurement_score(0.0), 100.0);
        assert_eq!(calc.measurement_score(2.0), 100.0);
        assert_eq!(calc.measurement_score(4.9), 85.0);
        assert_eq!(calc.measurement_score(8.0), 70.0);
        assert_eq!(calc.measurement_score(10.5), 50.0);
        assert_eq!(calc.measurement_score(15.0), 30.0);
        assert_eq!(calc.measurement_score(15.1), 10.0);
    }

    #[test]
    fn test_difference_sign_does_not_matter() {
        let calc = FitScoreCalculator::default();
        let body = BodyProfile::new(100.0, 80.0, 95.0);
        let smaller = MeasurementSet { chest: Some(95.0), ..Default::default() };
        let larger = MeasurementSet { chest: Some(105.0), ..Default::default() };

        assert_eq!(calc.base_score(&body, &smaller), calc.base_score(&body, &larger));
    }

    #[test]
    fn test_empty_measurements_are_neutral() {
        let calc = FitScoreCalculator::default();
        let empty = MeasurementSet::default();

        assert_eq!(calc.base_score(&profile(), &empty), 50.0);
        assert_eq!(
            calc.score(&profile(), &empty, FitPreference::Slim, GarmentCategory::Shirt),
            48.0
        );
    }

    #[test]
    fn test_partial_chart_is_renormalized() {
        let calc = FitScoreCalculator::default();
        let chest_only = MeasurementSet { chest: Some(95.0), ..Default::default() };

        assert_eq!(calc.base_score(&profile(), &chest_only), 100.0);
    }

    #[test]
    fn test_slim_preference() {
        let calc = FitScoreCalculator::default();
        let smaller = MeasurementSet::chest_waist_hips(94.0, 79.0, 94.0);
        let much_larger = MeasurementSet::chest_waist_hips(102.0, 87.0, 102.0);

        assert_eq!(calc.preference_adjustment(&profile(), &smaller, FitPreference::Slim), 5.0);
        assert_eq!(
            calc.preference_adjustment(&profile(), &much_larger, FitPreference::Slim),
            -10.0
        );
    }

    #[test]
    fn test_relaxed_preference() {
        let calc = FitScoreCalculator::default();
        let roomier = MeasurementSet::chest_waist_hips(98.0, 83.0, 98.0);
        let much_smaller = MeasurementSet::chest_waist_hips(88.0, 73.0, 88.0);
        let exact = MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0);

        assert_eq!(calc.preference_adjustment(&profile(), &roomier, FitPreference::Relaxed), 5.0);
        assert_eq!(
            calc.preference_adjustment(&profile(), &much_smaller, FitPreference::Relaxed),
            -10.0
        );
        assert_eq!(calc.preference_adjustment(&profile(), &exact, FitPreference::Relaxed), 0.0);
    }

    #[test]
    fn test_preference_ignores_missing_body_measurement() {
        let calc = FitScoreCalculator::default();
        let mut profile = profile();
        profile.waist = 0.0;
        let snug = MeasurementSet::chest_waist_hips(94.0, 60.0, 94.0);

        // only chest and hips count: mean gap -1cm
        assert_eq!(calc.preference_adjustment(&profile, &snug, FitPreference::Slim), 5.0);
        assert_eq!(calc.preference_adjustment(&profile, &snug, FitPreference::Relaxed), 0.0);
    }

    #[test]
    fn test_regular_preference_has_no_adjustment() {
        let calc = FitScoreCalculator::default();
        let smaller = MeasurementSet::chest_waist_hips(80.0, 65.0, 80.0);

        assert_eq!(calc.preference_adjustment(&profile(), &smaller, FitPreference::Regular), 0.0);
    }

    #[test]
    fn test_score_is_clamped() {
        let calc = FitScoreCalculator::default();
        let exact = MeasurementSet::chest_waist_hips(94.0, 79.0, 94.0);

        // 100 base + 5 slim + 5 t-shirt
        assert_eq!(
            calc.score(&profile(), &exact, FitPreference::Slim, GarmentCategory::TShirt),
            100.0
        );
    }

    #[test]
    fn test_small_size_scores_in_forties() {
        let calc = FitScoreCalculator::default();
        let small = MeasurementSet::chest_waist_hips(85.0, 70.0, 85.0);

        // chest 10.5% -> 50, waist 12.5% -> 30, hips 10.5% -> 50
        let score = calc.score(&profile(), &small, FitPreference::Regular, GarmentCategory::Shirt);
        assert!((score - 42.0).abs() < 1e-9, "got {}", score);
    }
}
