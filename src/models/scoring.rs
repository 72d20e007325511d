use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::domain::{GarmentCategory, Measurement, MeasurementSet, SizeChart};

/// Weights of the three girth measurements in the base fit score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementWeights {
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
}

impl MeasurementWeights {
    pub fn pairs(&self) -> [(Measurement, f64); 3] {
        [
            (Measurement::Chest, self.chest),
            (Measurement::Waist, self.waist),
            (Measurement::Hips, self.hips),
        ]
    }
}

impl Default for MeasurementWeights {
    fn default() -> Self {
        Self {
            chest: 0.4,
            waist: 0.3,
            hips: 0.3,
        }
    }
}

/// Score awarded when the percentage difference is at most `max_diff_pct`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub max_diff_pct: f64,
    pub score: f64,
}

impl Breakpoint {
    pub const fn new(max_diff_pct: f64, score: f64) -> Self {
        Self { max_diff_pct, score }
    }
}

/// Adjustments applied for slim/relaxed fit preferences
///
/// `avg_diff` is the mean of (size - body) over chest/waist/hips in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceAdjustments {
    pub bonus: f64,
    pub penalty: f64,
    /// slim: penalize when avg_diff exceeds this
    pub slim_loose_threshold: f64,
    /// relaxed: reward when 0 < avg_diff < this
    pub relaxed_ease_ceiling: f64,
    /// relaxed: penalize when avg_diff is below the negated value
    pub relaxed_tight_threshold: f64,
}

impl Default for PreferenceAdjustments {
    fn default() -> Self {
        Self {
            bonus: 5.0,
            penalty: 10.0,
            slim_loose_threshold: 5.0,
            relaxed_ease_ceiling: 10.0,
            relaxed_tight_threshold: 5.0,
        }
    }
}

/// Tables driving the fit score calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTables {
    pub weights: MeasurementWeights,
    /// Checked in order; the first matching breakpoint wins
    pub breakpoints: Vec<Breakpoint>,
    /// Score for differences beyond the last breakpoint
    pub floor_score: f64,
    /// Score when no measurement pair can be compared
    pub neutral_score: f64,
    pub preference: PreferenceAdjustments,
    /// Unlisted categories get 0
    pub category_adjustments: HashMap<GarmentCategory, f64>,
}

impl ScoringTables {
    pub fn category_adjustment(&self, category: GarmentCategory) -> f64 {
        self.category_adjustments.get(&category).copied().unwrap_or(0.0)
    }
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self {
            weights: MeasurementWeights::default(),
            breakpoints: vec![
                Breakpoint::new(2.0, 100.0),
                Breakpoint::new(5.0, 85.0),
                Breakpoint::new(8.0, 70.0),
                Breakpoint::new(12.0, 50.0),
                Breakpoint::new(15.0, 30.0),
            ],
            floor_score: 10.0,
            neutral_score: 50.0,
            preference: PreferenceAdjustments::default(),
            category_adjustments: default_category_adjustments(),
        }
    }
}

fn default_category_adjustments() -> HashMap<GarmentCategory, f64> {
    HashMap::from([
        (GarmentCategory::TShirt, 5.0),
        (GarmentCategory::Sweater, 5.0),
        (GarmentCategory::Jacket, 3.0),
        (GarmentCategory::Coat, 3.0),
        (GarmentCategory::Dress, 0.0),
        (GarmentCategory::Shirt, -2.0),
        (GarmentCategory::Pants, -2.0),
        (GarmentCategory::Jeans, -3.0),
    ])
}

/// Lower bound of a score tier and the confidence factor it earns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTier {
    pub threshold: f64,
    pub factor: f64,
}

impl ScoreTier {
    pub const fn new(threshold: f64, factor: f64) -> Self {
        Self { threshold, factor }
    }
}

/// Confidence factors, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTuning {
    /// Matched with `best >= threshold`, highest tier first
    pub best_score_tiers: Vec<ScoreTier>,
    pub best_score_floor: f64,
    /// Matched with `gap > threshold`, highest tier first
    pub gap_tiers: Vec<ScoreTier>,
    pub gap_floor: f64,
    pub embedded_chart_quality: f64,
    pub fallback_chart_quality: f64,
}

impl Default for ConfidenceTuning {
    fn default() -> Self {
        Self {
            best_score_tiers: vec![
                ScoreTier::new(90.0, 1.0),
                ScoreTier::new(80.0, 0.8),
                ScoreTier::new(70.0, 0.6),
            ],
            best_score_floor: 0.4,
            gap_tiers: vec![ScoreTier::new(20.0, 1.0), ScoreTier::new(10.0, 0.7)],
            gap_floor: 0.5,
            embedded_chart_quality: 0.9,
            fallback_chart_quality: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationTuning {
    /// Alternatives are only proposed below this best score
    pub alternative_threshold: f64,
    /// Runner-up must score strictly above `best - alternative_margin`
    pub alternative_margin: f64,
    pub confidence: ConfidenceTuning,
}

impl Default for RecommendationTuning {
    fn default() -> Self {
        Self {
            alternative_threshold: 80.0,
            alternative_margin: 10.0,
            confidence: ConfidenceTuning::default(),
        }
    }
}

/// Fallback sizing data used when a garment carries none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingTables {
    pub fallback_sizes: Vec<String>,
    pub standard_chart: SizeChart,
    /// Entry used for labels missing from the standard chart
    pub default_size: String,
}

impl Default for SizingTables {
    fn default() -> Self {
        Self {
            fallback_sizes: ["XS", "S", "M", "L", "XL"].iter().map(|s| s.to_string()).collect(),
            standard_chart: [
                ("XS", MeasurementSet::chest_waist_hips(85.0, 70.0, 85.0)),
                ("S", MeasurementSet::chest_waist_hips(90.0, 75.0, 90.0)),
                ("M", MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0)),
                ("L", MeasurementSet::chest_waist_hips(100.0, 85.0, 100.0)),
                ("XL", MeasurementSet::chest_waist_hips(105.0, 90.0, 105.0)),
                ("XXL", MeasurementSet::chest_waist_hips(110.0, 95.0, 110.0)),
            ]
            .into_iter()
            .collect(),
            default_size: "M".to_string(),
        }
    }
}

/// Constants for outfit evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitTuning {
    pub drape_quality: f64,
    pub movement_restriction: f64,
    pub restriction_threshold: f64,
    pub poor_fit_below: f64,
    pub marginal_fit_below: f64,
}

impl Default for OutfitTuning {
    fn default() -> Self {
        Self {
            drape_quality: 0.85,
            movement_restriction: 0.1,
            restriction_threshold: 0.3,
            poor_fit_below: 50.0,
            marginal_fit_below: 70.0,
        }
    }
}
