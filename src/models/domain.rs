use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// Body and garment measurements the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Chest,
    Waist,
    Hips,
    ShoulderWidth,
    ArmLength,
    Inseam,
    Neck,
}

impl Measurement {
    pub const ALL: [Measurement; 7] = [
        Measurement::Chest,
        Measurement::Waist,
        Measurement::Hips,
        Measurement::ShoulderWidth,
        Measurement::ArmLength,
        Measurement::Inseam,
        Measurement::Neck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Measurement::Chest => "chest",
            Measurement::Waist => "waist",
            Measurement::Hips => "hips",
            Measurement::ShoulderWidth => "shoulder_width",
            Measurement::ArmLength => "arm_length",
            Measurement::Inseam => "inseam",
            Measurement::Neck => "neck",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference measurements (cm) a size is cut for
///
/// Charts may be partial, so every field is optional. Unknown measurement
/// names in stored charts are ignored on deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, alias = "hip", skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoulder_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inseam: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck: Option<f64>,
}

impl MeasurementSet {
    pub fn chest_waist_hips(chest: f64, waist: f64, hips: f64) -> Self {
        Self {
            chest: Some(chest),
            waist: Some(waist),
            hips: Some(hips),
            ..Self::default()
        }
    }

    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            Measurement::Chest => self.chest,
            Measurement::Waist => self.waist,
            Measurement::Hips => self.hips,
            Measurement::ShoulderWidth => self.shoulder_width,
            Measurement::ArmLength => self.arm_length,
            Measurement::Inseam => self.inseam,
            Measurement::Neck => self.neck,
        }
    }

    pub fn is_empty(&self) -> bool {
        Measurement::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

/// Size-label keyed map that keeps the order entries were written in
///
/// Serialized as a plain JSON object. Re-inserting a label replaces its
/// value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeMap<V> {
    entries: Vec<(String, V)>,
}

/// Size label -> reference measurements
pub type SizeChart = SizeMap<MeasurementSet>;

/// Size label -> fit score
pub type SizeScores = SizeMap<f64>;

impl<V> Default for SizeMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> SizeMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: V) -> Option<V> {
        let label = label.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((label, value));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(label, value)| (label.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for SizeMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SizeMap::new();
        for (label, value) in iter {
            map.insert(label, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for SizeMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

struct SizeMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for SizeMapVisitor<V> {
    type Value = SizeMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by size label")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = SizeMap::new();
        while let Some((label, value)) = access.next_entry::<String, V>()? {
            map.insert(label, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for SizeMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SizeMapVisitor(PhantomData))
    }
}

/// Immutable snapshot of a body profile, in centimeters and kilograms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyProfile {
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub shoulder_width: Option<f64>,
    #[serde(default)]
    pub arm_length: Option<f64>,
    #[serde(default)]
    pub inseam: Option<f64>,
    #[serde(default)]
    pub neck: Option<f64>,
    /// Only used for anonymized analytics
    #[serde(default)]
    pub body_type: Option<String>,
}

impl BodyProfile {
    pub fn new(chest: f64, waist: f64, hips: f64) -> Self {
        Self {
            chest,
            waist,
            hips,
            height: None,
            weight: None,
            shoulder_width: None,
            arm_length: None,
            inseam: None,
            neck: None,
            body_type: None,
        }
    }

    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            Measurement::Chest => Some(self.chest),
            Measurement::Waist => Some(self.waist),
            Measurement::Hips => Some(self.hips),
            Measurement::ShoulderWidth => self.shoulder_width,
            Measurement::ArmLength => self.arm_length,
            Measurement::Inseam => self.inseam,
            Measurement::Neck => self.neck,
        }
    }
}

/// How the wearer likes garments to sit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPreference {
    Slim,
    #[default]
    Regular,
    Relaxed,
}

impl FitPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitPreference::Slim => "slim",
            FitPreference::Regular => "regular",
            FitPreference::Relaxed => "relaxed",
        }
    }
}

impl FromStr for FitPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slim" => Ok(FitPreference::Slim),
            "regular" => Ok(FitPreference::Regular),
            "relaxed" => Ok(FitPreference::Relaxed),
            other => Err(format!("unknown fit preference: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentCategory {
    Shirt,
    #[serde(rename = "t-shirt")]
    TShirt,
    Pants,
    Jeans,
    Dress,
    Skirt,
    Jacket,
    Coat,
    Sweater,
    Shorts,
    Suit,
    Activewear,
    Underwear,
    Accessories,
}

impl GarmentCategory {
    pub const ALL: [GarmentCategory; 14] = [
        GarmentCategory::Shirt,
        GarmentCategory::TShirt,
        GarmentCategory::Pants,
        GarmentCategory::Jeans,
        GarmentCategory::Dress,
        GarmentCategory::Skirt,
        GarmentCategory::Jacket,
        GarmentCategory::Coat,
        GarmentCategory::Sweater,
        GarmentCategory::Shorts,
        GarmentCategory::Suit,
        GarmentCategory::Activewear,
        GarmentCategory::Underwear,
        GarmentCategory::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentCategory::Shirt => "shirt",
            GarmentCategory::TShirt => "t-shirt",
            GarmentCategory::Pants => "pants",
            GarmentCategory::Jeans => "jeans",
            GarmentCategory::Dress => "dress",
            GarmentCategory::Skirt => "skirt",
            GarmentCategory::Jacket => "jacket",
            GarmentCategory::Coat => "coat",
            GarmentCategory::Sweater => "sweater",
            GarmentCategory::Shorts => "shorts",
            GarmentCategory::Suit => "suit",
            GarmentCategory::Activewear => "activewear",
            GarmentCategory::Underwear => "underwear",
            GarmentCategory::Accessories => "accessories",
        }
    }
}

impl FromStr for GarmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GarmentCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown garment category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unisex => "unisex",
        }
    }
}

/// Regional sizing convention a brand chart is published in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeSystem {
    Us,
    Eu,
    Uk,
    Jp,
    Cn,
    #[default]
    Int,
}

impl SizeSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeSystem::Us => "US",
            SizeSystem::Eu => "EU",
            SizeSystem::Uk => "UK",
            SizeSystem::Jp => "JP",
            SizeSystem::Cn => "CN",
            SizeSystem::Int => "INT",
        }
    }
}

/// Garment as supplied by the garment store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garment {
    #[serde(rename = "garmentId", alias = "$id")]
    pub garment_id: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: GarmentCategory,
    #[serde(default)]
    pub gender: Gender,
    #[serde(rename = "sizeSystem", default)]
    pub size_system: SizeSystem,
    #[serde(rename = "sizeChart", default)]
    pub size_chart: SizeChart,
    #[serde(rename = "availableSizes", default)]
    pub available_sizes: Vec<String>,
}

impl Garment {
    pub fn new(garment_id: impl Into<String>, category: GarmentCategory) -> Self {
        Self {
            garment_id: garment_id.into(),
            brand: None,
            category,
            gender: Gender::default(),
            size_system: SizeSystem::default(),
            size_chart: SizeChart::new(),
            available_sizes: Vec::new(),
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_size_chart(mut self, chart: SizeChart) -> Self {
        self.size_chart = chart;
        self
    }

    pub fn with_available_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the garment ships its own size chart
    pub fn has_embedded_chart(&self) -> bool {
        !self.size_chart.is_empty()
    }

    /// Key for the brand chart lookup; `None` when the garment has no brand
    pub fn brand_chart_key(&self) -> Option<BrandChartKey> {
        let brand = self.brand.as_deref().map(str::trim).filter(|b| !b.is_empty())?;
        Some(BrandChartKey {
            brand: brand.to_string(),
            garment_type: self.category,
            gender: self.gender,
            size_system: self.size_system,
        })
    }
}

/// Identity of a brand size chart
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandChartKey {
    pub brand: String,
    pub garment_type: GarmentCategory,
    pub gender: Gender,
    pub size_system: SizeSystem,
}

impl fmt::Display for BrandChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.brand,
            self.garment_type.as_str(),
            self.gender.as_str(),
            self.size_system.as_str()
        )
    }
}

/// Brand size chart document from the brand chart store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSizeChart {
    pub brand: String,
    #[serde(rename = "garmentType")]
    pub garment_type: GarmentCategory,
    #[serde(default)]
    pub gender: Gender,
    #[serde(rename = "sizeSystem", default)]
    pub size_system: SizeSystem,
    #[serde(rename = "sizeData")]
    pub size_data: SizeChart,
}

impl BrandSizeChart {
    pub fn key(&self) -> BrandChartKey {
        BrandChartKey {
            brand: self.brand.clone(),
            garment_type: self.garment_type,
            gender: self.gender,
            size_system: self.size_system,
        }
    }
}

/// User-reported outcome for a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Perfect,
    TooSmall,
    TooLarge,
    TooShort,
    TooLong,
}

impl FeedbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Perfect => "perfect",
            FeedbackCategory::TooSmall => "too_small",
            FeedbackCategory::TooLarge => "too_large",
            FeedbackCategory::TooShort => "too_short",
            FeedbackCategory::TooLong => "too_long",
        }
    }

    /// Girth complaints count as a wrong-size outcome
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, FeedbackCategory::TooSmall | FeedbackCategory::TooLarge)
    }
}

impl FromStr for FeedbackCategory {
    type Err = crate::core::FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perfect" => Ok(FeedbackCategory::Perfect),
            "too_small" => Ok(FeedbackCategory::TooSmall),
            "too_large" => Ok(FeedbackCategory::TooLarge),
            "too_short" => Ok(FeedbackCategory::TooShort),
            "too_long" => Ok(FeedbackCategory::TooLong),
            other => Err(crate::core::FitError::InvalidFeedbackCategory(other.to_string())),
        }
    }
}

/// Persisted size recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRecommendation {
    pub id: Uuid,
    pub user_id: String,
    pub profile_id: String,
    pub garment_id: String,
    pub garment_brand: Option<String>,
    pub garment_category: GarmentCategory,
    pub recommended_size: String,
    pub fit_score: f64,
    pub confidence_score: f64,
    pub alternative_size: Option<String>,
    pub size_scores: SizeScores,
    pub fit_preference: FitPreference,
    pub user_selected_size: Option<String>,
    pub user_feedback: Option<FeedbackCategory>,
    pub created_at: DateTime<Utc>,
}

impl SizeRecommendation {
    /// Whether recorded feedback diverges from what was recommended
    pub fn is_return_signal(&self) -> bool {
        let other_size = self
            .user_selected_size
            .as_deref()
            .is_some_and(|selected| selected != self.recommended_size);
        let wrong_size = self.user_feedback.is_some_and(|f| f.is_size_mismatch());
        other_size || wrong_size
    }
}

/// One garment worn at a given layer in an outfit
#[derive(Debug, Clone, PartialEq)]
pub struct OutfitItem {
    pub garment: Garment,
    pub size: String,
    /// 1 = innermost
    pub layer: u32,
    pub preference: Option<FitPreference>,
}

impl OutfitItem {
    pub fn new(garment: Garment, size: impl Into<String>, layer: u32) -> Self {
        Self {
            garment,
            size: size.into(),
            layer,
            preference: None,
        }
    }
}

/// Placeholder drape signals; not a physical simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrapeEstimate {
    pub drape_quality: f64,
    pub stretch_areas: Vec<Measurement>,
    pub collision_areas: Vec<String>,
    pub movement_restriction: f64,
}

/// Per-garment fit problem, serialized as its display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitIssue {
    #[serde(rename = "poor overall fit")]
    PoorOverallFit,
    #[serde(rename = "marginal fit")]
    MarginalFit,
    #[serde(rename = "excessive stretching")]
    ExcessiveStretching,
    #[serde(rename = "clipping detected")]
    ClippingDetected,
    #[serde(rename = "may restrict movement")]
    RestrictsMovement,
}

impl fmt::Display for FitIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FitIssue::PoorOverallFit => "poor overall fit",
            FitIssue::MarginalFit => "marginal fit",
            FitIssue::ExcessiveStretching => "excessive stretching",
            FitIssue::ClippingDetected => "clipping detected",
            FitIssue::RestrictsMovement => "may restrict movement",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentFitResult {
    pub garment_id: String,
    pub layer: u32,
    pub size: String,
    pub fit_score: f64,
    pub drape: DrapeEstimate,
    pub issues: Vec<FitIssue>,
}

/// Outfit-level fit assessment, innermost layer first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitFitResult {
    pub garments: Vec<GarmentFitResult>,
    pub overall_fit_score: f64,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_chart_keeps_document_order() {
        let chart: SizeChart = serde_json::from_str(
            r#"{"S": {"chest": 90}, "M": {"chest": 95}, "L": {"chest": 100}}"#,
        )
        .unwrap();

        assert_eq!(chart.labels().collect::<Vec<_>>(), vec!["S", "M", "L"]);
        assert_eq!(chart.get("M").and_then(|m| m.chest), Some(95.0));
    }

    #[test]
    fn test_measurement_set_accepts_hip_alias_and_ignores_unknown() {
        let set: MeasurementSet =
            serde_json::from_str(r#"{"chest": 94, "hip": 98, "length": 70}"#).unwrap();

        assert_eq!(set.hips, Some(98.0));
        assert_eq!(set.waist, None);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_size_map_insert_replaces_in_place() {
        let mut scores = SizeScores::new();
        scores.insert("S", 50.0);
        scores.insert("M", 70.0);
        assert_eq!(scores.insert("S", 60.0), Some(50.0));

        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![("S", &60.0), ("M", &70.0)]);
    }

    #[test]
    fn test_garment_deserializes_appwrite_document() {
        let garment: Garment = serde_json::from_str(
            r#"{"$id": "g1", "brand": "Acme", "category": "t-shirt",
                "sizeChart": {"M": {"chest": 95}}, "availableSizes": ["M"]}"#,
        )
        .unwrap();

        assert_eq!(garment.garment_id, "g1");
        assert_eq!(garment.category, GarmentCategory::TShirt);
        assert_eq!(garment.gender, Gender::Unisex);
        assert_eq!(garment.size_system, SizeSystem::Int);
        assert!(garment.has_embedded_chart());
    }

    #[test]
    fn test_brand_chart_key_requires_brand() {
        let garment = Garment::new("g1", GarmentCategory::Jeans);
        assert!(garment.brand_chart_key().is_none());

        let key = garment.with_brand("Acme").brand_chart_key().unwrap();
        assert_eq!(key.to_string(), "Acme:jeans:unisex:INT");
    }

    #[test]
    fn test_feedback_category_parsing() {
        assert_eq!("too_small".parse::<FeedbackCategory>().unwrap(), FeedbackCategory::TooSmall);
        assert!("way_too_big".parse::<FeedbackCategory>().is_err());
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in GarmentCategory::ALL {
            assert_eq!(category.as_str().parse::<GarmentCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_fit_issue_messages() {
        assert_eq!(FitIssue::PoorOverallFit.to_string(), "poor overall fit");
        assert_eq!(FitIssue::RestrictsMovement.to_string(), "may restrict movement");
    }

    #[test]
    fn test_fit_issue_serializes_as_text() {
        let issues = vec![FitIssue::PoorOverallFit, FitIssue::RestrictsMovement];
        let json = serde_json::to_string(&issues).unwrap();
        assert_eq!(json, r#"["poor overall fit","may restrict movement"]"#);

        for issue in [
            FitIssue::PoorOverallFit,
            FitIssue::MarginalFit,
            FitIssue::ExcessiveStretching,
            FitIssue::ClippingDetected,
            FitIssue::RestrictsMovement,
        ] {
            let json = serde_json::to_value(issue).unwrap();
            assert_eq!(json, serde_json::Value::String(issue.to_string()));
        }
    }
}
