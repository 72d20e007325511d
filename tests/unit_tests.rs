// Unit tests for sizefit

use sizefit::core::{
    diff_percent, round2, BrandChartCatalog, ChartSource, FitScoreCalculator, MeasurementResolver,
    NoBrandCharts, SizeRecommendationEngine,
};
use sizefit::models::{
    value_range, BodyProfile, BrandSizeChart, FeedbackCategory, FitPreference, Garment,
    GarmentCategory, Gender, MeasurementSet, ScoringTables, SizeChart, SizeSystem, SizingTables,
};

fn standard_profile() -> BodyProfile {
    BodyProfile::new(95.0, 80.0, 95.0)
}

#[test]
fn test_diff_percent_is_relative_to_body() {
    assert!((diff_percent(95.0, 85.0) - 10.526).abs() < 0.001);
    assert_eq!(diff_percent(100.0, 105.0), diff_percent(100.0, 95.0));
    assert_eq!(diff_percent(80.0, 80.0), 0.0);
}

#[test]
fn test_round2() {
    assert_eq!(round2(96.666_666), 96.67);
    assert_eq!(round2(42.0), 42.0);
}

#[test]
fn test_missing_body_measurement_is_skipped() {
    let calculator = FitScoreCalculator::default();
    let mut profile = standard_profile();
    profile.waist = 0.0;

    let size = MeasurementSet::chest_waist_hips(95.0, 60.0, 95.0);

    assert_eq!(calculator.base_score(&profile, &size), 100.0);
}

#[test]
fn test_custom_breakpoints_are_used() {
    let mut tables = ScoringTables::default();
    tables.floor_score = 0.0;
    let calculator = FitScoreCalculator::new(tables);

    assert_eq!(calculator.measurement_score(40.0), 0.0);
}

#[test]
fn test_resolver_priority_order() {
    let resolver = MeasurementResolver::default();
    let embedded: SizeChart = [("M", MeasurementSet::chest_waist_hips(97.0, 82.0, 97.0))]
        .into_iter()
        .collect();
    let garment = Garment::new("g", GarmentCategory::Sweater)
        .with_brand("Acme")
        .with_size_chart(embedded);

    let catalog: BrandChartCatalog = [BrandSizeChart {
        brand: "Acme".to_string(),
        garment_type: GarmentCategory::Sweater,
        gender: Gender::Unisex,
        size_system: SizeSystem::Int,
        size_data: [
            ("M", MeasurementSet::chest_waist_hips(99.0, 84.0, 99.0)),
            ("L", MeasurementSet::chest_waist_hips(104.0, 89.0, 104.0)),
        ]
        .into_iter()
        .collect(),
    }]
    .into_iter()
    .collect();

    let m = resolver.resolve(&garment, "M", &catalog).unwrap();
    assert_eq!(m.source, ChartSource::Garment);
    assert_eq!(m.measurements.chest, Some(97.0));

    let l = resolver.resolve(&garment, "L", &catalog).unwrap();
    assert_eq!(l.source, ChartSource::Brand);
    assert_eq!(l.measurements.chest, Some(104.0));

    let xl = resolver.resolve(&garment, "XL", &catalog).unwrap();
    assert_eq!(xl.source, ChartSource::Standard);
    assert_eq!(xl.measurements.chest, Some(105.0));
}

#[test]
fn test_resolver_unknown_label_uses_default_size() {
    let resolver = MeasurementResolver::default();
    let garment = Garment::new("g", GarmentCategory::Pants);

    let resolved = resolver.resolve(&garment, "34W", &NoBrandCharts).unwrap();

    assert_eq!(resolved.source, ChartSource::Standard);
    assert_eq!(resolved.measurements, MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0));
}

#[test]
fn test_resolver_empty_standard_chart_is_not_found() {
    let sizing = SizingTables {
        standard_chart: SizeChart::new(),
        ..SizingTables::default()
    };
    let resolver = MeasurementResolver::new(sizing);

    assert!(resolver
        .resolve(&Garment::new("g", GarmentCategory::Shirt), "M", &NoBrandCharts)
        .is_none());
}

#[test]
fn test_explicit_sizes_take_precedence_over_chart_labels() {
    let engine = SizeRecommendationEngine::default();
    let chart: SizeChart = [
        ("S", MeasurementSet::chest_waist_hips(90.0, 75.0, 90.0)),
        ("M", MeasurementSet::chest_waist_hips(95.0, 80.0, 95.0)),
    ]
    .into_iter()
    .collect();
    let garment = Garment::new("g", GarmentCategory::Dress)
        .with_size_chart(chart)
        .with_available_sizes(["S", "L"]);

    let result = engine
        .recommend(&standard_profile(), &garment, FitPreference::Regular, &NoBrandCharts)
        .unwrap();

    assert_eq!(result.size_scores.labels().collect::<Vec<_>>(), vec!["S", "L"]);
    // S and L both score 70; the first listed size wins the tie
    assert_eq!(result.size_scores.get("S"), Some(&70.0));
    assert_eq!(result.size_scores.get("L"), Some(&70.0));
    assert_eq!(result.recommended_size, "S");
}

#[test]
fn test_feedback_category_parsing() {
    assert_eq!("too_small".parse::<FeedbackCategory>().unwrap(), FeedbackCategory::TooSmall);
    assert_eq!("perfect".parse::<FeedbackCategory>().unwrap(), FeedbackCategory::Perfect);
    assert!("TOO_SMALL".parse::<FeedbackCategory>().is_err());
    assert!(FeedbackCategory::TooLarge.is_size_mismatch());
    assert!(!FeedbackCategory::TooShort.is_size_mismatch());
}

#[test]
fn test_value_range_buckets() {
    assert_eq!(value_range(Some(65.4), 10), "60-70");
    assert_eq!(value_range(Some(199.9), 10), "190-200");
    assert_eq!(value_range(None, 10), "Unknown");
}

#[test]
fn test_body_profile_from_store_document() {
    let profile: BodyProfile = serde_json::from_str(
        r#"{"chest": 101.5, "waist": 88, "hips": 99, "height": 181, "bodyType": "athletic"}"#,
    )
    .unwrap();

    assert_eq!(profile.chest, 101.5);
    assert_eq!(profile.height, Some(181.0));
    assert_eq!(profile.body_type.as_deref(), Some("athletic"));
    assert_eq!(profile.inseam, None);
}
