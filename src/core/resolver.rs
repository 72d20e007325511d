use std::collections::HashMap;

use crate::models::{BrandChartKey, BrandSizeChart, Garment, MeasurementSet, SizeChart, SizingTables};

/// Lookup of brand size charts by (brand, garment type, gender, size system)
pub trait BrandChartSource {
    fn brand_chart(&self, key: &BrandChartKey) -> Option<&SizeChart>;
}

/// In-memory set of brand charts, usually prefetched for one request
#[derive(Debug, Clone, Default)]
pub struct BrandChartCatalog {
    charts: HashMap<BrandChartKey, SizeChart>,
}

impl BrandChartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chart: BrandSizeChart) {
        self.charts.insert(chart.key(), chart.size_data);
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl FromIterator<BrandSizeChart> for BrandChartCatalog {
    fn from_iter<I: IntoIterator<Item = BrandSizeChart>>(iter: I) -> Self {
        let mut catalog = BrandChartCatalog::new();
        for chart in iter {
            catalog.insert(chart);
        }
        catalog
    }
}

impl BrandChartSource for BrandChartCatalog {
    fn brand_chart(&self, key: &BrandChartKey) -> Option<&SizeChart> {
        self.charts.get(key)
    }
}

/// Source with no brand charts at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrandCharts;

impl BrandChartSource for NoBrandCharts {
    fn brand_chart(&self, _key: &BrandChartKey) -> Option<&SizeChart> {
        None
    }
}

/// Where a resolved measurement set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSource {
    Garment,
    Brand,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMeasurements {
    pub measurements: MeasurementSet,
    pub source: ChartSource,
}

/// Finds the reference measurements a size is cut for
///
/// Sources are tried in order: the garment's own chart, the brand chart,
/// then the standard chart. The first source that has the size wins and
/// sources are never merged. Labels unknown to the standard chart fall back
/// to its default entry so scoring keeps working on odd labels.
#[derive(Debug, Clone, Default)]
pub struct MeasurementResolver {
    sizing: SizingTables,
}

impl MeasurementResolver {
    pub fn new(sizing: SizingTables) -> Self {
        Self { sizing }
    }

    pub fn sizing(&self) -> &SizingTables {
        &self.sizing
    }

    /// Returns `None` only when no source, including the standard chart,
    /// can supply an entry
    pub fn resolve(
        &self,
        garment: &Garment,
        size: &str,
        brand_charts: &dyn BrandChartSource,
    ) -> Option<ResolvedMeasurements> {
        if let Some(measurements) = garment.size_chart.get(size) {
            return Some(ResolvedMeasurements {
                measurements: *measurements,
                source: ChartSource::Garment,
            });
        }

        let brand_entry = garment
            .brand_chart_key()
            .and_then(|key| brand_charts.brand_chart(&key))
            .and_then(|chart| chart.get(size));
        if let Some(measurements) = brand_entry {
            return Some(ResolvedMeasurements {
                measurements: *measurements,
                source: ChartSource::Brand,
            });
        }

        let standard = &self.sizing.standard_chart;
        standard
            .get(size)
            .or_else(|| standard.get(&self.sizing.default_size))
            .map(|measurements| ResolvedMeasurements {
                measurements: *measurements,
                source: ChartSource::Standard,
            })
    }
}
