use serde::Serialize;

use crate::data::AdmissionDataset;
use crate::error::{PlannerError, Result};

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

// Chart data structures
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Histogram {
    pub title: String,
    pub bins: Vec<HistogramBin>,
    pub total: usize,
}

pub struct TrendsAnalyzer<'a> {
    dataset: &'a AdmissionDataset,
}

impl<'a> TrendsAnalyzer<'a> {
    pub fn new(dataset: &'a AdmissionDataset) -> Self {
        TrendsAnalyzer { dataset }
    }

    /// Total applicants per year, oldest first.
    pub fn yearly_applicant_trend(&self) -> ChartData {
        let totals = self.dataset.applicants_by_year();
        ChartData {
            title: "Yearly Admission Trends".to_string(),
            labels: totals.keys().map(|year| year.to_string()).collect(),
            values: totals.values().map(|&total| total as f64).collect(),
        }
    }

    pub fn competition_ratio_histogram(&self, bins: usize) -> Result<Histogram> {
        if bins == 0 {
            return Err(PlannerError::config("histogram needs at least one bin"));
        }

        let ratios = self.dataset.competition_ratios();
        let title = "Admission Competition Ratio".to_string();
        if ratios.is_empty() {
            return Ok(Histogram { title, bins: Vec::new(), total: 0 });
        }

        let min = ratios.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = ratios.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // a single distinct value still gets a bin of width 1
        let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

        let mut counts = vec![0usize; bins];
        for ratio in &ratios {
            let index = (((ratio - min) / width) as usize).min(bins - 1);
            counts[index] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + width * i as f64,
                upper: min + width * (i + 1) as f64,
                count,
            })
            .collect();

        Ok(Histogram { title, bins, total: ratios.len() })
    }
}
