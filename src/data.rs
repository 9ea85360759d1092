use csv::Reader;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{PlannerError, Result};

/// One row of the historical admissions dataset. Other columns are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdmissionRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Total_Applicants")]
    pub total_applicants: u64,
    #[serde(rename = "Seats_Available")]
    pub seats_available: u64,
    #[serde(rename = "Average_Salary")]
    pub average_salary: f64,
    #[serde(rename = "Admission_Competition_Ratio", default)]
    pub competition_ratio: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct HeadcountSample {
    pub year: i32,
    pub seats_available: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AdmissionDataset {
    records: Vec<AdmissionRecord>,
}

impl AdmissionDataset {
    pub fn new(records: Vec<AdmissionRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rdr = Reader::from_path(path).map_err(|source| PlannerError::Dataset {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_csv(rdr, path)?;
        info!("Loaded {} admission records from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(Reader::from_reader(reader), Path::new("<reader>"))
    }

    fn from_csv<R: Read>(mut rdr: Reader<R>, path: &Path) -> Result<Self> {
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: AdmissionRecord = result.map_err(|source| PlannerError::Dataset {
                path: PathBuf::from(path),
                source,
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[AdmissionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn headcount_for_year(&self, year: i32) -> Result<HeadcountSample> {
        let mut rows = self.records.iter().filter(|r| r.year == year).peekable();
        if rows.peek().is_none() {
            return Err(PlannerError::UnknownYear(year));
        }
        Ok(HeadcountSample {
            year,
            seats_available: rows.map(|r| r.seats_available).sum(),
        })
    }

    /// Mean `Average_Salary` over the whole dataset, 0 when empty.
    pub fn average_salary(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.average_salary).sum::<f64>() / self.records.len() as f64
    }

    pub fn applicants_by_year(&self) -> BTreeMap<i32, u64> {
        let mut totals = BTreeMap::new();
        for record in &self.records {
            *totals.entry(record.year).or_insert(0) += record.total_applicants;
        }
        totals
    }

    pub fn competition_ratios(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.competition_ratio)
            .filter(|ratio| ratio.is_finite())
            .collect()
    }
}
