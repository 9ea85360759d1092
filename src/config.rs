use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PlannerError, Result};
use crate::resources::{DEFAULT_CLASSROOM_CAPACITY, DEFAULT_FACULTY_RATIO, DEFAULT_LAB_CAPACITY};

pub const DEFAULT_DATASET_PATH: &str = "data/updated_cleaned_admission_dataset.csv";
pub const DEFAULT_MODEL_PATH: &str = "data/best_admission_model.json";
pub const DEFAULT_TIMETABLE_PATH: &str = "data/advanced_timetable.csv";

/// Fixed ratios and unit costs behind the Resource Planning page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlanningConfig {
    pub faculty_ratio: u64,
    pub classroom_capacity: u64,
    pub lab_capacity: u64,
    /// Marketing targets this many applicants per available seat.
    pub applicant_multiplier: u64,
    pub marketing_cost_per_applicant: f64,
    pub classroom_cost: f64,
    pub lab_cost: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            faculty_ratio: DEFAULT_FACULTY_RATIO,
            classroom_capacity: DEFAULT_CLASSROOM_CAPACITY,
            lab_capacity: DEFAULT_LAB_CAPACITY,
            applicant_multiplier: 2,
            marketing_cost_per_applicant: 50.0,
            classroom_cost: 50_000.0,
            lab_cost: 100_000.0,
        }
    }
}

impl PlanningConfig {
    pub fn validate(&self) -> Result<()> {
        if self.faculty_ratio == 0 {
            return Err(PlannerError::config("faculty ratio must be positive"));
        }
        if self.classroom_capacity == 0 || self.lab_capacity == 0 {
            return Err(PlannerError::config("room capacities must be positive"));
        }
        for (name, value) in [
            ("marketing cost per applicant", self.marketing_cost_per_applicant),
            ("classroom cost", self.classroom_cost),
            ("lab cost", self.lab_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlannerError::config(format!(
                    "{name} must be a non-negative amount, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything the dashboard needs to start serving.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub timetable_path: PathBuf,
    /// Write a freshly generated timetable back to `timetable_path`.
    pub persist_generated: bool,
    pub planning: PlanningConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            timetable_path: PathBuf::from(DEFAULT_TIMETABLE_PATH),
            persist_generated: false,
            planning: PlanningConfig::default(),
        }
    }
}
