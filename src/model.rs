use log::info;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PlannerError, Result};

pub const FEATURE_NAMES: [&str; 11] = [
    "High_School_Percentage",
    "Entrance_Exam_Score",
    "CGPA_1st_Year",
    "CGPA_2nd_Year",
    "CGPA_3rd_Year",
    "CGPA_4th_Year",
    "Placement_Rate",
    "Average_Salary",
    "Economic_Condition_Index",
    "Total_Applicants",
    "Seats_Available",
];

/// Student details collected by the prediction form and the CLI.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdmissionFeatures {
    pub high_school_percentage: f64,
    pub entrance_exam_score: u32,
    pub cgpa_1st_year: f64,
    pub cgpa_2nd_year: f64,
    pub cgpa_3rd_year: f64,
    pub cgpa_4th_year: f64,
    pub placement_rate: f64,
    pub average_salary: f64,
    pub economic_condition_index: f64,
    pub total_applicants: u64,
    pub seats_available: u64,
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(PlannerError::InvalidInput(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

impl AdmissionFeatures {
    pub fn validate(&self) -> Result<()> {
        check_range("high school percentage", self.high_school_percentage, 0.0, 100.0)?;
        check_range("entrance exam score", self.entrance_exam_score as f64, 0.0, 300.0)?;
        for (year, cgpa) in [
            (1, self.cgpa_1st_year),
            (2, self.cgpa_2nd_year),
            (3, self.cgpa_3rd_year),
            (4, self.cgpa_4th_year),
        ] {
            check_range(&format!("CGPA year {year}"), cgpa, 0.0, 10.0)?;
        }
        check_range("placement rate", self.placement_rate, 0.0, 100.0)?;
        check_range("average salary", self.average_salary, 0.0, 1_000_000.0)?;
        check_range("economic condition index", self.economic_condition_index, 1.0, 10.0)?;
        if self.seats_available < 1 {
            return Err(PlannerError::InvalidInput(
                "seats available must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Values in `FEATURE_NAMES` order.
    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.high_school_percentage,
            self.entrance_exam_score as f64,
            self.cgpa_1st_year,
            self.cgpa_2nd_year,
            self.cgpa_3rd_year,
            self.cgpa_4th_year,
            self.placement_rate,
            self.average_salary,
            self.economic_condition_index,
            self.total_applicants as f64,
            self.seats_available as f64,
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ModelArtifact {
    feature_names: Vec<String>,
    intercept: f64,
    coefficients: Vec<f64>,
}

/// Linear regression exported from the training notebook.
#[derive(Debug, Clone)]
pub struct AdmissionModel {
    feature_names: Vec<String>,
    intercept: f64,
    coefficients: Array1<f64>,
}

impl AdmissionModel {
    pub fn new(feature_names: Vec<String>, intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        if feature_names.len() != coefficients.len() {
            return Err(PlannerError::InvalidConfiguration(format!(
                "{} feature names for {} coefficients",
                feature_names.len(),
                coefficients.len()
            )));
        }
        Ok(Self {
            feature_names,
            intercept,
            coefficients: Array1::from_vec(coefficients),
        })
    }

    /// Reads the JSON artifact. Any problem here is fatal at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |reason: String| PlannerError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&contents).map_err(|e| load_error(e.to_string()))?;

        let model = Self::new(artifact.feature_names, artifact.intercept, artifact.coefficients)
            .map_err(|e| load_error(e.to_string()))?;
        info!(
            "Model loaded from {:?} ({} features)",
            path,
            model.feature_count()
        );
        Ok(model)
    }

    pub fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.feature_count() {
            return Err(PlannerError::FeatureCount {
                expected: self.feature_count(),
                actual: features.len(),
            });
        }
        Ok(self.intercept + self.coefficients.dot(&ArrayView1::from(features)))
    }

    pub fn predict_admission(&self, features: &AdmissionFeatures) -> Result<f64> {
        features.validate()?;
        self.predict(&features.to_vector())
    }
}

pub fn format_probability(probability: f64) -> String {
    format!("Predicted Admission Probability: {probability:.2}%")
}
