use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PlanningConfig;
use crate::error::{PlannerError, Result};

pub const DEFAULT_FACULTY_RATIO: u64 = 20;
pub const DEFAULT_CLASSROOM_CAPACITY: u64 = 40;
pub const DEFAULT_LAB_CAPACITY: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePlan {
    pub faculty_needed: u64,
    pub classrooms_needed: u64,
    pub labs_needed: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BudgetPlan {
    pub faculty_salary_budget: f64,
    pub marketing_budget: f64,
    pub infrastructure_budget: f64,
}

impl BudgetPlan {
    pub fn total(&self) -> f64 {
        self.faculty_salary_budget + self.marketing_budget + self.infrastructure_budget
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetInput {
    pub faculty_count: u64,
    pub avg_salary: f64,
    pub total_applicants: u64,
    pub marketing_cost_per_applicant: f64,
    pub classrooms: u64,
    pub labs: u64,
    pub classroom_cost: f64,
    pub lab_cost: f64,
}

/// One faculty member per `ratio` students, rounded down.
pub fn estimate_faculty(headcount: u64, ratio: u64) -> Result<u64> {
    if ratio == 0 {
        return Err(PlannerError::config("faculty ratio must be positive"));
    }
    Ok(headcount / ratio)
}

pub fn estimate_classrooms_and_labs(
    headcount: u64,
    classroom_capacity: u64,
    lab_capacity: u64,
) -> Result<(u64, u64)> {
    if classroom_capacity == 0 {
        return Err(PlannerError::config("classroom capacity must be positive"));
    }
    if lab_capacity == 0 {
        return Err(PlannerError::config("lab capacity must be positive"));
    }
    Ok((headcount / classroom_capacity, headcount / lab_capacity))
}

pub fn estimate_budget(input: &BudgetInput) -> Result<BudgetPlan> {
    // avg_salary is a dataset figure and is taken as given
    for (name, value) in [
        ("marketing cost per applicant", input.marketing_cost_per_applicant),
        ("classroom cost", input.classroom_cost),
        ("lab cost", input.lab_cost),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(PlannerError::config(format!(
                "{name} must be a non-negative amount, got {value}"
            )));
        }
    }

    Ok(BudgetPlan {
        faculty_salary_budget: input.faculty_count as f64 * input.avg_salary,
        marketing_budget: input.total_applicants as f64 * input.marketing_cost_per_applicant,
        infrastructure_budget: input.classrooms as f64 * input.classroom_cost
            + input.labs as f64 * input.lab_cost,
    })
}

/// Resource and budget estimate for one year's headcount.
pub fn plan_for_headcount(
    headcount: u64,
    avg_salary: f64,
    config: &PlanningConfig,
) -> Result<(ResourcePlan, BudgetPlan)> {
    let faculty_needed = estimate_faculty(headcount, config.faculty_ratio)?;
    let (classrooms_needed, labs_needed) =
        estimate_classrooms_and_labs(headcount, config.classroom_capacity, config.lab_capacity)?;

    let plan = ResourcePlan {
        faculty_needed,
        classrooms_needed,
        labs_needed,
    };

    let budget = estimate_budget(&BudgetInput {
        faculty_count: faculty_needed,
        avg_salary,
        total_applicants: headcount.saturating_mul(config.applicant_multiplier),
        marketing_cost_per_applicant: config.marketing_cost_per_applicant,
        classrooms: classrooms_needed,
        labs: labs_needed,
        classroom_cost: config.classroom_cost,
        lab_cost: config.lab_cost,
    })?;

    debug!("headcount {headcount}: {plan:?}, {budget:?}");
    Ok((plan, budget))
}
