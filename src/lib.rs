//! Admission office planner: historical trends, admission prediction,
//! resource and budget estimates, and a generated class timetable.

pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod resources;
pub mod server;
pub mod store;
pub mod timetable;

pub use error::{PlannerError, Result};
