use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlannerError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_TIME_SLOTS: [&str; 5] = [
    "9:00-10:00",
    "10:00-11:00",
    "11:15-12:15",
    "1:15-2:15",
    "2:30-3:30",
];

pub const DEFAULT_FACULTY: [&str; 5] = [
    "Dr. Smith",
    "Prof. Johnson",
    "Dr. Lee",
    "Dr. Brown",
    "Prof. Williams",
];

pub const DEFAULT_LOCATIONS: [&str; 5] = ["Room A1", "Room B2", "Room C3", "Lab D1", "Lab E2"];

/// One cell of the weekly grid. Field names double as the CSV header.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimetableEntry {
    #[serde(rename = "Course")]
    pub course: String,
    #[serde(rename = "Day")]
    pub day: Weekday,
    #[serde(rename = "Time Slot")]
    pub time_slot: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Faculty")]
    pub faculty: String,
    #[serde(rename = "Location")]
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Timetable {
    entries: Vec<TimetableEntry>,
}

impl Timetable {
    pub fn new(entries: Vec<TimetableEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimetableEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Timetable {
    type Item = &'a TimetableEntry;
    type IntoIter = std::slice::Iter<'a, TimetableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Courses and their subjects, kept in insertion order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    courses: Vec<(String, Vec<String>)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course, replacing the subjects of an existing course with the same name.
    pub fn insert(&mut self, course: impl Into<String>, subjects: Vec<String>) {
        let course = course.into();
        match self.courses.iter_mut().find(|(name, _)| *name == course) {
            Some((_, existing)) => *existing = subjects,
            None => self.courses.push((course, subjects)),
        }
    }

    pub fn with_course(mut self, course: &str, subjects: &[&str]) -> Self {
        self.insert(course, subjects.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn courses(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.courses
            .iter()
            .map(|(name, subjects)| (name.as_str(), subjects.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn standard() -> Self {
        Catalog::new()
            .with_course(
                "Computer Science",
                &["Data Structures", "Algorithms", "AI & ML", "Cybersecurity", "Operating Systems"],
            )
            .with_course(
                "Mechanical Engineering",
                &["Thermodynamics", "Fluid Mechanics", "Machine Design", "Robotics", "Manufacturing"],
            )
            .with_course(
                "Electronics",
                &[
                    "Circuit Analysis",
                    "Microcontrollers",
                    "VLSI Design",
                    "Digital Signal Processing",
                    "Embedded Systems",
                ],
            )
            .with_course(
                "AI & Data Science",
                &["Deep Learning", "NLP", "Big Data Analytics", "Cloud Computing", "Data Visualization"],
            )
    }
}

/// Inputs for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableRequest {
    pub catalog: Catalog,
    pub days: Vec<Weekday>,
    pub slots: Vec<String>,
    pub faculty: Vec<String>,
    pub locations: Vec<String>,
}

impl Default for TimetableRequest {
    fn default() -> Self {
        Self {
            catalog: Catalog::standard(),
            days: Weekday::ALL.to_vec(),
            slots: DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
            faculty: DEFAULT_FACULTY.iter().map(|s| s.to_string()).collect(),
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TimetableRequest {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Timetable> {
        generate(
            &self.catalog,
            &self.days,
            &self.slots,
            &self.faculty,
            &self.locations,
            rng,
        )
    }
}

/// Fills every (course, day, slot) cell with an independent uniform draw of
/// subject, faculty and location. Double bookings are possible.
pub fn generate<R: Rng + ?Sized>(
    catalog: &Catalog,
    days: &[Weekday],
    slots: &[String],
    faculty_pool: &[String],
    location_pool: &[String],
    rng: &mut R,
) -> Result<Timetable> {
    if faculty_pool.is_empty() {
        return Err(PlannerError::config("faculty pool is empty"));
    }
    if location_pool.is_empty() {
        return Err(PlannerError::config("location pool is empty"));
    }
    if let Some((course, _)) = catalog.courses().find(|(_, subjects)| subjects.is_empty()) {
        return Err(PlannerError::config(format!(
            "course '{course}' has no subjects"
        )));
    }

    let mut entries = Vec::with_capacity(catalog.len() * days.len() * slots.len());

    for (course, subjects) in catalog.courses() {
        for &day in days {
            for slot in slots {
                let subject = &subjects[rng.gen_range(0..subjects.len())];
                let faculty = &faculty_pool[rng.gen_range(0..faculty_pool.len())];
                let location = &location_pool[rng.gen_range(0..location_pool.len())];

                entries.push(TimetableEntry {
                    course: course.to_string(),
                    day,
                    time_slot: slot.clone(),
                    subject: subject.clone(),
                    faculty: faculty.clone(),
                    location: location.clone(),
                });
            }
        }
    }

    Ok(Timetable::new(entries))
}
