use log::{info, warn};
use rand::Rng;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{PlannerError, Result};
use crate::timetable::{Timetable, TimetableEntry, TimetableRequest};

/// Where a timetable handed to the caller came from.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimetableSource {
    Stored,
    Generated,
}

/// Timetable persisted as a headed CSV file.
#[derive(Debug, Clone)]
pub struct CsvTimetableStore {
    path: PathBuf,
}

impl CsvTimetableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored timetable as-is. A missing file is `TimetableNotFound`;
    /// every other failure is `StoreReadFailure`.
    pub fn load(&self) -> Result<Timetable> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(PlannerError::TimetableNotFound(self.path.clone()));
            }
            Err(err) => return Err(self.read_failure(err.into())),
        };

        let mut rdr = csv::Reader::from_reader(file);
        let mut entries = Vec::new();
        for result in rdr.deserialize::<TimetableEntry>() {
            entries.push(result.map_err(|err| self.read_failure(err))?);
        }

        info!("Loaded {} timetable entries from {:?}", entries.len(), self.path);
        Ok(Timetable::new(entries))
    }

    pub fn save(&self, timetable: &Timetable) -> Result<()> {
        let write_failure = |source: csv::Error| PlannerError::StoreWriteFailure {
            path: self.path.clone(),
            source,
        };

        // write beside the target and rename, so readers never see half a file
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|err| write_failure(err.into()))?;
        write_entries(&mut file, timetable).map_err(write_failure)?;
        file.persist(&self.path).map_err(|err| write_failure(err.error.into()))?;

        info!("Saved {} timetable entries to {:?}", timetable.len(), self.path);
        Ok(())
    }

    fn read_failure(&self, source: csv::Error) -> PlannerError {
        PlannerError::StoreReadFailure {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_entries<W: Write>(
    writer: W,
    timetable: &Timetable,
) -> std::result::Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if timetable.is_empty() {
        // serialize() emits the header lazily, an empty table still gets one
        wtr.write_record(["Course", "Day", "Time Slot", "Subject", "Faculty", "Location"])?;
    }
    for entry in timetable {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

/// UTF-8 CSV bytes for the download button.
pub fn export_csv(timetable: &Timetable) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_entries(&mut buffer, timetable).map_err(|source| PlannerError::StoreWriteFailure {
        path: PathBuf::from("<memory>"),
        source,
    })?;
    Ok(buffer)
}

/// Outcome of [`load_or_generate`].
#[derive(Debug, Clone)]
pub struct LoadedTimetable {
    pub timetable: Timetable,
    pub source: TimetableSource,
    pub notice: Option<String>,
}

/// Returns the stored timetable, generating a fresh one only when the store
/// has none. Read failures other than not-found are returned untouched.
pub fn load_or_generate<R: Rng + ?Sized>(
    store: &CsvTimetableStore,
    request: &TimetableRequest,
    persist_generated: bool,
    rng: &mut R,
) -> Result<LoadedTimetable> {
    match store.load() {
        Ok(timetable) => Ok(LoadedTimetable {
            timetable,
            source: TimetableSource::Stored,
            notice: None,
        }),
        Err(PlannerError::TimetableNotFound(path)) => {
            info!("No timetable at {path:?}, generating a new one");
            let timetable = request.generate(rng)?;

            if persist_generated {
                if let Err(err) = store.save(&timetable) {
                    warn!("Generated timetable was not persisted: {err}");
                }
            }

            Ok(LoadedTimetable {
                timetable,
                source: TimetableSource::Generated,
                notice: Some("Timetable file not found. Generating a new timetable...".to_string()),
            })
        }
        Err(err) => Err(err),
    }
}
