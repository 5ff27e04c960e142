//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// A default archiver has no file behind it and silently discards records,
/// which lets modules be used without a session (in tests for example).
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while creating or writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("Cannot write the record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// To implement this trait, the struct shall have an `Archiver` member set
/// up in the struct's `init` or `new` function. Records must be flat structs,
/// the csv writer cannot produce headers for nested sequences.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// Parent directories are created as needed and any existing file is
    /// truncated.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::CreateError)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(session_path)
            .map_err(ArchiveError::CreateError)?;

        let w = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self { writer: Some(w) })
    }

    /// Returns true if records will actually be written somewhere.
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record).map_err(ArchiveError::WriteError)?;
            w.flush().map_err(ArchiveError::FlushError)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        speed_ms: f64,
    }

    #[test]
    fn test_default_archiver_discards() -> Result<(), ArchiveError> {
        let mut arch = Archiver::default();
        assert!(!arch.is_active());

        arch.serialise(Row {
            time_s: 0.0,
            speed_ms: 1.0,
        })?;

        Ok(())
    }

    #[test]
    fn test_archiver_writes_csv() -> Result<(), Box<dyn std::error::Error>> {
        let root = std::env::temp_dir().join("flight_util_archive_test");
        let session = Session::new_in(&root, "arch_test", "sessions")?;

        let mut arch = Archiver::from_path(&session, "nested/rows.csv")?;
        assert!(arch.is_active());

        arch.serialise(Row {
            time_s: 0.1,
            speed_ms: 2.0,
        })?;
        arch.serialise(Row {
            time_s: 0.2,
            speed_ms: 3.0,
        })?;

        let contents = std::fs::read_to_string(session.arch_root.join("nested/rows.csv"))?;
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("time_s,speed_ms"));
        assert_eq!(lines.next(), Some("0.1,2.0"));
        assert_eq!(lines.next(), Some("0.2,3.0"));

        Ok(())
    }
}
