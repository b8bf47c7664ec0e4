//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// A default archiver has no file attached, serialising into it is an error.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("The archiver has not been initialised with a file")]
    NotInitialised,

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// To implement this trait, the struct shall have one `Archiver` member per
/// archived item, set up in the struct's `init` function.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root. Parent directories are created as needed.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let full_path = session.arch_root.join(path);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::CreateError)?;
        }

        let file = File::create(full_path).map_err(ArchiveError::CreateError)?;

        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        let w = WriterBuilder::new().has_headers(true).from_writer(file);

        Self { writer: Some(w) }
    }

    /// Serialise a record into the archive.
    ///
    /// The record must serialise as a flat struct (nested structs, arrays or
    /// enums with data are not supported by the CSV writer).
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        let w = match self.writer {
            Some(ref mut w) => w,
            None => return Err(ArchiveError::NotInitialised),
        };

        w.serialize(record).map_err(ArchiveError::WriteError)?;
        w.flush().map_err(ArchiveError::FlushError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        a: f64,
        b: bool,
    }

    #[test]
    fn test_uninitialised_archiver_errors() {
        let mut arch = Archiver::default();
        assert!(matches!(
            arch.serialise(Row { a: 1.0, b: true }),
            Err(ArchiveError::NotInitialised)
        ));
    }

    #[test]
    fn test_archiver_writes_header_and_rows() {
        let path =
            std::env::temp_dir().join(format!("approach_archive_test_{}.csv", std::process::id()));
        let mut arch = Archiver::from_file(File::create(&path).unwrap());

        arch.serialise(Row { a: 1.5, b: true }).unwrap();
        arch.serialise(Row { a: -2.0, b: false }).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "a,b");
        assert_eq!(lines[1], "1.5,true");
        assert_eq!(lines[2], "-2.0,false");

        std::fs::remove_file(path).ok();
    }
}
