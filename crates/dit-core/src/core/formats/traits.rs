use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for parsing a file format into its value object.
///
/// This trait provides a common API for the toolkit's text formats. Each
/// implementor is the value object itself: parsing consumes a buffered reader
/// and yields the fully constructed, validated value. Formats that can also
/// be written implement [`FormatWrite`] in addition.
pub trait FormatRead: Sized {
    /// The error type for parse operations.
    type Error: Error + From<io::Error>;

    /// Reads and validates a complete document from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the document violates the format's structural
    /// contract or an I/O operation fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error>;

    /// Reads a complete document from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for serializing a value object back into its format.
///
/// Writers reproduce the canonical textual structure of the format so that a
/// written document re-parses into an equal value. Read-only formats (GRO,
/// PDB) do not implement this trait.
pub trait FormatWrite {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes the canonical textual representation to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O operation fails.
    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes the canonical textual representation to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }
}
