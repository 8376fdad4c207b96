use crate::error::PriceMatrixError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;

/// A unified reader over either a local file or an in-memory upload
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// In-memory buffer, e.g. an uploaded workbook that was never written to disk
    Memory(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Opens a local file for reading
    ///
    /// # Arguments
    /// * `file_name` - Path to the file
    ///
    /// # Returns
    /// * `Result<UnifiedReader, PriceMatrixError>` - Reader for the file content
    pub(crate) fn new(file_name: &str) -> Result<UnifiedReader, PriceMatrixError> {
        let file = File::open(file_name)?;
        Ok(UnifiedReader::Local(BufReader::new(file)))
    }

    /// Wraps an owned byte buffer
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> UnifiedReader {
        UnifiedReader::Memory(Cursor::new(bytes))
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Memory(reader) => reader.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_local_file() {
        // Cargo.toml exists at the crate root while tests run
        let result = UnifiedReader::new("Cargo.toml");
        assert!(result.is_ok(), "Failed to open local file: {:?}", result.err());

        let result = UnifiedReader::new("non_existent_file.xlsx");
        assert!(result.is_err(), "Should fail to open non-existent file");
    }

    #[test]
    fn test_read_memory_buffer() {
        let mut reader = UnifiedReader::from_bytes(b"PK".to_vec());
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "PK");
        reader.seek(std::io::SeekFrom::Start(1)).unwrap();
        content.clear();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "K");
    }
}
