//! JSON implementation of the model repository.
//!
//! Slower and larger than MessagePack, but the saved tables can be read and
//! edited by hand.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::ModelRepository, td::ModelSnapshot};

/// Pretty-printed JSON model repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository;

impl JsonRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for JsonRepository {
    fn save(&self, snapshot: &ModelSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ModelSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {}", path.display()),
            source,
        })?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }
}
