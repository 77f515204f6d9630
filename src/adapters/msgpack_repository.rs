//! MessagePack implementation of the model repository.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::ModelRepository, td::ModelSnapshot};

/// MessagePack-based model repository.
///
/// Compact binary storage via rmp_serde.
///
/// # Examples
///
/// ```no_run
/// use canbot::adapters::MsgPackRepository;
/// use canbot::ports::ModelRepository;
/// use canbot::td::ModelSnapshot;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// repo.save(&ModelSnapshot::default(), Path::new("robot.msgpack"))?;
/// let loaded = repo.load(Path::new("robot.msgpack"))?;
/// # Ok::<(), canbot::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for MsgPackRepository {
    fn save(&self, snapshot: &ModelSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write_named(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize model to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {}", path.display()),
            source,
        })
    }

    fn load(&self, path: &Path) -> Result<ModelSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {}", path.display()),
            source,
        })?;

        rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| {
            Error::SerializationContext {
                operation: "deserialize model from MessagePack".to_string(),
                message: e.to_string(),
            }
        })
    }
}
