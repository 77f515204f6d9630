//! In-memory model repository for testing.
//!
//! Stores encoded snapshots in a map keyed by path, avoiding file system I/O
//! entirely.

use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use crate::{Result, error::Error, ports::ModelRepository, td::ModelSnapshot};

/// In-memory repository for testing.
///
/// Snapshots are encoded with MessagePack exactly as on disk, so encoding
/// problems still surface. All clones share the same storage.
///
/// # Examples
///
/// ```
/// use canbot::adapters::InMemoryRepository;
/// use canbot::ports::ModelRepository;
/// use canbot::td::ModelSnapshot;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// repo.save(&ModelSnapshot::default(), Path::new("robot"))?;
/// let loaded = repo.load(Path::new("robot"))?;
/// assert_eq!(loaded, ModelSnapshot::default());
/// # Ok::<(), canbot::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn clear(&self) {
        self.storage.borrow_mut().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage
            .borrow()
            .contains_key(path.to_string_lossy().as_ref())
    }
}

impl ModelRepository for InMemoryRepository {
    fn save(&self, snapshot: &ModelSnapshot, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();

        let bytes = rmp_serde::to_vec_named(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize model for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage.borrow_mut().insert(key, bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ModelSnapshot> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage.borrow();

        let bytes = storage.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load model from in-memory storage at {}", path.display()),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize model from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}
