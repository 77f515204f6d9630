//! Repository port for model persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage of learned tables.

use std::{io::ErrorKind, path::Path};

use crate::{Result, error::Error, td::ModelSnapshot};

/// Port for persisting and loading learned models.
///
/// # Examples
///
/// ```no_run
/// use canbot::ports::ModelRepository;
/// use canbot::td::TdAgent;
/// use std::path::Path;
///
/// fn save_agent<R: ModelRepository>(repo: &R, agent: &TdAgent, path: &Path) -> canbot::Result<()> {
///     repo.save(&agent.snapshot(), path)
/// }
/// ```
pub trait ModelRepository {
    /// Save a model snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, snapshot: &ModelSnapshot, path: &Path) -> Result<()>;

    /// Load a model snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] with kind `NotFound` if nothing is stored at
    /// `path`, and an error if the stored data cannot be decoded.
    fn load(&self, path: &Path) -> Result<ModelSnapshot>;

    /// Load a model, falling back to a fresh one when nothing is stored at
    /// `path`.
    ///
    /// Any other failure is returned unchanged.
    fn load_or_default(&self, path: &Path, initial_value: f64) -> Result<ModelSnapshot> {
        match self.load(path) {
            Ok(snapshot) => Ok(snapshot),
            Err(Error::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "no saved model found, starting from a fresh one"
                );
                Ok(ModelSnapshot::fresh(initial_value))
            }
            Err(err) => Err(err),
        }
    }
}
