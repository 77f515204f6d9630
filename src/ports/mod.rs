//! Ports (trait boundaries) for external dependencies.
//!
//! These traits are owned by the learning core and implemented by adapters:
//! observers watch training, repositories store learned models.

pub mod observer;
pub mod repository;

pub use observer::Observer;
pub use repository::ModelRepository;
