//! Subcommands of the `canbot` binary

pub mod policy;
pub mod train;

use std::path::Path;

use clap::ValueEnum;

use crate::{
    adapters::{JsonRepository, MsgPackRepository},
    ports::ModelRepository,
};

/// On-disk format of a saved model
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelFormat {
    Msgpack,
    Json,
}

impl ModelFormat {
    /// Pick a format from `explicit`, else from the file extension
    /// (`.json` means JSON, anything else MessagePack).
    pub fn resolve(explicit: Option<ModelFormat>, path: &Path) -> Self {
        explicit.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Msgpack,
        })
    }

    pub fn repository(self) -> Box<dyn ModelRepository> {
        match self {
            ModelFormat::Msgpack => Box::new(MsgPackRepository::new()),
            ModelFormat::Json => Box::new(JsonRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_resolution() {
        assert_eq!(
            ModelFormat::resolve(None, Path::new("robot.json")),
            ModelFormat::Json
        );
        assert_eq!(
            ModelFormat::resolve(None, Path::new("robot.msgpack")),
            ModelFormat::Msgpack
        );
        assert_eq!(
            ModelFormat::resolve(Some(ModelFormat::Msgpack), Path::new("robot.json")),
            ModelFormat::Msgpack
        );
    }
}
