#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hand-authored Spellstorm content: ability and item catalogs plus the wave
//! timeline.
//!
//! The built-in content ships as TOML embedded in the binary. The same files
//! can be loaded from a directory to iterate on balance without rebuilding.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use spellstorm_core::{
    AbilityDefinition, Catalog, CatalogError, PassiveItemDefinition, WaveDefinition, WaveTimeline,
};
use thiserror::Error;

/// Built-in ability definitions.
pub const BUILTIN_ABILITIES: &str = include_str!("../data/abilities.toml");
/// Built-in passive item definitions.
pub const BUILTIN_ITEMS: &str = include_str!("../data/items.toml");
/// Built-in wave timeline.
pub const BUILTIN_WAVES: &str = include_str!("../data/waves.toml");

const ABILITIES_FILE: &str = "abilities.toml";
const ITEMS_FILE: &str = "items.toml";
const WAVES_FILE: &str = "waves.toml";

/// Failures raised while reading or validating content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A content file could not be read from disk.
    #[error("failed to read content file {path:?}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A content file is not valid TOML or does not match the schema.
    #[error("failed to parse {file}: {source}")]
    Parse {
        /// Logical name of the file that failed to parse.
        file: &'static str,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// The definitions parsed but violate a catalog invariant.
    #[error("invalid content: {0}")]
    Invalid(#[from] CatalogError),
}

#[derive(Debug, Deserialize)]
struct AbilityFile {
    #[serde(default, rename = "ability")]
    abilities: Vec<AbilityDefinition>,
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    #[serde(default, rename = "item")]
    items: Vec<PassiveItemDefinition>,
}

#[derive(Debug, Deserialize)]
struct WaveFile {
    #[serde(default, rename = "wave")]
    waves: Vec<WaveDefinition>,
}

/// Validated content required to run a session.
#[derive(Clone, Debug)]
pub struct Content {
    catalog: Arc<Catalog>,
    timeline: WaveTimeline,
}

impl Content {
    /// Parses and validates the embedded content.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_toml_strs(BUILTIN_ABILITIES, BUILTIN_ITEMS, BUILTIN_WAVES)
    }

    /// Loads `abilities.toml`, `items.toml` and `waves.toml` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
        let dir = dir.as_ref();
        let abilities = read_file(&dir.join(ABILITIES_FILE))?;
        let items = read_file(&dir.join(ITEMS_FILE))?;
        let waves = read_file(&dir.join(WAVES_FILE))?;
        Self::from_toml_strs(&abilities, &items, &waves)
    }

    /// Parses and validates content from TOML sources.
    pub fn from_toml_strs(abilities: &str, items: &str, waves: &str) -> Result<Self, ContentError> {
        let abilities: AbilityFile = toml::from_str(abilities).map_err(|source| {
            ContentError::Parse {
                file: ABILITIES_FILE,
                source,
            }
        })?;
        let items: ItemFile = toml::from_str(items).map_err(|source| ContentError::Parse {
            file: ITEMS_FILE,
            source,
        })?;
        let waves: WaveFile = toml::from_str(waves).map_err(|source| ContentError::Parse {
            file: WAVES_FILE,
            source,
        })?;

        let ability_count = abilities.abilities.len();
        let item_count = items.items.len();
        let catalog = Catalog::new(abilities.abilities, items.items)?;
        let timeline = WaveTimeline::new(waves.waves)?;

        tracing::debug!(
            abilities = ability_count,
            items = item_count,
            waves = timeline.len(),
            "content validated"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            timeline,
        })
    }

    /// Shared, validated ability and item catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Validated wave timeline.
    #[must_use]
    pub fn timeline(&self) -> &WaveTimeline {
        &self.timeline
    }
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })
}
