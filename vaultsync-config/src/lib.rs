//! Shared configuration loader for vaultsync.
//!
//! `defaults/vaultsync.default.toml` is embedded into every binary so that
//! the documented defaults and [`TransformOptions::default`] stay in sync.
//! Applications layer user files and key overrides on top of those defaults
//! via [`Loader`] before deserializing into [`SyncConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use vaultsync_babel::options::{CalloutIcons, CalloutType};
use vaultsync_babel::sync::{PageClient, PageSync};
use vaultsync_babel::target::Color;
use vaultsync_babel::{PropertyMapping, TransformOptions, UnresolvedLinkStyle};

const DEFAULT_TOML: &str = include_str!("../defaults/vaultsync.default.toml");

/// Top-level configuration consumed by vaultsync applications.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub transform: TransformConfig,
    pub callouts: CalloutConfig,
    pub properties: PropertiesConfig,
    pub client: ClientConfig,
}

impl SyncConfig {
    /// Blocks per create or append request, never below one.
    pub fn batch_size(&self) -> usize {
        self.client.batch_size.max(1)
    }

    /// Page sequencer over `client` with the configured batch size and
    /// nesting limit.
    pub fn page_sync<C: PageClient>(&self, client: C) -> PageSync<C> {
        PageSync::new(client)
            .with_batch_size(self.batch_size())
            .with_max_depth(self.transform.max_depth)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    pub unresolved_links: UnresolvedLinkStyle,
    pub max_depth: usize,
    pub highlight_color: Color,
}

/// Callout type → icon groups, in lookup order.
#[derive(Debug, Clone, Deserialize)]
pub struct CalloutConfig {
    pub fallback_icon: String,
    pub dataview_icon: String,
    pub types: Vec<CalloutTypeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalloutTypeConfig {
    pub names: Vec<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesConfig {
    pub title_property: String,
    pub tags_property: String,
    #[serde(default)]
    pub mappings: Vec<PropertyMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub batch_size: usize,
}

impl From<SyncConfig> for TransformOptions {
    fn from(config: SyncConfig) -> Self {
        let callouts = CalloutIcons {
            fallback_icon: config.callouts.fallback_icon,
            dataview_icon: config.callouts.dataview_icon,
            types: config
                .callouts
                .types
                .into_iter()
                .map(|group| CalloutType {
                    names: group.names,
                    icon: group.icon,
                })
                .collect(),
        };

        TransformOptions {
            unresolved_links: config.transform.unresolved_links,
            max_depth: config.transform.max_depth,
            highlight_color: config.transform.highlight_color,
            callouts,
            title_property: config.properties.title_property,
            tags_property: config.properties.tags_property,
            mappings: config.properties.mappings,
        }
    }
}

impl From<&SyncConfig> for TransformOptions {
    fn from(config: &SyncConfig) -> Self {
        config.clone().into()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file, ignored when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `transform.max_depth`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SyncConfig, ConfigError> {
    Loader::new().build()
}
