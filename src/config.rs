use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub links: LinksConfig,
    pub page: PageConfig,
    pub font: FontConfig,
    pub html: HtmlConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinksConfig {
    pub color: String,
    pub underline: bool,
    /// Open links in a new browsing context.
    pub new_tab: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            color: "#1a4f8b".to_string(),
            underline: true,
            new_tab: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    pub numbers: bool,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FontConfig {
    pub sans: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HtmlConfig {
    /// Class of the `<div>` wrapping all output. Empty means no wrapper.
    pub wrapper_class: String,
    pub classes: ClassConfig,
}

impl HtmlConfig {
    /// Bare semantic HTML: no wrapper and no classes.
    pub fn unstyled() -> Self {
        Self {
            wrapper_class: String::new(),
            classes: ClassConfig::unstyled(),
        }
    }
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            wrapper_class: "prose prose-sm dark:prose-invert max-w-none".to_string(),
            classes: ClassConfig::default(),
        }
    }
}

/// CSS classes attached to each rendered element. Empty strings omit the
/// `class` attribute.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClassConfig {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub paragraph: String,
    pub unordered_list: String,
    pub ordered_list: String,
    pub list_item: String,
    pub blockquote: String,
    pub pre: String,
    pub code_block: String,
    pub code: String,
    pub strong: String,
    pub em: String,
    pub del: String,
    pub link: String,
    pub rule: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            h1: "text-2xl font-bold mb-4 mt-6".to_string(),
            h2: "text-xl font-semibold mb-3 mt-5".to_string(),
            h3: "text-lg font-medium mb-2 mt-4".to_string(),
            paragraph: "mb-4 leading-relaxed".to_string(),
            unordered_list: "list-disc list-inside mb-4 space-y-1".to_string(),
            ordered_list: "list-decimal list-inside mb-4 space-y-1".to_string(),
            list_item: "mb-1".to_string(),
            blockquote: "border-l-4 border-primary pl-4 italic mb-4 text-muted-foreground"
                .to_string(),
            pre: "bg-muted p-4 rounded-lg overflow-x-auto mb-4".to_string(),
            code_block: "text-sm".to_string(),
            code: "bg-muted px-1 py-0.5 rounded text-sm font-mono".to_string(),
            strong: "font-semibold".to_string(),
            em: "italic".to_string(),
            del: "line-through".to_string(),
            link: "text-primary hover:underline".to_string(),
            rule: "my-6 border-border".to_string(),
        }
    }
}

impl ClassConfig {
    pub fn unstyled() -> Self {
        Self {
            h1: String::new(),
            h2: String::new(),
            h3: String::new(),
            paragraph: String::new(),
            unordered_list: String::new(),
            ordered_list: String::new(),
            list_item: String::new(),
            blockquote: String::new(),
            pre: String::new(),
            code_block: String::new(),
            code: String::new(),
            strong: String::new(),
            em: String::new(),
            del: String::new(),
            link: String::new(),
            rule: String::new(),
        }
    }

    /// Class for a heading of the given level. Levels past 3 use the `h3` class.
    pub fn heading(&self, level: u8) -> &str {
        match level {
            1 => self.h1.as_str(),
            2 => self.h2.as_str(),
            _ => self.h3.as_str(),
        }
    }
}

impl Config {
    /// The config bundled with the crate. Validated by the build script.
    pub fn compiled_default() -> Self {
        Self::from_toml_or_default(DEFAULT_CONFIG)
    }

    fn from_toml_or_default(content: &str) -> Self {
        match Self::from_toml_str(content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid bundled config, using built-in defaults: {e}");
                Self::default()
            }
        }
    }

    /// Parse config from TOML text; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config from a TOML file, or return defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::compiled_default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = Self::from_toml_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
