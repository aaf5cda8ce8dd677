//! Application configuration.
//!
//! The configuration is loaded from a YAML file, either the one passed on
//! the command line (`-c <path>`) or the first `app-icons.yaml` found under
//! `$XDG_CONFIG_HOME/sway` or `$XDG_CONFIG_HOME/i3`.  A file ending in
//! `.json` is read as JSON instead, and `app-icons.json` is discovered when
//! no `app-icons.yaml` exists.  Every section is optional and falls back to
//! compiled-in defaults.
//!
//! # Example
//!
//! ```yaml
//! apps:
//!   chrome: [chromium-browser, google-chrome]
//!   folder-open: [nautilus, ".*krusader.*"]
//! glyphs:
//!   chrome: "\uf268"
//!   folder-open: "\uf07c"
//! format:
//!   uniq: true
//!   length: 12
//!   delimiter: "|"
//! ```
//!
//! `apps` maps an icon key to the app-name patterns that select it and
//! replaces the built-in table when present.  A file without any sections,
//! just `icon: [patterns]` pairs at the top level, is taken as the `apps`
//! table.  `glyphs` maps an icon key to the character to display and is
//! merged over the built-in glyphs.  A sibling `fa-icons.yaml` (a flat
//! `key → glyph` table, see the `parse` subcommand) is merged in before the
//! inline `glyphs`.

use crate::traits::ConfigSource;
use log::{debug, info};
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Names of the main configuration file, in order of preference.
pub const APP_ICONS_FILES: [&str; 2] = ["app-icons.yaml", "app-icons.json"];
/// Names of the optional glyph table living next to it.
pub const GLYPHS_FILES: [&str; 2] = ["fa-icons.yaml", "fa-icons.json"];
/// Directories below the config base that are searched, in order.
pub const CONFIG_SUBDIRS: [&str; 2] = ["sway", "i3"];

/// Pattern that never matches a real application; its icon key is used
/// for "unknown" placeholders.
pub const NO_MATCH: &str = "_no_match";

/// How a workspace name is assembled from its icons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Drop repeated icons, keeping the first occurrence.
    pub uniq: bool,
    /// Trim every icon to this many characters.  `0` or `-1` disables
    /// trimming.
    pub length: i32,
    /// Separator placed between icons.
    pub delimiter: String,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            uniq: true,
            length: 12,
            delimiter: "|".into(),
        }
    }
}

impl Format {
    /// Reject values the formatter cannot make sense of.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length < -1 {
            return Err(ConfigError(format!(
                "length can not be less than -1 (got {})",
                self.length
            )));
        }
        Ok(())
    }
}

/// Format settings given on the command line.  They win over the file on
/// every load, including reloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOverrides {
    pub uniq: Option<bool>,
    pub length: Option<i32>,
    pub delimiter: Option<String>,
}

impl FormatOverrides {
    pub fn apply(&self, format: &mut Format) {
        if let Some(uniq) = self.uniq {
            format.uniq = uniq;
        }
        if let Some(length) = self.length {
            format.length = length;
        }
        if let Some(delimiter) = &self.delimiter {
            format.delimiter = delimiter.clone();
        }
    }
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Yaml,
    Json,
}

impl Syntax {
    /// `.json` files are JSON; anything else is read as YAML.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Syntax::Json,
            _ => Syntax::Yaml,
        }
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Syntax::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Syntax::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Top-level configuration: icon rules plus formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Icon key → app-name patterns (literal names or regular expressions).
    pub apps: BTreeMap<String, Vec<String>>,
    /// Icon key → glyph.
    pub glyphs: BTreeMap<String, String>,
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            apps: default_apps(),
            glyphs: default_glyphs(),
            format: Format::default(),
        }
    }
}

/// On-disk shape of [`Config`]; absent sections stay `None`/empty so they
/// can be layered over the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    apps: Option<BTreeMap<String, Vec<String>>>,
    glyphs: BTreeMap<String, String>,
    format: Format,
}

/// Either accepted layout of `app-icons`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    /// `icon: [patterns]` pairs at the top level.
    Flat(BTreeMap<String, Vec<String>>),
    Sectioned(ConfigFile),
}

impl Document {
    fn into_file(self) -> ConfigFile {
        match self {
            Document::Flat(apps) if apps.is_empty() => ConfigFile::default(),
            Document::Flat(apps) => ConfigFile {
                apps: Some(apps),
                ..ConfigFile::default()
            },
            Document::Sectioned(file) => file,
        }
    }
}

impl Config {
    /// Parse a configuration document, layering it over the defaults.
    pub fn parse(text: &str, syntax: Syntax) -> Result<Self, ConfigError> {
        let file =
            parse_document(text, syntax).map_err(|e| ConfigError(format!("parse: {}", e)))?;
        Ok(Self::default().layered(file, BTreeMap::new()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, Syntax::Yaml)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::parse(json, Syntax::Json)
    }

    /// Load configuration from the file at `path`.
    ///
    /// A `fa-icons.yaml` (or `fa-icons.json`) in the same directory, if
    /// present, contributes glyphs.  The format is not validated here,
    /// since command-line overrides may still replace it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let file = parse_document(&contents, Syntax::of(path))
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;

        let extra_glyphs = match path.parent().and_then(|dir| first_file(dir, &GLYPHS_FILES)) {
            Some(p) => load_glyphs(&p)?,
            None => BTreeMap::new(),
        };

        Ok(Self::default().layered(file, extra_glyphs))
    }

    fn layered(mut self, file: ConfigFile, extra_glyphs: BTreeMap<String, String>) -> Self {
        if let Some(apps) = file.apps {
            self.apps = apps;
        }
        self.glyphs.extend(extra_glyphs);
        self.glyphs.extend(file.glyphs);
        self.format = file.format;
        self
    }
}

fn parse_document(text: &str, syntax: Syntax) -> Result<ConfigFile, String> {
    if text.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    syntax.parse::<Document>(text).map(Document::into_file)
}

/// Load a flat `key → glyph` table.
///
/// Values written as `\uXXXX` escapes without YAML quoting are decoded.
pub fn load_glyphs(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
    let glyphs: BTreeMap<String, String> = Syntax::of(path)
        .parse(&contents)
        .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
    info!("loaded {} glyph(s) from {}", glyphs.len(), path.display());
    Ok(unescape_glyphs(glyphs))
}

fn unescape_glyphs(glyphs: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let Ok(escape) = Regex::new(r"\\u([0-9a-fA-F]{4})") else {
        return glyphs;
    };
    glyphs
        .into_iter()
        .map(|(key, value)| {
            let value = escape.replace_all(&value, |caps: &Captures| {
                u32::from_str_radix(&caps[1], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            });
            (key, value.into_owned())
        })
        .collect()
}

/// Resolve the config base directory (`$XDG_CONFIG_HOME`, or
/// `$HOME/.config`).  Empty variables count as unset.
pub fn config_base_dir() -> PathBuf {
    base_dir_from(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
}

fn base_dir_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let set = |value: Option<OsString>| value.filter(|v| !v.is_empty()).map(PathBuf::from);
    set(xdg_config_home)
        .or_else(|| set(home).map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp/.config"))
}

/// The first of `names` that exists as a file in `dir`.
fn first_file(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|path| {
        let found = path.is_file();
        if !found {
            debug!("no file at {}", path.display());
        }
        found
    })
}

/// Find the configuration file below `base`, searching [`CONFIG_SUBDIRS`]
/// in order and preferring YAML within each.
pub fn discover_in(base: &Path) -> Option<PathBuf> {
    CONFIG_SUBDIRS
        .iter()
        .find_map(|dir| first_file(&base.join(dir), &APP_ICONS_FILES))
}

/// Find a glyph table below `base` the same way as [`discover_in`].
pub fn discover_glyphs_in(base: &Path) -> Option<PathBuf> {
    CONFIG_SUBDIRS
        .iter()
        .find_map(|dir| first_file(&base.join(dir), &GLYPHS_FILES))
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// The production [`ConfigSource`]: an explicit path, or discovery, with
/// command-line overrides applied on top.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: Option<PathBuf>,
    base_dir: PathBuf,
    overrides: FormatOverrides,
}

impl FileConfigSource {
    /// `path` is the `-c` argument; when `None` the file is discovered
    /// below [`config_base_dir`] on every load.
    pub fn new(path: Option<PathBuf>, overrides: FormatOverrides) -> Self {
        Self {
            path,
            base_dir: config_base_dir(),
            overrides,
        }
    }

    /// Discover below `base_dir` instead of the environment's config dir.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        let found = self.path.clone().or_else(|| discover_in(&self.base_dir));
        let mut config = match found {
            Some(path) => {
                let cfg = Config::load(&path)?;
                info!("loaded config from {}", path.display());
                cfg
            }
            None => {
                info!("no config file found, using defaults");
                let mut cfg = Config::default();
                if let Some(glyphs) = discover_glyphs_in(&self.base_dir) {
                    cfg.glyphs.extend(load_glyphs(&glyphs)?);
                }
                cfg
            }
        };
        self.overrides.apply(&mut config.format);
        config.format.validate()?;
        Ok(config)
    }
}

fn default_apps() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 12] = [
        ("firefox", &["firefox"]),
        ("chrome", &["chromium-browser", "chrome", "google-chrome"]),
        ("terminal", &["x-terminal-emulator", "xterm", "konsole", "alacritty", "foot"]),
        ("shield-alt", &["keepassxc"]),
        ("cog", &["yast2"]),
        ("envelope", &["thunderbird"]),
        ("edit", &["jetbrains-idea-ce", "code", "cursor"]),
        ("folder-open", &["nautilus", ".*krusader.*"]),
        ("music", &["clementine"]),
        ("play", &["vlc"]),
        ("comment", &["signal", "discord", "telegram"]),
        ("question", &[NO_MATCH]),
    ];
    table
        .iter()
        .map(|(key, apps)| (key.to_string(), apps.iter().map(|a| a.to_string()).collect()))
        .collect()
}

fn default_glyphs() -> BTreeMap<String, String> {
    [
        ("chrome", "\u{f268}"),
        ("cog", "\u{f013}"),
        ("comment", "\u{f075}"),
        ("edit", "\u{f044}"),
        ("envelope", "\u{f0e0}"),
        ("firefox", "\u{f269}"),
        ("folder-open", "\u{f07c}"),
        ("music", "\u{f001}"),
        ("play", "\u{f04b}"),
        ("question", "\u{f128}"),
        ("shield-alt", "\u{f3ed}"),
        ("terminal", "\u{f120}"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
