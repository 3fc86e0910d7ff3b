//! Configuration structures for the canopy tree engine.
//!
//! - [`TreeConfig`] - Node tree settings (hidden files, ignore patterns, sorting)
//! - [`NotifyConfig`] - Change notifier settings (debounce window)
//! - [`GitConfig`] - VCS status tracker and git column settings
//! - [`WatchConfig`] - Filesystem bridge settings for hosts without an editor
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a partial JSON file only overrides what it names.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::StatusCode;

/// Ordering of directory entries within one child list.
///
/// # Examples
///
/// ```
/// use canopy_core::SortConfig;
///
/// let config = SortConfig::default();
/// assert!(config.directories_first);
/// assert!(!config.case_sensitive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// List directories before files.
    pub directories_first: bool,

    /// Compare names case-sensitively.
    pub case_sensitive: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            directories_first: true,
            case_sensitive: false,
        }
    }
}

/// Configuration for the node tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Whether entries whose name starts with `.` are listed.
    pub show_hidden: bool,

    /// Gitignore-style glob patterns for entries to leave out of listings.
    pub ignore_patterns: Vec<String>,

    /// Child ordering.
    pub sort: SortConfig,
}

/// Configuration for the change notifier.
///
/// # Examples
///
/// ```
/// use canopy_core::NotifyConfig;
///
/// assert_eq!(NotifyConfig::default().debounce_ms, 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Debounce window in milliseconds.
    ///
    /// Write events arriving within this window collapse into one pass that
    /// acts on the most recent event only.
    pub debounce_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { debounce_ms: 1000 }
    }
}

/// Icons drawn by the git column, one per status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitIcons {
    /// Directory whose descendants disagree.
    pub mixed: String,
    /// Unchanged slot.
    pub unmodified: String,
    /// Modified.
    pub modified: String,
    /// Added.
    pub added: String,
    /// Deleted.
    pub deleted: String,
    /// Renamed.
    pub renamed: String,
    /// Copied.
    pub copied: String,
    /// Unmerged (conflict).
    pub unmerged: String,
    /// Untracked.
    pub untracked: String,
    /// Ignored.
    pub ignored: String,
}

impl GitIcons {
    /// Returns the icon configured for `code`.
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_core::{GitIcons, StatusCode};
    ///
    /// let icons = GitIcons::default();
    /// assert_eq!(icons.icon(StatusCode::Modified), "M");
    /// assert_eq!(icons.icon(StatusCode::Mixed), "*");
    /// ```
    #[must_use]
    pub fn icon(&self, code: StatusCode) -> &str {
        match code {
            StatusCode::Mixed => &self.mixed,
            StatusCode::Unmodified => &self.unmodified,
            StatusCode::Modified => &self.modified,
            StatusCode::Added => &self.added,
            StatusCode::Deleted => &self.deleted,
            StatusCode::Renamed => &self.renamed,
            StatusCode::Copied => &self.copied,
            StatusCode::Unmerged => &self.unmerged,
            StatusCode::Untracked => &self.untracked,
            StatusCode::Ignored => &self.ignored,
        }
    }
}

impl Default for GitIcons {
    fn default() -> Self {
        Self {
            mixed: "*".to_owned(),
            unmodified: " ".to_owned(),
            modified: "M".to_owned(),
            added: "+".to_owned(),
            deleted: "x".to_owned(),
            renamed: "R".to_owned(),
            copied: "C".to_owned(),
            unmerged: "U".to_owned(),
            untracked: "?".to_owned(),
            ignored: "!".to_owned(),
        }
    }
}

/// Configuration for the VCS status tracker and the git column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Program invoked for status queries.
    pub command: String,

    /// Whether ignored paths are reported (`git status --ignored`).
    pub show_ignored: bool,

    /// Icons drawn per status code.
    pub icons: GitIcons,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            command: "git".to_owned(),
            show_ignored: false,
            icons: GitIcons::default(),
        }
    }
}

/// Configuration for the filesystem bridge.
///
/// Used by hosts that have no editor to report buffer writes; on-disk
/// modifications are turned into write events instead.
///
/// # Examples
///
/// ```
/// use canopy_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 100);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window of the filesystem watcher in milliseconds.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            recursive: true,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use canopy_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.columns, vec!["indent", "git", "filename", "readonly"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Node tree configuration.
    pub tree: TreeConfig,

    /// Change notifier configuration.
    pub notify: NotifyConfig,

    /// Git configuration.
    pub git: GitConfig,

    /// Filesystem bridge configuration.
    pub watch: WatchConfig,

    /// Column names in draw order.
    pub columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            notify: NotifyConfig::default(),
            git: GitConfig::default(),
            watch: WatchConfig::default(),
            columns: ["indent", "git", "filename", "readonly"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl Config {
    /// Reads a JSON configuration file.
    ///
    /// Missing sections and fields take their default values. The result is
    /// validated before it is returned.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git.command.trim().is_empty() {
            return Err(ConfigError::invalid_option("git.command", "must not be empty"));
        }

        for (position, name) in self.columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid_option(
                    "columns",
                    format!("column {position} has an empty name"),
                ));
            }
            if self.columns[..position].contains(name) {
                return Err(ConfigError::invalid_option(
                    "columns",
                    format!("column '{name}' is listed twice"),
                ));
            }
        }

        Ok(())
    }
}
