//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ftgen/ftgen.toml`
//! 3. Explicit config: `--config <FILE>`
//! 4. Environment variables: `FTGEN_*` prefix (`FTGEN_TREE__NPRIMARY=20`)
//! 5. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::TreeParams;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Raw generation parameters for intermediate parsing.
///
/// `None` means "not specified in this layer, inherit from below".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeParams {
    pub ft_name: Option<String>,
    pub root: Option<String>,
    pub seed: Option<u64>,
    pub nprimary: Option<i64>,
    pub nchildren: Option<i64>,
    pub ratio: Option<f64>,
    pub reuse_p: Option<f64>,
    pub reuse_g: Option<f64>,
    pub maxprob: Option<f64>,
    pub minprob: Option<f64>,
    pub ptop: Option<i64>,
    pub ctop: Option<i64>,
}

impl RawTreeParams {
    /// Overlay the specified values onto `base`.
    pub fn apply_to(&self, base: &TreeParams) -> TreeParams {
        TreeParams {
            ft_name: self.ft_name.clone().unwrap_or_else(|| base.ft_name.clone()),
            root: self.root.clone().unwrap_or_else(|| base.root.clone()),
            seed: self.seed.unwrap_or(base.seed),
            nprimary: self.nprimary.unwrap_or(base.nprimary),
            nchildren: self.nchildren.unwrap_or(base.nchildren),
            ratio: self.ratio.unwrap_or(base.ratio),
            reuse_p: self.reuse_p.unwrap_or(base.reuse_p),
            reuse_g: self.reuse_g.unwrap_or(base.reuse_g),
            maxprob: self.maxprob.unwrap_or(base.maxprob),
            minprob: self.minprob.unwrap_or(base.minprob),
            ptop: self.ptop.unwrap_or(base.ptop),
            ctop: self.ctop.unwrap_or(base.ctop),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub out: Option<PathBuf>,
    #[serde(default)]
    pub tree: RawTreeParams,
}

/// Unified configuration for ftgen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Output file for the generated fault tree, `-` for stdout
    pub out: PathBuf,
    /// Generation parameters
    pub tree: TreeParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            out: PathBuf::from("fault_tree.xml"),
            tree: TreeParams::default(),
        }
    }
}

/// Get the XDG config directory for ftgen.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ftgen").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ftgen.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(fs: &dyn FileSystem, path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = fs.read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay one raw layer onto self.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            out: overlay.out.clone().unwrap_or_else(|| self.out.clone()),
            tree: overlay.tree.apply_to(&self.tree),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let fs = RealFileSystem;
        let global = global_config_path().filter(|path| fs.exists(path));
        Self::load_from(&fs, global.as_deref(), explicit)
    }

    /// Load settings from the given files instead of the XDG location.
    ///
    /// Used by `load` and by tests that must not see the user's global config.
    /// Files are read through `fs`.
    pub fn load_from(
        fs: &dyn FileSystem,
        global: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(path) = global {
            let raw = load_raw_settings(fs, path)?;
            current = current.merge_with(&raw);
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            if !fs.exists(path) {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(fs, path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Expand shell variables and tilde in the output path.
    pub fn expand_paths(&mut self) {
        self.out = expand_path(&self.out);
    }

    /// Apply FTGEN_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FTGEN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("out") {
            settings.out = PathBuf::from(val);
        }

        let tree = &mut settings.tree;
        if let Ok(val) = config.get_string("tree.ft_name") {
            tree.ft_name = val;
        }
        if let Ok(val) = config.get_string("tree.root") {
            tree.root = val;
        }
        if let Ok(val) = config.get_int("tree.seed") {
            tree.seed = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("FTGEN_TREE__SEED must not be negative: {val}"),
            })?;
        }
        if let Ok(val) = config.get_int("tree.nprimary") {
            tree.nprimary = val;
        }
        if let Ok(val) = config.get_int("tree.nchildren") {
            tree.nchildren = val;
        }
        if let Ok(val) = config.get_float("tree.ratio") {
            tree.ratio = val;
        }
        if let Ok(val) = config.get_float("tree.reuse_p") {
            tree.reuse_p = val;
        }
        if let Ok(val) = config.get_float("tree.reuse_g") {
            tree.reuse_g = val;
        }
        if let Ok(val) = config.get_float("tree.maxprob") {
            tree.maxprob = val;
        }
        if let Ok(val) = config.get_float("tree.minprob") {
            tree.minprob = val;
        }
        if let Ok(val) = config.get_int("tree.ptop") {
            tree.ptop = val;
        }
        if let Ok(val) = config.get_int("tree.ctop") {
            tree.ctop = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# ftgen configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/ftgen/ftgen.toml
#   Explicit: ftgen --config <FILE>
#   Env:      FTGEN_* environment variables (FTGEN_OUT, FTGEN_TREE__NPRIMARY, ...)
#   Flags:    command line options

# Output file, "-" for stdout
# out = "fault_tree.xml"

[tree]
# Name of the fault tree
# ft_name = "Autogenerated"

# Name of the root gate
# root = "root"

# Seed of the random number generator
# seed = 123

# Number of unique primary events
# nprimary = 10

# Average number of children per gate
# nchildren = 3

# Primary events to gates ratio per new node
# ratio = 2.0

# Probability of reusing an existing primary event (max 0.9)
# reuse_p = 0.1

# Gate reuse ratio (max 0.9, currently not used by the builder)
# reuse_g = 0.1

# Probability range of primary events
# maxprob = 0.1
# minprob = 0.001

# Minimal number of primary events under the root
# ptop = 0

# Fixed number of children of the root, 0 for random
# ctop = 0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(&RealFileSystem, None, None).expect("load defaults");
        assert_eq!(settings.out, PathBuf::from("fault_tree.xml"));
        assert_eq!(settings.tree, TreeParams::default());
    }

    #[test]
    fn given_memory_fs_when_loading_then_reads_config_through_it() {
        let fs = crate::util::testing::MemoryFileSystem::new();
        let path = Path::new("cfg/ftgen.toml");
        fs.write(path, "[tree]\nnprimary = 33\nroot = \"TOP\"\n").unwrap();

        let settings = Settings::load_from(&fs, None, Some(path)).unwrap();

        assert_eq!(settings.tree.nprimary, 33);
        assert_eq!(settings.tree.root, "TOP");
        assert!(Settings::load_from(&fs, None, Some(Path::new("absent.toml"))).is_err());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_values() {
        let base = Settings::default();
        let overlay = RawSettings {
            out: None,
            tree: RawTreeParams {
                nprimary: Some(50),
                ratio: Some(3.5),
                ..RawTreeParams::default()
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.out, base.out);
        assert_eq!(merged.tree.nprimary, 50);
        assert_eq!(merged.tree.ratio, 3.5);
        assert_eq!(merged.tree.nchildren, base.tree.nchildren);
        assert_eq!(merged.tree.root, "root");
    }

    #[test]
    fn given_tilde_in_out_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            out: PathBuf::from("~/trees/ft.xml"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let out = settings.out.to_string_lossy();
        assert!(out.starts_with(&home), "out should start with home dir: {}", out);
        assert!(!out.contains('~'));
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();

        assert!(text.contains("[tree]"));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_then_parses_as_empty_overlay() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.out.is_none());
        assert!(raw.tree.nprimary.is_none());
    }
}
