//! Configuration loading and resolution.
//!
//! Supports a `ferry.toml` file, `FERRY_*` environment variables, and CLI
//! overrides with a defined priority order (CLI > env > TOML > defaults).
//! Every default matches a stock Poetry project moving to uv, so most
//! projects need no config file at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FerryError, Result};

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "ferry.toml";

/// Helper macro to apply an optional owned value directly to a target field.
macro_rules! apply_option {
    ($opt:expr => $target:expr) => {
        if let Some(v) = $opt {
            $target = v;
        }
    };
}

/// Helper macro to apply an optional owned value, wrapping it in `Some()`.
macro_rules! apply_option_some {
    ($opt:expr => $target:expr) => {
        if let Some(v) = $opt {
            $target = Some(v);
        }
    };
}

/// Helper macro to clone a borrowed optional value directly to a target field.
macro_rules! apply_option_clone {
    ($opt:expr => $target:expr) => {
        if let Some(ref v) = $opt {
            $target = v.clone();
        }
    };
}

/// Top-level configuration for ferry.
#[derive(Debug, Clone, Default)]
pub struct FerryConfig {
    /// Project location and identity.
    pub project: ProjectSettings,
    /// Files and directories the migration reads, writes, and removes.
    pub paths: PathSettings,
    /// External commands invoked at each step.
    pub tools: ToolSettings,
    /// Hook installation settings.
    pub hooks: HooksConfig,
}

/// Project location and identity.
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    /// Working directory the migration operates in. All paths are relative to it.
    pub root: PathBuf,
    /// Python module imported by the verification smoke test.
    /// Derived from the root directory name when unset.
    pub import_module: Option<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            import_module: None,
        }
    }
}

/// Filesystem contract of the migration, relative to the project root.
#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Must exist for the project to be recognised.
    pub marker: PathBuf,
    /// Active package-management configuration, overwritten by the swap.
    pub config: PathBuf,
    /// Lock file written by the old tool.
    pub old_lock: PathBuf,
    /// Backup name for the active configuration.
    pub config_backup: PathBuf,
    /// Backup name for the old lock file.
    pub old_lock_backup: PathBuf,
    /// Pre-authored configuration for the new tool.
    pub target_config: PathBuf,
    /// Lock file written by the new tool; its presence means "already migrated".
    pub new_lock: PathBuf,
    /// Virtual environment directory removed on cleanup.
    pub old_env_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            marker: PathBuf::from("pyproject.toml"),
            config: PathBuf::from("pyproject.toml"),
            old_lock: PathBuf::from("poetry.lock"),
            config_backup: PathBuf::from("pyproject.poetry.toml"),
            old_lock_backup: PathBuf::from("poetry.lock.bak"),
            target_config: PathBuf::from("pyproject.uv.toml"),
            new_lock: PathBuf::from("uv.lock"),
            old_env_dir: PathBuf::from(".venv"),
        }
    }
}

/// Shell command lines for every external collaborator.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Display name of the new tool, used in messages.
    pub new_tool: String,
    /// Display name of the old tool, used in messages.
    pub old_tool: String,
    /// Version check proving the new tool is invocable.
    pub new_tool_version: String,
    /// Version check used to detect the old tool.
    pub old_tool_version: String,
    /// Dependency install/sync command.
    pub sync: String,
    /// Hook installer command.
    pub hook_install: String,
    /// Prefix for running commands inside the new environment.
    pub run_prefix: String,
    /// Interpreter version check inside the new environment.
    pub python_version: String,
    /// Test runner version check inside the new environment.
    pub test_runner_version: String,
    /// Printed when the new tool is missing.
    pub install_hint: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            new_tool: "uv".to_string(),
            old_tool: "poetry".to_string(),
            new_tool_version: "uv --version".to_string(),
            old_tool_version: "poetry --version".to_string(),
            sync: "uv sync --dev".to_string(),
            hook_install: "uv run pre-commit install".to_string(),
            run_prefix: "uv run".to_string(),
            python_version: "uv run python --version".to_string(),
            test_runner_version: "uv run pytest --version".to_string(),
            install_hint: "curl -LsSf https://astral.sh/uv/install.sh | sh".to_string(),
        }
    }
}

/// Hook installation settings.
#[derive(Debug, Clone)]
pub struct HooksConfig {
    /// Whether to run the hook installer after syncing.
    pub enabled: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// CLI overrides that take highest priority.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub project_dir: Option<PathBuf>,
    pub import_module: Option<String>,
    pub hooks_enabled: Option<bool>,
}

// ── TOML deserialization structs ──

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    project: Option<TomlProjectSettings>,
    paths: Option<TomlPathSettings>,
    tools: Option<TomlToolSettings>,
    hooks: Option<TomlHooksConfig>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlProjectSettings {
    root: Option<String>,
    import_module: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlPathSettings {
    marker: Option<String>,
    config: Option<String>,
    old_lock: Option<String>,
    config_backup: Option<String>,
    old_lock_backup: Option<String>,
    target_config: Option<String>,
    new_lock: Option<String>,
    old_env_dir: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlToolSettings {
    new_tool: Option<String>,
    old_tool: Option<String>,
    new_tool_version: Option<String>,
    old_tool_version: Option<String>,
    sync: Option<String>,
    hook_install: Option<String>,
    run_prefix: Option<String>,
    python_version: Option<String>,
    test_runner_version: Option<String>,
    install_hint: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlHooksConfig {
    enabled: Option<bool>,
}

impl FerryConfig {
    /// Load configuration with the following priority (highest wins):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. TOML config file
    /// 4. Built-in defaults
    ///
    /// Without an explicit path, `ferry.toml` is looked up in the project
    /// directory (`--project-dir`, then `FERRY_PROJECT_DIR`, then the
    /// current directory) and silently skipped when absent.
    pub fn load(config_path: Option<&str>, overrides: &CliOverrides) -> Result<Self> {
        Self::load_with_env(config_path, overrides, |key| std::env::var(key).ok())
    }

    fn load_with_env<F>(config_path: Option<&str>, overrides: &CliOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = FerryConfig::default();

        // Layer 3: TOML config file
        let toml_path = match config_path {
            Some(p) => PathBuf::from(p),
            None => overrides
                .project_dir
                .clone()
                .or_else(|| lookup("FERRY_PROJECT_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(CONFIG_FILE_NAME),
        };
        if let Ok(content) = std::fs::read_to_string(&toml_path) {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(meta) = std::fs::metadata(&toml_path) {
                    let mode = meta.permissions().mode();
                    if mode & 0o022 != 0 {
                        log::warn!("Config file is writable by other users; path={}, mode={:o}", toml_path.display(), mode);
                    }
                }
            }
            config.apply_toml_str(&content).map_err(|e| {
                FerryError::ConfigError(format!(
                    "Failed to parse config file '{}': {}",
                    toml_path.display(),
                    e
                ))
            })?;
            log::debug!("Loaded config file; path={}", toml_path.display());
        } else if config_path.is_some() {
            return Err(FerryError::ConfigError(format!(
                "Config file '{}' not found",
                toml_path.display()
            )));
        }

        // Layer 2: Environment variables
        config.apply_env_from(lookup)?;

        // Layer 1: CLI overrides
        config.apply_cli(overrides);

        config.validate()?;

        Ok(config)
    }

    /// Resolve a configured relative path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.project.root.join(path)
    }

    /// The module imported by the verification smoke test.
    ///
    /// Falls back to the root directory name, with dashes turned into
    /// underscores the way Python packaging normalises project names.
    pub fn import_module(&self) -> Option<String> {
        if let Some(ref m) = self.project.import_module {
            return Some(m.clone());
        }
        let root = std::fs::canonicalize(&self.project.root).ok()?;
        let name = root.file_name()?.to_str()?;
        Some(name.replace('-', "_").to_lowercase())
    }

    fn apply_toml_str(&mut self, content: &str) -> std::result::Result<(), toml::de::Error> {
        let toml_config: TomlConfig = toml::from_str(content)?;
        self.apply_toml(toml_config);
        Ok(())
    }

    fn apply_toml(&mut self, toml: TomlConfig) {
        if let Some(p) = toml.project {
            apply_option!(p.root.map(PathBuf::from) => self.project.root);
            apply_option_some!(p.import_module => self.project.import_module);
        }

        if let Some(p) = toml.paths {
            apply_option!(p.marker.map(PathBuf::from) => self.paths.marker);
            apply_option!(p.config.map(PathBuf::from) => self.paths.config);
            apply_option!(p.old_lock.map(PathBuf::from) => self.paths.old_lock);
            apply_option!(p.config_backup.map(PathBuf::from) => self.paths.config_backup);
            apply_option!(p.old_lock_backup.map(PathBuf::from) => self.paths.old_lock_backup);
            apply_option!(p.target_config.map(PathBuf::from) => self.paths.target_config);
            apply_option!(p.new_lock.map(PathBuf::from) => self.paths.new_lock);
            apply_option!(p.old_env_dir.map(PathBuf::from) => self.paths.old_env_dir);
        }

        if let Some(t) = toml.tools {
            apply_option!(t.new_tool => self.tools.new_tool);
            apply_option!(t.old_tool => self.tools.old_tool);
            apply_option!(t.new_tool_version => self.tools.new_tool_version);
            apply_option!(t.old_tool_version => self.tools.old_tool_version);
            apply_option!(t.sync => self.tools.sync);
            apply_option!(t.hook_install => self.tools.hook_install);
            apply_option!(t.run_prefix => self.tools.run_prefix);
            apply_option!(t.python_version => self.tools.python_version);
            apply_option!(t.test_runner_version => self.tools.test_runner_version);
            apply_option!(t.install_hint => self.tools.install_hint);
        }

        if let Some(h) = toml.hooks {
            apply_option!(h.enabled => self.hooks.enabled);
        }
    }

    fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FERRY_PROJECT_DIR") {
            self.project.root = PathBuf::from(v);
        }
        if let Some(v) = lookup("FERRY_IMPORT_MODULE") {
            self.project.import_module = Some(v);
        }
        if let Some(v) = lookup("FERRY_HOOKS_ENABLED") {
            self.hooks.enabled = parse_bool("FERRY_HOOKS_ENABLED", &v)?;
        }
        if let Some(v) = lookup("FERRY_SYNC_COMMAND") {
            self.tools.sync = v;
        }
        if let Some(v) = lookup("FERRY_HOOK_INSTALL_COMMAND") {
            self.tools.hook_install = v;
        }
        if let Some(v) = lookup("FERRY_RUN_PREFIX") {
            self.tools.run_prefix = v;
        }
        Ok(())
    }

    fn apply_cli(&mut self, overrides: &CliOverrides) {
        apply_option_clone!(overrides.project_dir => self.project.root);
        if let Some(ref m) = overrides.import_module {
            self.project.import_module = Some(m.clone());
        }
        apply_option!(overrides.hooks_enabled => self.hooks.enabled);
    }

    fn validate(&self) -> Result<()> {
        let commands = [
            ("tools.new_tool_version", &self.tools.new_tool_version),
            ("tools.sync", &self.tools.sync),
            ("tools.python_version", &self.tools.python_version),
        ];
        for (name, value) in commands {
            if value.trim().is_empty() {
                return Err(FerryError::ConfigError(format!("{} must not be empty", name)));
            }
        }
        if self.paths.target_config == self.paths.config {
            return Err(FerryError::ConfigError(
                "paths.target_config must differ from paths.config".to_string(),
            ));
        }
        if self.paths.config_backup == self.paths.config
            || self.paths.old_lock_backup == self.paths.old_lock
        {
            return Err(FerryError::ConfigError(
                "backup paths must differ from the files they back up".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FerryError::ConfigError(format!(
            "Invalid boolean '{}' for {}",
            value, key
        ))),
    }
}
