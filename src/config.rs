//! Configuration loading from Lua scripts.
//!
//! Loads `init.lua` from an explicit path, or from the project root (found
//! by walking up from the executable). The script sees a `config` table
//! pre-filled with defaults and may overwrite any field.

use mlua::{Lua, Result as LuaResult};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory dialogs open in
    pub working_directory: Option<PathBuf>,
    /// Socket the host listens on and the shell connects to
    pub socket_path: Option<PathBuf>,
    /// Where the shell keeps its open panes between runs
    pub session_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_directory: std::env::current_dir().ok(),
            socket_path: None,
            session_path: None,
        }
    }
}

impl Config {
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }
}

/// Find the project root by walking up from the executable location.
/// Looks for `Cargo.toml` or `init.lua` as markers.
fn find_project_root() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let mut current = exe_path.parent()?;

    for _ in 0..10 {
        if current.join("Cargo.toml").exists() || current.join("init.lua").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }

    None
}

/// Load configuration from `path`, or from `init.lua` in the project root.
/// Returns default config if no config file exists or on any error.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let Some(project_root) = find_project_root() else {
                log::debug!("Could not find project root, using default config");
                return Config::default();
            };
            project_root.join("init.lua")
        }
    };

    if !config_path.exists() {
        log::debug!("No config found at {}, using default config", config_path.display());
        return Config::default();
    }

    match load_config_from_file(&config_path) {
        Ok(config) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Err(e) => {
            log::error!("Failed to load config from {}: {}", config_path.display(), e);
            Config::default()
        }
    }
}

/// Load configuration from a specific Lua file.
fn load_config_from_file(path: &Path) -> LuaResult<Config> {
    let script = std::fs::read_to_string(path)
        .map_err(|e| mlua::Error::runtime(format!("Failed to read config file: {}", e)))?;
    load_config_from_str(&script)
}

fn load_config_from_str(script: &str) -> LuaResult<Config> {
    let lua = Lua::new();
    let defaults = Config::default();

    let config_table = lua.create_table()?;
    if let Some(dir) = &defaults.working_directory {
        config_table.set("working_directory", dir.to_string_lossy().into_owned())?;
    }
    lua.globals().set("config", config_table)?;

    lua.load(script).exec()?;

    let config_table: mlua::Table = lua.globals().get("config")?;
    let path_field = |key: &str| -> LuaResult<Option<PathBuf>> {
        let value: Option<String> = config_table.get(key)?;
        Ok(value.filter(|v| !v.is_empty()).map(PathBuf::from))
    };

    Ok(Config {
        working_directory: path_field("working_directory")?,
        socket_path: path_field("socket_path")?,
        session_path: path_field("session_path")?,
    })
}
