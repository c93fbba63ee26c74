//! Config file location.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Directory under the user config root that holds moviefind files.
const APP_DIR: &str = "moviefind";

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// `--dir` wins. Otherwise the file lives in `$XDG_CONFIG_HOME/moviefind`,
/// falling back to `$HOME/.config/moviefind`.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and neither variable yields a usable
/// directory.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    let base = match dir {
        Some(d) => d.clone(),
        None => user_config_dir(
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
        )?,
    };
    Ok(base.join(CONFIG_FILE))
}

/// Picks the per-user moviefind directory from the environment values.
///
/// Relative or empty `XDG_CONFIG_HOME` values are ignored.
fn user_config_dir(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(xdg) = xdg_config_home.map(PathBuf::from)
        && xdg.is_absolute()
    {
        return Ok(xdg.join(APP_DIR));
    }
    match home.filter(|h| !h.is_empty()) {
        Some(home) => Ok(Path::new(&home).join(".config").join(APP_DIR)),
        None => bail!("cannot locate config directory: set HOME or XDG_CONFIG_HOME, or pass --dir"),
    }
}
