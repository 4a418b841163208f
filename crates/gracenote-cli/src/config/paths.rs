//! Config file location.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, bail};

/// Directory name under the user config root.
const APP_DIR: &str = "gracenote-xmltv";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// Precedence: `{dir}/config.toml`, then
/// `$XDG_CONFIG_HOME/gracenote-xmltv/config.toml`, then
/// `~/.config/gracenote-xmltv/config.toml`.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and neither `XDG_CONFIG_HOME` nor
/// `HOME` is set.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_from(
        dir,
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Resolves the config path from explicit environment values.
///
/// Empty or relative `XDG_CONFIG_HOME` values are ignored, as the XDG base
/// directory rules require.
fn config_path_from(
    dir: Option<&PathBuf>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    let config_root = xdg_config_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| {
            home.filter(|h| !h.is_empty())
                .map(|h| PathBuf::from(h).join(".config"))
        });

    let Some(root) = config_root else {
        bail!("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set");
    };
    tracing::debug!(root = %root.display(), "Config root resolved");

    Ok(root.join(APP_DIR).join(CONFIG_FILE))
}
