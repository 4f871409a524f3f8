pub mod schema;

pub use schema::{OutputConfig, ProbeConfig, SamplingConfig, SourcesConfig};

use probe_core::{ProbeError, Result};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read `path` as a [`ProbeConfig`].
///
/// An absent file is not an error: the probe runs on defaults. Any other
/// read failure is reported as an unavailable source.
pub fn load(path: impl AsRef<Path>) -> Result<ProbeConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(raw) => parse(&raw),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "No config file; running on defaults");
            Ok(ProbeConfig::default())
        }
        Err(e) => Err(ProbeError::unavailable(path, e)),
    }
}

/// Parse configuration from TOML text.
pub fn parse(raw: &str) -> Result<ProbeConfig> {
    let config: ProbeConfig =
        toml::from_str(raw).map_err(|e| ProbeError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// `sysprobe/sysprobe.toml` under the user's config directory.
pub fn default_path() -> PathBuf {
    config_home(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
        .join("sysprobe")
        .join("sysprobe.toml")
}

/// `$XDG_CONFIG_HOME`, else `$HOME/.config`, else `./.config`. Empty
/// variables count as unset.
fn config_home(xdg: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let set = |v: Option<OsString>| v.filter(|s| !s.is_empty()).map(PathBuf::from);
    set(xdg).unwrap_or_else(|| {
        set(home)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    })
}
