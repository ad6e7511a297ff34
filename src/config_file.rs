//! Configuration file support
//!
//! Loads server configuration from TOML files. `ServerConfig` and its
//! nested sub-configs carry their own `Default` impls and
//! `#[serde(default)]`, so a config file only needs to specify the
//! fields it wants to override.

use std::path::Path;

use crate::config::ServerConfig;

/// Load configuration from a TOML file, falling back to `Default` for any
/// field the file omits.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: ServerConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a TOML file.
pub fn to_file<P: AsRef<Path>>(
    config: &ServerConfig,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

/// Load configuration the way `main.rs` does: defaults, overlaid by an
/// optional config file if present, overlaid by environment variables
/// (spec §6 "Configuration precedence").
pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) if p.as_ref().exists() => from_file(p)?,
        _ => ServerConfig::default(),
    };
    Ok(config.apply_env_overrides())
}

/// Write a default configuration file at the specified path, for `--init`
/// style first-run bootstrapping.
pub fn generate_default_config<P: AsRef<Path>>(
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    to_file(&ServerConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_matches_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.hls.segment_target_secs, 4);
    }

    #[test]
    fn config_file_roundtrip() {
        let config = ServerConfig::default();

        let mut temp_file = NamedTempFile::new().unwrap();
        let content = toml::to_string_pretty(&config).unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let loaded = from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.port, config.port);
        assert_eq!(loaded.hls.segment_target_secs, config.hls.segment_target_secs);
    }

    #[test]
    fn partial_file_overlays_onto_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"port = 9100\n\n[hls]\nsoftware_preset = \"fast\"\n")
            .unwrap();

        let loaded = from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.port, 9100);
        assert_eq!(loaded.hls.software_preset, "fast");
        // Untouched fields keep their defaults.
        assert_eq!(loaded.hls.segment_target_secs, 4);
        assert_eq!(loaded.host, "0.0.0.0");
    }

    #[test]
    fn generate_default_config_writes_loadable_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        generate_default_config(&path).unwrap();

        assert!(path.exists());
        let loaded = from_file(&path).unwrap();
        assert_eq!(loaded.port, 8080);
    }

    #[test]
    fn load_falls_back_to_default_when_missing() {
        let config = load(Some("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.port, 8080);
    }
}
