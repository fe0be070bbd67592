use std::path::Path;
use std::path::PathBuf;

const CONFIG: &str = include_str!("../config.toml");

/// Create a fresh directory for one test
pub fn tmpdir(name: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join(format!("buildinator-{}-{}", name, std::process::id()));
    if path.exists() {
        std::fs::remove_dir_all(&path)?;
    }
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Write the example configuration to `path/config.toml`, with `overrides` applied to top level
/// keys
pub fn setup_cwd<P: AsRef<Path>>(path: P, overrides: &[(&str, &str)]) -> Result<(), Box<dyn std::error::Error>> {
    let mut toml: toml::Value = toml::from_str(CONFIG)?;

    for (key, value) in overrides {
        let toml_key = toml
            .get_mut(key)
            .ok_or_else(|| format!("{} missing in configuration", key))?;
        *toml_key = toml::Value::String(value.to_string());
    }

    std::fs::write(
        path.as_ref().join("config.toml"),
        toml::to_string_pretty(&toml)?,
    )?;

    Ok(())
}
