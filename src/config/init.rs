use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::scoring::ScoringConfig;

/// Write the starter scoring config to `path` atomically.
///
/// Refuses to replace an existing file unless `force` is set. Parent
/// directories are created as needed.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
        }
    }

    let yaml = serde_saphyr::to_string(&ScoringConfig::default())
        .context("Failed to serialize default config")?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::env;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = env::temp_dir().join("cred_score_test_init");
        let path = dir.join("config.yaml");
        let _ = fs::remove_dir_all(&dir);

        write_default_config(&path, false).unwrap();
        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded, ScoringConfig::default());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let path = env::temp_dir().join("cred_score_test_init_existing.yaml");
        fs::write(&path, "keep me").unwrap();

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

        write_default_config(&path, true).unwrap();
        assert!(load_config(Some(path.clone())).is_ok());

        let _ = fs::remove_file(&path);
    }
}
