use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info};

pub const DATA_DIR_ENV: &str = "SILL_DATA";
pub const APP_DIR: &str = "sill";

#[tracing::instrument(skip(override_dir))]
pub fn resolve_data_dir(override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = if let Some(path) = override_dir {
        expand_tilde(path)
    } else if let Some(env_dir) = env_data_dir() {
        expand_tilde(&env_dir)
    } else {
        default_data_dir()?
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    } else {
        debug!(dir = %dir.display(), "using data directory");
    }

    Ok(dir)
}

fn env_data_dir() -> Option<PathBuf> {
    let raw = std::env::var(DATA_DIR_ENV).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base =
        dirs::data_dir().ok_or_else(|| anyhow!("cannot determine platform data directory"))?;
    Ok(base.join(APP_DIR))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{expand_tilde, resolve_data_dir};

    #[test]
    fn explicit_override_is_created_and_returned() {
        let temp = tempdir().expect("tempdir");
        let wanted = temp.path().join("widgets");
        assert!(!wanted.exists());

        let resolved = resolve_data_dir(Some(&wanted)).expect("resolve");
        assert_eq!(resolved, wanted);
        assert!(wanted.is_dir());
    }

    #[test]
    fn plain_paths_pass_through_tilde_expansion() {
        let path = std::path::Path::new("/var/tmp/sill");
        assert_eq!(expand_tilde(path), path);
    }

    #[test]
    fn tilde_prefix_lands_under_home() {
        if let Some(home) = dirs::home_dir() {
            let expanded = expand_tilde(std::path::Path::new("~/sill-data"));
            assert_eq!(expanded, home.join("sill-data"));
        }
    }
}
