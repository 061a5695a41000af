use crate::core::Storage;
use crate::utils::error::{Result, UpdateError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

/// Hidden sibling of `target`, so the final rename stays on one filesystem.
fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    target.with_file_name(format!(".{name}.tmp"))
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full_path = self.resolve(path);
        match fs::read(&full_path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(UpdateError::IoError(e)),
        }
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| UpdateError::WriteError {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let temp = temp_path_for(&full_path);
        fs::write(&temp, data).map_err(|source| {
            let _ = fs::remove_file(&temp);
            UpdateError::WriteError {
                path: temp.clone(),
                source,
            }
        })?;

        fs::rename(&temp, &full_path).map_err(|source| {
            let _ = fs::remove_file(&temp);
            UpdateError::WriteError {
                path: full_path.clone(),
                source,
            }
        })?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}
