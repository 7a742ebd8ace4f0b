use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Which annotations the local user has read, persisted per document so the
/// unread markers survive restarts. The annotations themselves stay with the
/// review host; this sidecar only holds ids.
pub struct ReadState {
    pub file_path: PathBuf,
    read_ids: HashSet<String>,
}

#[derive(Serialize, Deserialize, Default)]
struct ReadStateSerde {
    #[serde(default)]
    read: Vec<String>,
}

impl ReadState {
    pub fn new(document_name: &str, state_dir: Option<&Path>) -> Result<Self> {
        let document_hash = Self::compute_document_hash(document_name);
        let resolved_dir = match state_dir {
            Some(dir) => {
                if !dir.exists() {
                    fs::create_dir_all(dir)?;
                }
                dir.to_path_buf()
            }
            None => Self::get_state_dir()?,
        };
        let file_path = resolved_dir.join(format!("doc_{document_hash}.yaml"));
        Self::new_with_path(file_path)
    }

    fn new_with_path(file_path: PathBuf) -> Result<Self> {
        let read_ids = if file_path.exists() {
            let content =
                fs::read_to_string(&file_path).context("Failed to read read-state file")?;
            if content.trim().is_empty() {
                HashSet::new()
            } else {
                let parsed: ReadStateSerde =
                    serde_yaml::from_str(&content).context("Failed to parse read-state YAML")?;
                parsed.read.into_iter().collect()
            }
        } else {
            HashSet::new()
        };
        Ok(ReadState {
            file_path,
            read_ids,
        })
    }

    /// In-memory state for tests and non-persistent sessions.
    pub fn ephemeral() -> Self {
        ReadState {
            file_path: PathBuf::new(),
            read_ids: HashSet::new(),
        }
    }

    pub fn is_read(&self, annotation_id: &str) -> bool {
        self.read_ids.contains(annotation_id)
    }

    pub fn mark_read(&mut self, annotation_id: &str) -> Result<()> {
        if self.read_ids.insert(annotation_id.to_string()) {
            self.save_to_disk()?;
        }
        Ok(())
    }

    pub fn mark_all_read<'a>(&mut self, ids: impl Iterator<Item = &'a str>) -> Result<()> {
        let mut changed = false;
        for id in ids {
            changed |= self.read_ids.insert(id.to_string());
        }
        if changed {
            self.save_to_disk()?;
        }
        Ok(())
    }

    fn compute_document_hash(document_name: &str) -> String {
        let digest = md5::compute(document_name.as_bytes());
        format!("{digest:x}")
    }

    fn get_state_dir() -> Result<PathBuf> {
        let state_dir = if let Ok(custom_dir) = std::env::var("NOTOKRAT_STATE_DIR") {
            PathBuf::from(custom_dir)
        } else {
            std::env::current_dir()
                .context("Could not determine current directory")?
                .join(".notokrat_state")
        };

        if !state_dir.exists() {
            fs::create_dir_all(&state_dir).context("Failed to create read-state directory")?;
        }

        Ok(state_dir)
    }

    fn save_to_disk(&self) -> Result<()> {
        if self.file_path.as_os_str().is_empty() {
            return Ok(());
        }
        let mut read: Vec<String> = self.read_ids.iter().cloned().collect();
        read.sort();
        let yaml = serde_yaml::to_string(&ReadStateSerde { read })
            .context("Failed to serialize read state")?;
        fs::write(&self.file_path, yaml).context("Failed to write read-state file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn marks_persist_across_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = ReadState::new("spec-47.pdf", Some(temp_dir.path())).unwrap();
        assert!(!state.is_read("a1"));

        state.mark_read("a1").unwrap();
        state.mark_all_read(["r1", "r2"].into_iter()).unwrap();

        let reloaded = ReadState::new("spec-47.pdf", Some(temp_dir.path())).unwrap();
        assert!(reloaded.is_read("a1"));
        assert!(reloaded.is_read("r1"));
        assert!(reloaded.is_read("r2"));
        assert!(!reloaded.is_read("a2"));
    }

    #[test]
    fn documents_get_separate_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = ReadState::new("one.pdf", Some(temp_dir.path())).unwrap();
        first.mark_read("a1").unwrap();

        let second = ReadState::new("two.pdf", Some(temp_dir.path())).unwrap();
        assert!(!second.is_read("a1"));
        assert_ne!(first.file_path, second.file_path);
    }

    #[test]
    fn empty_file_is_tolerated() {
        let temp_dir = TempDir::new().unwrap();
        let state = ReadState::new("doc.pdf", Some(temp_dir.path())).unwrap();
        fs::write(&state.file_path, "").unwrap();
        let reloaded = ReadState::new("doc.pdf", Some(temp_dir.path())).unwrap();
        assert!(!reloaded.is_read("a1"));
    }
}
