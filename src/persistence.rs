//! Snapshot persistence: `.save`/`.load` write and read JSON files under the
//! configured snapshot directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ToolError;
use crate::snapshot::Snapshot;

fn snapshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Serializes a snapshot to `<dir>/<name>.json`, creating `dir` if needed.
pub fn save(dir: &Path, name: &str, snapshot: &Snapshot) -> Result<(), ToolError> {
    fs::create_dir_all(dir)?;
    let path = snapshot_path(dir, name);
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Loads a previously saved snapshot.
pub fn load(dir: &Path, name: &str) -> Result<Snapshot, ToolError> {
    let path = snapshot_path(dir, name);
    let json = fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&json)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;
    use crate::vm::Vm;

    #[test]
    fn round_trips_a_snapshot_through_a_temp_directory() {
        let dir = std::env::temp_dir().join(format!(
            "vm16-persistence-test-{:?}",
            std::thread::current().id()
        ));
        let vm = Vm::new(MemoryImage::from_words(vec![1, 2, 3]));
        let snapshot = vm.snapshot();

        save(&dir, "last", &snapshot).unwrap();
        let loaded = load(&dir, "last").unwrap();
        assert_eq!(loaded, snapshot);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loading_a_missing_snapshot_is_an_error() {
        let dir = std::env::temp_dir().join("vm16-persistence-test-missing");
        assert!(load(&dir, "nonexistent").is_err());
    }
}
