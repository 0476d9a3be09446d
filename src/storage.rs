// File: src/storage.rs
// Locked, atomic file primitives shared by the tracker store and config.
use anyhow::Result;
use fs2::FileExt;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStorage;

impl LocalStorage {
    /// Helper to get a sidecar lock file path
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Run `f` while holding an exclusive lock on the sidecar lock file.
    ///
    /// The lock serializes individual read/write critical sections between
    /// processes; it does not make a whole reconciliation run transactional
    /// (single-writer-at-a-time is an operational invariant).
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_appends_to_extension() {
        let p = LocalStorage::get_lock_path(Path::new("/tmp/tracker.json"));
        assert_eq!(p, PathBuf::from("/tmp/tracker.json.lock"));
        let p = LocalStorage::get_lock_path(Path::new("/tmp/trackerfile"));
        assert_eq!(p, PathBuf::from("/tmp/trackerfile.lock"));
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = std::env::temp_dir().join(format!("suivi_storage_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("doc.json");

        LocalStorage::atomic_write(&path, b"first").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "first");

        LocalStorage::atomic_write(&path, b"second").expect("rewrite");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second");

        // No .tmp residue after a successful rename.
        assert!(!dir.join("doc.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
