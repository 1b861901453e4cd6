//! # Snapshot File Handling
//!
//! Every command loads the registry from the snapshot file, runs against
//! the in-memory handle, and, for mutations, writes the snapshot back only
//! when the registry accepted the change.
//!
//! ## Exit codes
//!
//! - `0`: success.
//! - `1`: operational failure (I/O, bad input, corrupt snapshot).
//! - `2`: the registry rejected the operation; stderr carries its exact
//!   failure string.
//!
//! ## Writers
//!
//! A mutation holds an exclusive advisory lock on the sibling
//! `<state>.lock` file from load through save, so concurrent `permreg`
//! processes commit one at a time and each sees the previous commit.
//!
//! ## Trust
//!
//! `--caller` is taken at face value and the snapshot's recorded callers
//! are replayed as given. The CLI authenticates no one; access to the
//! snapshot file is governed by file-system permissions alone.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use permreg_core::Caller;
use permreg_registry::{MutationRecord, Registry, RegistryError};

/// Exit code for a registry rejection.
pub const EXIT_REJECTED: u8 = 2;

/// The registry snapshot file a command operates on.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file guarding writers.
    pub fn lock_path(&self) -> PathBuf {
        let mut lock = self.path.as_os_str().to_owned();
        lock.push(".lock");
        PathBuf::from(lock)
    }

    fn writer_lock(&self) -> Result<fd_lock::RwLock<File>> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file: {}", lock_path.display()))?;
        Ok(fd_lock::RwLock::new(file))
    }

    /// Create a fresh registry rooted at `caller`. Refuses to overwrite.
    pub fn create(&self, caller: &Caller) -> Result<Registry> {
        let mut lock = self.writer_lock()?;
        let _guard = lock.write().context("failed to lock registry")?;
        if self.path.exists() {
            bail!("registry already exists: {}", self.path.display());
        }
        let registry =
            Registry::initialize(caller).context("failed to initialize registry")?;
        self.save(&registry)?;
        Ok(registry)
    }

    /// Load and verify the registry.
    pub fn open(&self) -> Result<Registry> {
        if !self.path.exists() {
            bail!(
                "registry not found: {} (run `permreg init` first)",
                self.path.display()
            );
        }
        Registry::load(&self.path)
            .with_context(|| format!("failed to load registry: {}", self.path.display()))
    }

    pub fn save(&self, registry: &Registry) -> Result<()> {
        let seal = registry
            .save(&self.path)
            .with_context(|| format!("failed to write registry: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), %seal, "registry saved");
        Ok(())
    }

    /// Run a mutation, persisting the registry if it commits.
    ///
    /// The writer lock is held across load, mutation and save.
    pub fn mutate(
        &self,
        f: impl FnOnce(&Registry) -> Result<MutationRecord, RegistryError>,
    ) -> Result<u8> {
        let mut lock = self.writer_lock()?;
        let _guard = lock.write().context("failed to lock registry")?;
        let registry = self.open()?;
        match f(&registry) {
            Ok(record) => {
                self.save(&registry)?;
                println!(
                    "OK: #{} {} by {}",
                    record.sequence,
                    record.mutation.name(),
                    record.caller
                );
                Ok(0)
            }
            Err(err) => Ok(rejected(&err)),
        }
    }
}

/// Report a registry rejection and return its exit code.
pub fn rejected(err: &RegistryError) -> u8 {
    tracing::warn!(kind = %err.kind(), "registry rejected the operation");
    eprintln!("{err}");
    EXIT_REJECTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use permreg_core::AccountId;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn id(byte: u8) -> AccountId {
        AccountId::from_bytes([byte; 20])
    }

    fn caller(byte: u8) -> Caller {
        Caller::authenticated(id(byte))
    }

    #[test]
    fn create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        file.create(&caller(1)).unwrap();
        let reg = file.open().unwrap();
        assert_eq!(reg.root_authority(), caller(1).account());
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        file.create(&caller(1)).unwrap();
        assert!(file.create(&caller(2)).is_err());
        assert_eq!(file.open().unwrap().root_authority(), caller(1).account());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = StateFile::new(dir.path().join("absent.json")).open().unwrap_err();
        assert!(err.to_string().contains("permreg init"));
    }

    #[test]
    fn rejected_mutation_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        file.create(&caller(1)).unwrap();
        let before = std::fs::read_to_string(file.path()).unwrap();

        let code = file
            .mutate(|reg| reg.rotate_vnf(&caller(9), AccountId::from_bytes([3; 20])))
            .unwrap();
        assert_eq!(code, EXIT_REJECTED);
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), before);
    }

    #[test]
    fn committed_mutation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        file.create(&caller(1)).unwrap();
        let code = file
            .mutate(|reg| reg.rotate_vnf(&caller(1), AccountId::from_bytes([3; 20])))
            .unwrap();
        assert_eq!(code, 0);
        let reg = file.open().unwrap();
        assert_eq!(reg.root_authority(), AccountId::from_bytes([3; 20]));
        assert_eq!(reg.sequence(), 1);
    }

    #[test]
    fn concurrent_rotations_through_the_file_spend_the_key_once() {
        const WRITERS: u8 = 6;

        for _ in 0..10 {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("state.json");
            let setup = StateFile::new(&path);
            setup.create(&caller(0xa0)).unwrap();
            setup
                .mutate(|reg| reg.add_primary(&caller(0xa0), id(1), id(2), id(3)))
                .unwrap();

            let barrier = Arc::new(Barrier::new(usize::from(WRITERS)));
            let handles: Vec<_> = (0..WRITERS)
                .map(|i| {
                    let barrier = Arc::clone(&barrier);
                    let file = StateFile::new(&path);
                    thread::spawn(move || {
                        barrier.wait();
                        file.mutate(|reg| {
                            reg.rotate_permissioning(&caller(3), id(1), id(0x40 + i), id(0x60 + i))
                        })
                        .unwrap()
                    })
                })
                .collect();
            let mut codes: Vec<u8> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            codes.sort_unstable();

            assert_eq!(codes[0], 0);
            assert!(codes[1..].iter().all(|&c| c == EXIT_REJECTED), "codes: {codes:?}");

            let reg = StateFile::new(&path).open().unwrap();
            assert_eq!(reg.sequence(), 2);
            let keys = reg.primary_keys(&id(1)).unwrap();
            assert_ne!(keys.rotation, id(3));
        }
    }

    #[test]
    fn lock_file_sits_next_to_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        file.create(&caller(1)).unwrap();
        assert_eq!(file.lock_path(), dir.path().join("state.json.lock"));
        assert!(file.lock_path().exists());
    }
}
