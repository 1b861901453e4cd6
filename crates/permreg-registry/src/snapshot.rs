//! # Registry Snapshots
//!
//! Persistence for a registry as one JSON document:
//!
//! ```json
//! {
//!   "format": 1,
//!   "initializer": "0x…",
//!   "initialized_at": "2026-01-15T12:00:00Z",
//!   "state": { … },
//!   "log": [ … ],
//!   "seal": { "algorithm": "sha256", "bytes": "…" }
//! }
//! ```
//!
//! ## Security Invariant
//!
//! The seal is the SHA-256 digest of the canonical (JCS) bytes of every
//! other field. Loading a snapshot verifies the seal, then replays the log
//! from the initializer and requires the replayed state to equal the stored
//! state. A document edited by hand fails one of the two checks even if
//! the editor recomputed the seal.
//!
//! Replay trusts each record's `caller`: the seal proves the document is
//! self-consistent, not who wrote it. A writer able to rebuild the whole
//! log can forge any history, so snapshot files rely on file-system access
//! control.

use std::io::Write;
use std::path::Path;

use permreg_core::{
    sha256_digest, AccountId, CanonicalBytes, CanonicalizationError, Caller, ContentDigest,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::authority::AuthorityRegistry;
use crate::error::RegistryError;
use crate::mutation::MutationRecord;
use crate::registry::{Ledger, Registry};

/// Snapshot document version written by this crate.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Errors loading or saving a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid snapshot JSON.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The sealed content could not be canonicalized.
    #[error("snapshot canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The document declares a format this crate does not read.
    #[error("unsupported snapshot format {found}, expected {SNAPSHOT_FORMAT}")]
    UnsupportedFormat {
        /// Declared format.
        found: u32,
    },

    /// The stored seal does not match the content.
    #[error("snapshot seal mismatch: stored {stored}, computed {computed}")]
    SealMismatch {
        /// Seal in the document.
        stored: ContentDigest,
        /// Seal of the content as loaded.
        computed: ContentDigest,
    },

    /// A log record is out of sequence.
    #[error("snapshot log out of order: expected sequence {expected}, found {found}")]
    SequenceGap {
        /// Next expected sequence.
        expected: u64,
        /// Sequence found in the record.
        found: u64,
    },

    /// A log record was rejected on replay.
    #[error("snapshot log record {sequence} does not replay: {source}")]
    Replay {
        /// Sequence of the rejected record.
        sequence: u64,
        /// Why it was rejected.
        source: RegistryError,
    },

    /// The stored state is not the state the log produces.
    #[error("snapshot state does not match its log")]
    StateMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotBody {
    format: u32,
    initializer: AccountId,
    initialized_at: Timestamp,
    state: AuthorityRegistry,
    log: Vec<MutationRecord>,
}

impl SnapshotBody {
    fn seal(&self) -> Result<ContentDigest, SnapshotError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }
}

/// A sealed, self-verifying copy of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(flatten)]
    body: SnapshotBody,
    seal: ContentDigest,
}

impl RegistrySnapshot {
    /// The seal over the snapshot content.
    pub fn seal(&self) -> &ContentDigest {
        &self.seal
    }

    /// Number of log records.
    pub fn sequence(&self) -> u64 {
        self.body.log.len() as u64
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON. The result is not yet verified; see [`Registry::restore`].
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    fn verify(self) -> Result<Ledger, SnapshotError> {
        let body = self.body;
        if body.format != SNAPSHOT_FORMAT {
            return Err(SnapshotError::UnsupportedFormat { found: body.format });
        }
        let computed = body.seal()?;
        if computed != self.seal {
            return Err(SnapshotError::SealMismatch { stored: self.seal, computed });
        }

        let mut replayed = AuthorityRegistry::new(body.initializer)
            .map_err(|source| SnapshotError::Replay { sequence: 0, source })?;
        for (expected, record) in (1u64..).zip(&body.log) {
            if record.sequence != expected {
                return Err(SnapshotError::SequenceGap { expected, found: record.sequence });
            }
            replayed
                .apply(&Caller::authenticated(record.caller), &record.mutation)
                .map_err(|source| SnapshotError::Replay { sequence: record.sequence, source })?;
        }
        if replayed != body.state {
            return Err(SnapshotError::StateMismatch);
        }

        Ok(Ledger {
            initializer: body.initializer,
            initialized_at: body.initialized_at,
            state: replayed,
            log: body.log,
        })
    }
}

impl Registry {
    /// Capture the registry as a sealed snapshot.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, SnapshotError> {
        let body = self.with_ledger(|ledger| SnapshotBody {
            format: SNAPSHOT_FORMAT,
            initializer: ledger.initializer,
            initialized_at: ledger.initialized_at,
            state: ledger.state.clone(),
            log: ledger.log.clone(),
        });
        let seal = body.seal()?;
        Ok(RegistrySnapshot { body, seal })
    }

    /// Rebuild a registry from a snapshot after verifying it.
    pub fn restore(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        let ledger = snapshot.verify()?;
        tracing::debug!(
            root = %ledger.state.root_authority(),
            sequence = ledger.log.len(),
            "registry restored"
        );
        Ok(Self::from_ledger(ledger))
    }

    /// Write a snapshot to `path`, replacing any existing file.
    ///
    /// The document is written to a uniquely named temporary file in the
    /// same directory and renamed over `path`, so readers never see a
    /// partial snapshot and concurrent writers never share a temporary.
    pub fn save(&self, path: &Path) -> Result<ContentDigest, SnapshotError> {
        let snapshot = self.snapshot()?;
        let json = snapshot.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| SnapshotError::Io(e.error))?;
        tracing::debug!(path = %path.display(), seal = %snapshot.seal, "snapshot saved");
        Ok(snapshot.seal)
    }

    /// Load and verify a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        Self::restore(RegistrySnapshot::from_json(&json)?)
    }
}
