//! Per-seed sidecar: the captured-or-not flag, cached diversity score, and
//! (optionally) the full snapshot, attached to each queue entry's metadata.
//!
//! Snapshot persistence across a restored queue entry is resolved by serializing
//! the sidecar as CBOR next to the seed file, the same format and library the
//! host uses for its own input sidecars.

use std::path::{Path, PathBuf};

use gfuzz_core::StateSnapshot;
use libafl_bolts::SerdeAny;
use serde::{Deserialize, Serialize};

/// Metadata attached to a `Testcase` recording what C7's `post-exec` observed.
#[derive(Debug, Clone, Serialize, Deserialize, SerdeAny)]
pub struct SeedSidecar {
    pub captured: bool,
    pub diversity: f64,
    pub snapshot: Option<StateSnapshot>,
}

impl SeedSidecar {
    pub fn not_captured() -> Self {
        Self {
            captured: false,
            diversity: 0.0,
            snapshot: None,
        }
    }

    pub fn captured(snapshot: StateSnapshot, diversity: f64) -> Self {
        Self {
            captured: true,
            diversity,
            snapshot: Some(snapshot),
        }
    }
}

/// Sidecar file path for a given seed file: `<seed>.gfuzz-state.cbor`.
pub fn sidecar_path(seed_path: &Path) -> PathBuf {
    let mut name = seed_path.as_os_str().to_owned();
    name.push(".gfuzz-state.cbor");
    PathBuf::from(name)
}

pub fn save(seed_path: &Path, sidecar: &SeedSidecar) -> std::io::Result<()> {
    let file = std::fs::File::create(sidecar_path(seed_path))?;
    let writer = std::io::BufWriter::new(file);
    serde_cbor::to_writer(writer, sidecar)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

pub fn load(seed_path: &Path) -> std::io::Result<Option<SeedSidecar>> {
    let path = sidecar_path(seed_path);
    if !path.exists() {
        return Ok(None);
    }
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    serde_cbor::from_reader(reader)
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let seed_path = dir.path().join("seed-0001");
        std::fs::write(&seed_path, b"input bytes").unwrap();

        let snapshot = StateSnapshot::from_raw(&[1, 2, 3]);
        let sidecar = SeedSidecar::captured(snapshot, 0.42);
        save(&seed_path, &sidecar).unwrap();

        let loaded = load(&seed_path).unwrap().expect("sidecar file present");
        assert!(loaded.captured);
        assert!((loaded.diversity - 0.42).abs() < 1e-9);
    }

    #[test]
    fn missing_sidecar_loads_as_none() {
        let dir = tempdir().unwrap();
        let seed_path = dir.path().join("seed-missing");
        assert!(load(&seed_path).unwrap().is_none());
    }
}
