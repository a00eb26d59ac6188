use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    armatures: HashMap<String, String>,
    poses: HashMap<String, String>,
    sequences: HashMap<String, SequenceEntry>,
}

#[derive(Debug, Deserialize)]
struct SequenceEntry {
    path: String,
    /// Armature fixture the sequence's joint indices refer to.
    armature: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Joint hierarchies (`{ joint_parents, joint_names }`).
pub mod armatures {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.armatures.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.armatures, "armature", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.armatures, "armature", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.armatures, "armature", name)?;
        Ok(resolve_path(rel))
    }
}

/// Transform lists in joint order.
pub mod poses {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.poses.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.poses, "pose", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.poses, "pose", name)?;
        super::load_json(rel)
    }
}

/// Sequence descriptors, each tied to an armature fixture.
pub mod sequences {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.sequences.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        read_to_string(&entry.path)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        super::load_json(&entry.path)
    }

    /// Name of the armature fixture this sequence was authored against.
    pub fn armature(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        Ok(entry.armature.clone())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        Ok(resolve_path(&entry.path))
    }
}
