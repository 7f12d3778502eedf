// Rarity snapshot persistence: gzip-compressed JSON, one directory per collection
use anyhow::{anyhow, bail, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use rarityx_core::{total_entropy, Distributions, SnapshotSink};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SNAPSHOT_EXTENSION: &str = "snapshot";

/// How many snapshots to keep per collection after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// One snapshot per collection; each write replaces the previous one
    #[default]
    LatestOnly,
    /// Keep the newest `n` snapshots (at least one)
    KeepLast(usize),
    /// Never prune
    KeepAll,
}

impl RetentionPolicy {
    fn keep(&self) -> Option<usize> {
        match self {
            RetentionPolicy::LatestOnly => Some(1),
            RetentionPolicy::KeepLast(n) => Some((*n).max(1)),
            RetentionPolicy::KeepAll => None,
        }
    }
}

/// Snapshot description for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDescription {
    pub name: String,
    pub creation_time: Option<String>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// A persisted rarity table for one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaritySnapshot {
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub item_count: usize,
    pub total_entropy: f64,
    pub distributions: Distributions,
}

pub struct SnapshotStore {
    snapshot_dir: PathBuf,
    retention: RetentionPolicy,
    // guards every directory read and write; numbers snapshots written by this store
    sequence: Mutex<u64>,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(snapshot_dir: P, retention: RetentionPolicy) -> Result<Self> {
        let snapshot_dir = snapshot_dir.as_ref().to_path_buf();
        fs::create_dir_all(&snapshot_dir)
            .with_context(|| format!("Failed to create snapshot directory {:?}", snapshot_dir))?;
        Ok(Self {
            snapshot_dir,
            retention,
            sequence: Mutex::new(0),
        })
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Get the snapshot directory for a specific collection
    fn collection_snapshot_dir(&self, collection: &str) -> PathBuf {
        self.snapshot_dir.join(collection)
    }

    /// Timestamped name; the sequence number orders writes within one microsecond
    fn generate_snapshot_name(collection: &str, now: &DateTime<Utc>, sequence: u64) -> String {
        format!(
            "{}-{}-{:06}.{}",
            collection,
            now.format("%Y-%m-%d-%H-%M-%S-%6f"),
            sequence,
            SNAPSHOT_EXTENSION
        )
    }

    /// Write a new snapshot for a collection, then apply the retention policy
    pub fn create_snapshot(&self, collection: &str, distributions: &Distributions) -> Result<SnapshotDescription> {
        validate_path_component(collection)?;
        let entropy = total_entropy(distributions)?;

        let mut sequence = self.sequence.lock();
        *sequence += 1;

        let now = Utc::now();
        let snapshot = RaritySnapshot {
            collection: collection.to_string(),
            created_at: now,
            item_count: distributions.item_count(),
            total_entropy: entropy,
            distributions: distributions.clone(),
        };

        let collection_dir = self.collection_snapshot_dir(collection);
        fs::create_dir_all(&collection_dir)?;

        let snapshot_name = Self::generate_snapshot_name(collection, &now, *sequence);
        let snapshot_path = collection_dir.join(&snapshot_name);
        let json_data = serde_json::to_vec(&snapshot)?;

        AtomicFile::new(&snapshot_path, OverwriteBehavior::DisallowOverwrite)
            .write(|file| -> std::io::Result<()> {
                let mut encoder = GzEncoder::new(file, Compression::default());
                encoder.write_all(&json_data)?;
                encoder.finish()?;
                Ok(())
            })
            .map_err(|e| anyhow!("Failed to write snapshot '{}': {}", snapshot_name, e))?;

        let description = describe(&snapshot_path, &snapshot_name)?;
        // the snapshot is written; a failed prune leaves older ones behind
        if let Err(e) = self.prune(collection) {
            warn!(collection, error = %format!("{:#}", e), "failed to prune rarity snapshots");
        }

        debug!(
            collection,
            snapshot = %snapshot_name,
            items = snapshot.item_count,
            "stored rarity snapshot"
        );
        Ok(description)
    }

    /// Snapshot file names for a collection, newest first
    fn snapshot_names(&self, collection: &str) -> Result<Vec<String>> {
        let collection_dir = self.collection_snapshot_dir(collection);
        if !collection_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&collection_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some(SNAPSHOT_EXTENSION) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }

        // Names embed a fixed-width timestamp, so name order is time order
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Caller holds the `sequence` lock
    fn prune(&self, collection: &str) -> Result<()> {
        let Some(keep) = self.retention.keep() else {
            return Ok(());
        };

        let collection_dir = self.collection_snapshot_dir(collection);
        for name in self.snapshot_names(collection)?.into_iter().skip(keep) {
            match fs::remove_file(collection_dir.join(&name)) {
                Ok(()) => debug!(collection, snapshot = %name, "pruned rarity snapshot"),
                Err(e) => warn!(collection, snapshot = %name, error = %e, "failed to prune rarity snapshot"),
            }
        }
        Ok(())
    }

    /// List all snapshots for a collection, newest first
    pub fn list_snapshots(&self, collection: &str) -> Result<Vec<SnapshotDescription>> {
        validate_path_component(collection)?;
        let collection_dir = self.collection_snapshot_dir(collection);

        let _guard = self.sequence.lock();
        self.snapshot_names(collection)?
            .into_iter()
            .map(|name| describe(&collection_dir.join(&name), &name))
            .collect()
    }

    /// Load a snapshot by name
    pub fn load_snapshot(&self, collection: &str, snapshot_name: &str) -> Result<RaritySnapshot> {
        validate_path_component(collection)?;
        validate_path_component(snapshot_name)?;

        let _guard = self.sequence.lock();
        self.read_named(collection, snapshot_name)
    }

    /// Load the newest snapshot of a collection, if any
    pub fn latest_snapshot(&self, collection: &str) -> Result<Option<RaritySnapshot>> {
        validate_path_component(collection)?;

        // one lock across list + read so a concurrent prune cannot remove the file in between
        let _guard = self.sequence.lock();
        match self.snapshot_names(collection)?.first() {
            Some(name) => self.read_named(collection, name).map(Some),
            None => Ok(None),
        }
    }

    fn read_named(&self, collection: &str, snapshot_name: &str) -> Result<RaritySnapshot> {
        let snapshot_path = self.collection_snapshot_dir(collection).join(snapshot_name);
        if !snapshot_path.exists() {
            bail!("Snapshot '{}' not found for collection '{}'", snapshot_name, collection);
        }
        read_snapshot(&snapshot_path)
    }

    /// Delete a snapshot
    pub fn delete_snapshot(&self, collection: &str, snapshot_name: &str) -> Result<bool> {
        validate_path_component(collection)?;
        validate_path_component(snapshot_name)?;

        let _guard = self.sequence.lock();
        let snapshot_path = self.collection_snapshot_dir(collection).join(snapshot_name);
        if snapshot_path.exists() {
            fs::remove_file(&snapshot_path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Collections that have at least one snapshot directory
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let mut collections = Vec::new();
        for entry in fs::read_dir(&self.snapshot_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    collections.push(name.to_string());
                }
            }
        }
        collections.sort();
        Ok(collections)
    }
}

impl SnapshotSink for SnapshotStore {
    fn store_snapshot(&self, collection: &str, distributions: &Distributions) -> rarityx_core::Result<()> {
        self.create_snapshot(collection, distributions)
            .map(|_| ())
            .map_err(|e| rarityx_core::Error::Storage(format!("{:#}", e)))
    }
}

fn validate_path_component(name: &str) -> Result<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(|c: char| c == '/' || c == '\\' || c.is_control())
    {
        bail!("Invalid snapshot path component: {:?}", name);
    }
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<RaritySnapshot> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut json_data = Vec::new();
    decoder.read_to_end(&mut json_data)?;

    let snapshot: RaritySnapshot = serde_json::from_slice(&json_data)
        .with_context(|| format!("Corrupt snapshot {:?}", path))?;
    Ok(snapshot)
}

fn describe(path: &Path, name: &str) -> Result<SnapshotDescription> {
    let metadata = fs::metadata(path)?;
    let file_data = fs::read(path)?;
    let checksum = format!("{:x}", Sha256::digest(&file_data));

    let creation_time = metadata
        .modified()
        .ok()
        .map(|t| DateTime::<Utc>::from(t).format("%Y-%m-%dT%H:%M:%SZ").to_string());

    Ok(SnapshotDescription {
        name: name.to_string(),
        creation_time,
        size: metadata.len(),
        checksum: Some(checksum),
    })
}
