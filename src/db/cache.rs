// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable record cache on the local filesystem.
//!
//! Layout: `<root>/data/<kind>/<id><ext>`, one file per record. Writes go
//! to a temporary file that is then renamed over the target, so a record is
//! either fully present or absent.

use crate::db::codec::{Codec, ZstdJsonCodec};
use crate::db::RecordKind;
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityStreams};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Record cache keyed by (kind, activity id).
#[derive(Debug, Clone)]
pub struct LocalCache<C: Codec = ZstdJsonCodec> {
    root: PathBuf,
    codec: C,
}

impl LocalCache<ZstdJsonCodec> {
    /// Cache rooted at `root` using the default zstd/JSON encoding.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_codec(root, ZstdJsonCodec)
    }
}

impl<C: Codec> LocalCache<C> {
    pub fn with_codec(root: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    fn kind_dir(&self, kind: RecordKind) -> PathBuf {
        self.root.join("data").join(kind.as_str())
    }

    fn record_path(&self, kind: RecordKind, id: &str) -> PathBuf {
        self.kind_dir(kind).join(format!("{}{}", id, C::EXTENSION))
    }

    // ─── Generic Get/Save ────────────────────────────────────────

    /// Load a record. `Ok(None)` means nothing is cached under this key;
    /// a record that exists but cannot be decoded is an error.
    pub async fn get<T: DeserializeOwned>(&self, kind: RecordKind, id: &str) -> Result<Option<T>> {
        let path = self.record_path(kind, id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Cache(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        self.codec
            .decode(&bytes)
            .map(Some)
            .map_err(|e| with_path(e, &path))
    }

    /// Store a record, replacing any previous one under the same key.
    pub async fn save<T: Serialize>(&self, kind: RecordKind, id: &str, value: &T) -> Result<()> {
        let dir = self.kind_dir(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to create {}: {}", dir.display(), e)))?;

        let bytes = self.codec.encode(value)?;
        let path = self.record_path(kind, id);
        let tmp_path = dir.join(format!(
            ".{}{}.{}.tmp",
            id,
            C::EXTENSION,
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        tokio::fs::write(&tmp_path, &bytes).await.map_err(|e| {
            AppError::Cache(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::Cache(format!(
                "Failed to rename into {}: {}",
                path.display(),
                e
            )));
        }

        tracing::debug!(kind = %kind, id, bytes = bytes.len(), "Cached record");
        Ok(())
    }

    // ─── Typed Operations ────────────────────────────────────────

    pub async fn get_activity(&self, id: u64) -> Result<Option<Activity>> {
        self.get(RecordKind::Activity, &id.to_string()).await
    }

    pub async fn save_activity(&self, activity: &Activity) -> Result<()> {
        self.save(RecordKind::Activity, &activity.id.to_string(), activity)
            .await
    }

    pub async fn get_streams(&self, id: u64) -> Result<Option<ActivityStreams>> {
        self.get(RecordKind::Stream, &id.to_string()).await
    }

    pub async fn save_streams(&self, id: u64, streams: &ActivityStreams) -> Result<()> {
        self.save(RecordKind::Stream, &id.to_string(), streams).await
    }

    /// Load every cached activity, in directory order.
    ///
    /// An empty or missing cache yields an empty list. Any record that fails
    /// to decode fails the whole listing.
    pub async fn list_activities(&self) -> Result<Vec<Activity>> {
        let dir = self.kind_dir(RecordKind::Activity);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Cache(format!(
                    "Failed to list {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut activities = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Cache(format!("Failed to list {}: {}", dir.display(), e)))?
        {
            let name = entry.file_name();
            let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_suffix(C::EXTENSION))
                .filter(|id| !id.starts_with('.'))
            else {
                continue;
            };

            if let Some(activity) = self.get(RecordKind::Activity, id).await? {
                activities.push(activity);
            }
        }

        Ok(activities)
    }
}

fn with_path(err: AppError, path: &Path) -> AppError {
    match err {
        AppError::Decode(msg) => AppError::Decode(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}
