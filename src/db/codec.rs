// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Byte encodings for cached records.

use crate::error::{AppError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// zstd compression level for cached records.
const ZSTD_LEVEL: i32 = 3;

/// Turns a record into the bytes stored on disk and back.
pub trait Codec: Send + Sync + 'static {
    /// File name suffix, including the leading dot.
    const EXTENSION: &'static str;

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Pretty JSON compressed with zstd; the on-disk format of the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdJsonCodec;

impl Codec for ZstdJsonCodec {
    const EXTENSION: &'static str = ".json.zstd";

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let json = JsonCodec.encode(value)?;
        zstd::encode_all(json.as_slice(), ZSTD_LEVEL)
            .map_err(|e| AppError::Cache(format!("zstd compression failed: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let json = zstd::decode_all(bytes)
            .map_err(|e| AppError::Decode(format!("zstd decompression failed: {}", e)))?;
        JsonCodec.decode(&json)
    }
}

/// Plain pretty-printed JSON, handy for inspecting a cache by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    const EXTENSION: &'static str = ".json";

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON encode failed: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| AppError::Decode(format!("invalid JSON: {}", e)))
    }
}
