//! Static nearest-neighbor index: a memory-mapped `vectors.f32` matrix plus a
//! `meta.json` table with one record per row.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const VECTORS_FILE: &str = "vectors.f32";
pub const META_FILE: &str = "meta.json";

const F32_BYTES: usize = std::mem::size_of::<f32>();

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index file not found: {0}")]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid index metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("index dimensions must be positive")]
    ZeroDimensions,

    #[error("vectors file is {len} bytes, not a multiple of {row_bytes} (dimensions x 4)")]
    Misaligned { len: usize, row_bytes: usize },

    #[error("vectors file holds {vectors} rows but metadata lists {records}")]
    RowCountMismatch { vectors: usize, records: usize },

    #[error("index has {index} dimensions, embedder produces {embedder}")]
    DimensionMismatch { index: usize, embedder: usize },
}

/// One metadata row. Every field is optional on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(default, deserialize_with = "id_as_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_text: Option<String>,
    #[serde(default, rename = "Assignment group", skip_serializing_if = "Option::is_none")]
    pub assignment_group: Option<String>,
    #[serde(default, rename = "Configuration item", skip_serializing_if = "Option::is_none")]
    pub configuration_item: Option<String>,
    #[serde(default, rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Numeric ids are kept as their decimal text.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexMeta {
    pub dimensions: usize,
    pub records: Vec<IndexRecord>,
}

/// A scored row, before metadata is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub row: usize,
    pub score: f32,
}

pub struct VectorIndex {
    dimensions: usize,
    /// `None` for an index with zero rows (an empty file cannot be mapped).
    vectors: Option<Mmap>,
    records: Vec<IndexRecord>,
}

impl VectorIndex {
    /// Map `vectors.f32` and load `meta.json` from `dir`, validating that
    /// the two agree.
    pub fn open(dir: &Path) -> Result<Self, IndexError> {
        let vectors_path = dir.join(VECTORS_FILE);
        let meta_path = dir.join(META_FILE);
        for path in [&vectors_path, &meta_path] {
            if !path.exists() {
                return Err(IndexError::MissingFile(path.clone()));
            }
        }

        let meta: IndexMeta = serde_json::from_str(&std::fs::read_to_string(&meta_path)?)?;
        if meta.dimensions == 0 {
            return Err(IndexError::ZeroDimensions);
        }

        let file = File::open(&vectors_path)?;
        let len = file.metadata()?.len() as usize;
        let row_bytes = meta.dimensions * F32_BYTES;
        if len % row_bytes != 0 {
            return Err(IndexError::Misaligned { len, row_bytes });
        }
        let rows = len / row_bytes;
        if rows != meta.records.len() {
            return Err(IndexError::RowCountMismatch {
                vectors: rows,
                records: meta.records.len(),
            });
        }

        let vectors = if len == 0 {
            None
        } else {
            // The file is opened read-only and never written while mapped.
            Some(unsafe { Mmap::map(&file)? })
        };

        info!(dir = %dir.display(), rows, dimensions = meta.dimensions, "vector index loaded");

        Ok(Self {
            dimensions: meta.dimensions,
            vectors,
            records: meta.records,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, row: usize) -> Option<&IndexRecord> {
        self.records.get(row)
    }

    /// Fail unless an encoder of `dimensions` can query this index.
    pub fn check_dimensions(&self, dimensions: usize) -> Result<(), IndexError> {
        if dimensions != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                index: self.dimensions,
                embedder: dimensions,
            });
        }
        Ok(())
    }

    /// Top `k` rows by inner product with `query`, best first. Equal scores
    /// keep row order. `query` must have `self.dimensions()` components.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<Hit> {
        let Some(bytes) = self.vectors.as_deref() else {
            return Vec::new();
        };
        if k == 0 || query.len() != self.dimensions {
            return Vec::new();
        }

        let mut hits: Vec<Hit> = bytes
            .par_chunks_exact(self.dimensions * F32_BYTES)
            .enumerate()
            .map(|(row, raw)| {
                let score = dot_le(raw, query);
                Hit {
                    row,
                    score: if score.is_nan() { -1.0 } else { score },
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.row.cmp(&b.row)));
        hits.truncate(k);
        hits
    }
}

fn dot_le(raw: &[u8], query: &[f32]) -> f32 {
    raw.chunks_exact(F32_BYTES)
        .zip(query)
        .map(|(b, q)| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) * q)
        .sum()
}

/// Scale `v` to unit length in place. A zero vector is left as is.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Write an index directory in the on-disk format `open` reads.
/// Used by fixtures and offline tooling; vectors are normalized on write.
pub fn write_index(
    dir: &Path,
    dimensions: usize,
    rows: &[(Vec<f32>, IndexRecord)],
) -> Result<(), IndexError> {
    if dimensions == 0 {
        return Err(IndexError::ZeroDimensions);
    }
    std::fs::create_dir_all(dir)?;

    let mut bytes = Vec::with_capacity(rows.len() * dimensions * F32_BYTES);
    let mut records = Vec::with_capacity(rows.len());
    for (vector, record) in rows {
        if vector.len() != dimensions {
            return Err(IndexError::DimensionMismatch {
                index: dimensions,
                embedder: vector.len(),
            });
        }
        let mut v = vector.clone();
        l2_normalize(&mut v);
        bytes.extend(v.iter().flat_map(|x| x.to_le_bytes()));
        records.push(record.clone());
    }

    std::fs::write(dir.join(VECTORS_FILE), bytes)?;
    let meta = IndexMeta { dimensions, records };
    std::fs::write(dir.join(META_FILE), serde_json::to_vec_pretty(&meta)?)?;
    Ok(())
}
