use crate::TextIndex;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_index(index: &TextIndex, created_at: String) -> Self {
        Self { num_docs: index.num_docs() as u32, num_terms: index.num_terms() as u32, created_at, version: SNAPSHOT_VERSION }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &IndexPaths, index: &TextIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load a snapshot written by [`save_index`] + [`save_meta`]. The snapshot is
/// checked for internal consistency before it is handed out.
pub fn load_index(paths: &IndexPaths) -> Result<TextIndex> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        bail!("unsupported index snapshot version {} (expected {SNAPSHOT_VERSION})", meta.version);
    }
    let mut f = File::open(paths.index())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index: TextIndex = bincode::deserialize(&buf)?;
    if index.num_docs() as u32 != meta.num_docs {
        bail!("index snapshot holds {} documents but meta.json says {}", index.num_docs(), meta.num_docs);
    }
    if index.num_terms() as u32 != meta.num_terms {
        bail!("index snapshot holds {} terms but meta.json says {}", index.num_terms(), meta.num_terms);
    }
    index.validate()?;
    Ok(index)
}
