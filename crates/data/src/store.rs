//! Persistent store for user-authored protocols. One JSON document on disk,
//! read once at process start; every mutation writes the whole document back.

use crate::schema::{ProtocolDoc, StoreDoc, CURRENT_STORE_VERSION};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ProtocolStore {
    path: PathBuf,
    doc: StoreDoc,
}

impl ProtocolStore {
    /// Open a store, creating an empty one in memory when the file does not
    /// exist yet. A version mismatch is logged and the document is kept
    /// as parsed; unknown future fields are dropped rather than refused.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                doc: StoreDoc::default(),
            });
        }
        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let doc: StoreDoc =
            serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
        if doc.version != CURRENT_STORE_VERSION {
            log::warn!(
                "{}: store version {} (current {}), loading best-effort",
                path.display(),
                doc.version,
                CURRENT_STORE_VERSION
            );
        }
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> Vec<ProtocolDoc> {
        self.doc.protocols.clone()
    }

    /// Insert or replace a protocol keyed by its id, then persist.
    pub fn upsert(&mut self, doc: ProtocolDoc) -> anyhow::Result<()> {
        match self
            .doc
            .protocols
            .iter_mut()
            .find(|existing| existing.id == doc.id)
        {
            Some(existing) => *existing = doc,
            None => self.doc.protocols.push(doc),
        }
        self.save()
    }

    /// Remove a protocol by id, then persist. Returns whether anything was
    /// removed; deleting an unknown id does not touch the file.
    pub fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let before = self.doc.protocols.len();
        self.doc.protocols.retain(|existing| existing.id != id);
        if self.doc.protocols.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&mut self) -> anyhow::Result<()> {
        self.doc.version = CURRENT_STORE_VERSION;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.doc).context("serialize store")?;
        fs::write(&self.path, raw).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}
