//! Memory document store for Eva.
//!
//! Eva's identity and context live in five markdown documents under a single
//! directory: `soul`, `user`, `telos`, `context`, `harness`. Four are
//! read-only inputs during a run; `context` is an append-only rolling log of
//! timestamped entries. Documents are authored out-of-band and never created
//! or deleted here.

use chrono::Local;
use eva_core::error::MemoryError;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// The five required memory document names, in prompt-assembly order.
pub const DOCUMENT_NAMES: [&str; 5] = ["soul", "user", "telos", "context", "harness"];

/// All five documents, loaded together.
pub type MemoryDocuments = HashMap<String, String>;

/// One entry appended to the rolling context log.
///
/// The follow-up is a true option: when absent, no follow-up line is
/// rendered at all (never an empty one).
#[derive(Debug, Clone)]
pub struct ContextEntry {
    /// Free-form label such as "Decision", "Learning", "Commitment"
    pub category: String,
    /// One-line summary
    pub summary: String,
    /// Full details
    pub details: String,
    /// Optional follow-up action
    pub followup: Option<String>,
}

impl ContextEntry {
    /// Render this entry as a log block with the given minute-precision
    /// timestamp.
    fn render(&self, timestamp: &str) -> String {
        let mut block = format!("\n### {} - [{}]\n", timestamp, self.category);
        block.push_str(&format!("**Summary:** {}\n", self.summary));
        block.push_str(&format!("**Details:** {}\n", self.details));
        if let Some(followup) = &self.followup {
            block.push_str(&format!("**Follow-up:** {followup}\n"));
        }
        block
    }
}

/// A store over the memory directory.
///
/// Reads are lock-free; appends to the context log are serialized through an
/// in-process mutex and performed as a single `O_APPEND` write so concurrent
/// invocations never interleave partial blocks.
pub struct MemoryStore {
    dir: PathBuf,
    append_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create a store over the given memory directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            append_lock: Mutex::new(()),
        }
    }

    /// The directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.md"))
    }

    /// Load a single memory document by name.
    ///
    /// The operation is name-agnostic; only the five fixed identifiers are
    /// ever requested by the rest of the system.
    pub async fn load_document(&self, name: &str) -> Result<String, MemoryError> {
        let path = self.document_path(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MemoryError::DocumentNotFound(name.to_string()))
            }
            Err(e) => Err(MemoryError::Storage(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Load all five required documents.
    ///
    /// All-or-nothing: the first missing name fails the whole call and no
    /// partial mapping is returned.
    pub async fn load_all(&self) -> Result<MemoryDocuments, MemoryError> {
        let mut docs = HashMap::with_capacity(DOCUMENT_NAMES.len());
        for name in DOCUMENT_NAMES {
            let content = self.load_document(name).await?;
            docs.insert(name.to_string(), content);
        }
        debug!(dir = %self.dir.display(), "Loaded all memory documents");
        Ok(docs)
    }

    /// Append an entry to the context log.
    ///
    /// The block is written in a single append under exclusive access and is
    /// durable before this returns. The log must already exist; this never
    /// creates it.
    pub async fn append_context_entry(&self, entry: &ContextEntry) -> Result<(), MemoryError> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M").to_string();
        self.append_block(&entry.render(&timestamp)).await
    }

    async fn append_block(&self, block: &str) -> Result<(), MemoryError> {
        let _guard = self.append_lock.lock().await;

        let path = self.document_path("context");
        if !path.exists() {
            return Err(MemoryError::DocumentNotFound("context".into()));
        }

        // Single O_APPEND write; std fs keeps the write-then-sync in one
        // blocking section while the mutex is held.
        let block = block.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), MemoryError> {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&path)
                .map_err(|e| MemoryError::Storage(format!("Failed to open context log: {e}")))?;
            file.write_all(block.as_bytes())
                .map_err(|e| MemoryError::Storage(format!("Failed to append context entry: {e}")))?;
            file.sync_all()
                .map_err(|e| MemoryError::Storage(format!("Failed to sync context log: {e}")))?;
            Ok(())
        })
        .await
        .map_err(|e| MemoryError::Storage(format!("Append task failed: {e}")))??;

        debug!("Appended context entry");
        Ok(())
    }
}

/// Rough token estimate for observability (4 chars ≈ 1 token).
pub fn estimated_tokens(text: &str) -> usize {
    text.len() / 4
}
