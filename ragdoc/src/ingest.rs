//! Incremental document ingestion.
//!
//! The coordinator diffs the document directory against the files already
//! present in the index and loads, splits, and stores only what is new.
//! Running it again with no new files is a no-op.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::index::VectorIndex;
use crate::loader::DocumentLoader;
use crate::scanner::scan_documents;

/// The end state of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No document files were found, or every new file was skipped.
    NoDocuments,
    /// Every discovered file was already indexed; nothing was written.
    UpToDate,
    /// New files were ingested.
    Updated,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub outcome: IngestOutcome,
    /// Document files discovered in the directory.
    pub files_discovered: usize,
    /// Files not yet present in the index.
    pub files_new: usize,
    /// Chunk count before this run.
    pub chunks_before: usize,
    /// Chunk count after this run.
    pub chunks_after: usize,
}

impl IngestReport {
    /// Whether the run left the index in a usable state.
    pub fn success(&self) -> bool {
        self.outcome != IngestOutcome::NoDocuments
    }

    /// Human-readable one-line summary.
    pub fn message(&self) -> String {
        match self.outcome {
            IngestOutcome::NoDocuments => "No document files found to ingest".to_string(),
            IngestOutcome::UpToDate => {
                format!("Database up to date with {} chunks", self.chunks_after)
            }
            IngestOutcome::Updated => format!(
                "Database updated: {} -> {} chunks ({} new files)",
                self.chunks_before, self.chunks_after, self.files_new
            ),
        }
    }
}

/// Brings a vector index up to date with a document directory.
pub struct IngestionCoordinator {
    loader: Arc<dyn DocumentLoader>,
    index: Arc<VectorIndex>,
    batch_size: usize,
}

impl IngestionCoordinator {
    /// Create a coordinator writing in batches of `batch_size` chunks.
    pub fn new(loader: Arc<dyn DocumentLoader>, index: Arc<VectorIndex>, batch_size: usize) -> Self {
        Self { loader, index, batch_size }
    }

    /// Ingest whatever `docs_dir` holds that the index does not.
    ///
    /// A file already indexed is never reprocessed, even if its content
    /// changed on disk. An empty store treats every discovered file as new.
    /// When nothing is new, this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be scanned or the store
    /// cannot be read or written. Per-file extraction failures are skipped
    /// by the loader, not surfaced here.
    pub async fn sync(&self, docs_dir: &Path) -> Result<IngestReport> {
        let all_files = scan_documents(docs_dir)?;
        let chunks_before = self.index.count().await?;

        if all_files.is_empty() {
            info!(dir = %docs_dir.display(), "no document files found");
            return Ok(IngestReport {
                outcome: IngestOutcome::NoDocuments,
                files_discovered: 0,
                files_new: 0,
                chunks_before,
                chunks_after: chunks_before,
            });
        }

        let new_files: Vec<String> = if chunks_before > 0 {
            let processed = self.index.source_files().await?;
            all_files.iter().filter(|f| !processed.contains(*f)).cloned().collect()
        } else {
            // Empty store: full initial build.
            all_files.clone()
        };

        if new_files.is_empty() {
            info!(files = all_files.len(), chunks = chunks_before, "database up to date");
            return Ok(IngestReport {
                outcome: IngestOutcome::UpToDate,
                files_discovered: all_files.len(),
                files_new: 0,
                chunks_before,
                chunks_after: chunks_before,
            });
        }

        info!(new_files = new_files.len(), "ingesting new files");
        let chunks = self.loader.load_and_split(docs_dir, &new_files);

        if chunks.is_empty() {
            info!("every new file was skipped; nothing to add");
            return Ok(IngestReport {
                outcome: IngestOutcome::NoDocuments,
                files_discovered: all_files.len(),
                files_new: new_files.len(),
                chunks_before,
                chunks_after: chunks_before,
            });
        }

        // Bounded batches keep peak embedding memory flat; each batch's
        // buffers are dropped before the next one is embedded.
        for batch in chunks.chunks(self.batch_size) {
            self.index.add(batch.to_vec()).await?;
        }

        let chunks_after = self.index.count().await?;
        info!(before = chunks_before, after = chunks_after, "database updated");

        Ok(IngestReport {
            outcome: IngestOutcome::Updated,
            files_discovered: all_files.len(),
            files_new: new_files.len(),
            chunks_before,
            chunks_after,
        })
    }
}
