//! Loading and splitting documents into chunks.

use std::path::Path;

use tracing::{info, warn};

use crate::chunking::TextSplitter;
use crate::document::{Chunk, ChunkMetadata, FileType};
use crate::extract;

/// Loads a set of files from a directory and splits them into chunks.
///
/// Implementations are partial-failure tolerant: a file that cannot be
/// processed is skipped with a logged reason and the batch continues.
pub trait DocumentLoader: Send + Sync {
    /// Load and split the named files, in the given order.
    ///
    /// Returns chunks in file order, then intra-file chunk order.
    fn load_and_split(&self, docs_dir: &Path, files: &[String]) -> Vec<Chunk>;
}

/// Filesystem-backed [`DocumentLoader`] for PDF and DOCX files.
///
/// PDFs are extracted per page; each chunk's `page` is the native 0-based
/// page index. DOCX files are extracted as one text; each chunk's `page`
/// is its 1-based sequential number within the document.
pub struct FsLoader {
    splitter: TextSplitter,
}

impl FsLoader {
    /// Create a loader splitting into chunks of `chunk_size` characters
    /// with `chunk_overlap` characters of overlap.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { splitter: TextSplitter::new(chunk_size, chunk_overlap) }
    }

    fn load_pdf(&self, path: &Path, file_name: &str) -> crate::Result<Vec<Chunk>> {
        let pages = extract::pdf_pages(path)?;
        let mut chunks = Vec::new();
        for (page, text) in pages.iter().enumerate() {
            for (seq, piece) in self.splitter.split(text).into_iter().enumerate() {
                let metadata = ChunkMetadata {
                    source_file: file_name.to_string(),
                    page,
                    file_type: FileType::Pdf,
                };
                chunks.push(Chunk::new(piece, metadata, seq));
            }
        }
        Ok(chunks)
    }

    fn load_docx(&self, path: &Path, file_name: &str) -> crate::Result<Vec<Chunk>> {
        let text = extract::docx_text(path)?;
        let chunks = self
            .splitter
            .split(&text)
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                let metadata = ChunkMetadata {
                    source_file: file_name.to_string(),
                    // 1-based sequential chunk number.
                    page: i + 1,
                    file_type: FileType::Docx,
                };
                Chunk::new(piece, metadata, 0)
            })
            .collect();
        Ok(chunks)
    }
}

impl DocumentLoader for FsLoader {
    fn load_and_split(&self, docs_dir: &Path, files: &[String]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut processed = 0usize;

        for file_name in files {
            let path = docs_dir.join(file_name);

            let Some(file_type) = FileType::from_file_name(file_name) else {
                warn!(file = %file_name, "skipped: file type not supported");
                continue;
            };

            let loaded = match file_type {
                FileType::Pdf => self.load_pdf(&path, file_name),
                FileType::Docx => self.load_docx(&path, file_name),
            };

            match loaded {
                Ok(file_chunks) if file_chunks.is_empty() => {
                    warn!(file = %file_name, "skipped: no extractable text");
                }
                Ok(file_chunks) => {
                    info!(file = %file_name, chunks = file_chunks.len(), "processed");
                    chunks.extend(file_chunks);
                    processed += 1;
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "skipped");
                }
            }
        }

        info!(processed, total = files.len(), "loaded document batch");
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_docx(path: &Path, body_text: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        let xml = format!(
            "<w:document><w:body><w:p><w:r><w:t>{body_text}</w:t></w:r></w:p></w:body></w:document>"
        );
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn docx_chunks_have_sequential_one_based_pages() {
        let tmp = tempfile::tempdir().unwrap();
        // One long run with no paragraph breaks under the chunk size.
        let body: String = (0..40).map(|i| format!("Fact number {i} stated plainly. ")).collect();
        write_docx(&tmp.path().join("notes.docx"), &body);

        let loader = FsLoader::new(500, 100);
        let chunks = loader.load_and_split(tmp.path(), &["notes.docx".to_string()]);

        assert!(chunks.len() >= 2);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.page, i + 1);
            assert_eq!(chunk.metadata.source_file, "notes.docx");
            assert_eq!(chunk.metadata.file_type, FileType::Docx);
        }
    }

    #[test]
    fn unreadable_file_is_skipped_and_batch_continues() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("broken.pdf"), b"not a pdf").unwrap();
        write_docx(&tmp.path().join("ok.docx"), "Some perfectly good content.");

        let loader = FsLoader::new(500, 100);
        let chunks = loader
            .load_and_split(tmp.path(), &["broken.pdf".to_string(), "ok.docx".to_string()]);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.metadata.source_file == "ok.docx"));
    }

    #[test]
    fn empty_docx_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_docx(&tmp.path().join("empty.docx"), "   ");

        let loader = FsLoader::new(500, 100);
        let chunks = loader.load_and_split(tmp.path(), &["empty.docx".to_string()]);
        assert!(chunks.is_empty());
    }

    #[test]
    fn unsupported_extension_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("plain.txt"), b"text").unwrap();

        let loader = FsLoader::new(500, 100);
        let chunks = loader.load_and_split(tmp.path(), &["plain.txt".to_string()]);
        assert!(chunks.is_empty());
    }
}
