//! Data types for document chunks, search results, and citations.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The kind of source document a chunk was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    /// Derive the file type from a file name's extension (case-insensitive).
    ///
    /// Returns `None` for unsupported extensions.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
        }
    }
}

/// Metadata attached to every stored chunk.
///
/// `source_file` is always non-empty. For PDFs, `page` is the native
/// 0-based page index; for DOCX files it is the 1-based sequential chunk
/// number within the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name (not path) of the originating document.
    pub source_file: String,
    /// Page index (PDF) or sequential chunk number (DOCX).
    pub page: usize,
    /// The kind of source document.
    pub file_type: FileType,
}

/// A bounded span of a source document's extracted text: the unit of
/// embedding and retrieval. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic identifier: `{source_file}#{page}.{seq}`.
    pub id: String,
    /// The chunk's text content.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until embedded.
    pub embedding: Vec<f32>,
    /// Source metadata.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create an unembedded chunk with a deterministic id.
    pub fn new(text: String, metadata: ChunkMetadata, seq: usize) -> Self {
        let id = format!("{}#{}.{}", metadata.source_file, metadata.page, seq);
        Self { id, text, embedding: Vec::new(), metadata }
    }
}

/// A retrieved [`Chunk`] paired with the store-native cosine distance.
///
/// Cosine distance lies in [0, 2]; lower means nearer. The derived
/// similarity `1 − distance` is monotonically decreasing in distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine distance between the query and the chunk embedding.
    pub distance: f32,
}

impl ScoredChunk {
    /// Derived similarity in [−1, 1]: `1 − distance`.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }

    /// The citation for this chunk's source location.
    pub fn citation(&self) -> Citation {
        Citation {
            source_file: self.chunk.metadata.source_file.clone(),
            page: self.chunk.metadata.page,
            file_type: self.chunk.metadata.file_type,
        }
    }
}

/// A source reference exposed alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// File name of the cited document.
    pub source_file: String,
    /// Page index or chunk number within the document.
    pub page: usize,
    /// The kind of source document.
    pub file_type: FileType,
}

impl Citation {
    /// Short display form used by the HTTP front end: `"file (p.N)"`.
    pub fn short(&self) -> String {
        format!("{} (p.{})", self.source_file, self.page)
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (p.{}) [{}]",
            self.source_file,
            self.page,
            self.file_type.to_string().to_uppercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_from_extension() {
        assert_eq!(FileType::from_file_name("report.pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_file_name("Notes.DOCX"), Some(FileType::Docx));
        assert_eq!(FileType::from_file_name("data.txt"), None);
        assert_eq!(FileType::from_file_name("no_extension"), None);
    }

    #[test]
    fn chunk_ids_are_distinct_per_page_and_seq() {
        let meta = |page| ChunkMetadata {
            source_file: "a.pdf".into(),
            page,
            file_type: FileType::Pdf,
        };
        let c1 = Chunk::new("x".into(), meta(0), 0);
        let c2 = Chunk::new("y".into(), meta(0), 1);
        let c3 = Chunk::new("z".into(), meta(1), 0);
        assert_ne!(c1.id, c2.id);
        assert_ne!(c1.id, c3.id);
    }

    #[test]
    fn similarity_is_one_minus_distance() {
        let chunk = Chunk::new(
            "t".into(),
            ChunkMetadata { source_file: "a.pdf".into(), page: 0, file_type: FileType::Pdf },
            0,
        );
        let scored = ScoredChunk { chunk, distance: 0.25 };
        assert!((scored.similarity() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn citation_display_forms() {
        let c = Citation { source_file: "manual.pdf".into(), page: 3, file_type: FileType::Pdf };
        assert_eq!(c.short(), "manual.pdf (p.3)");
        assert_eq!(c.to_string(), "manual.pdf (p.3) [PDF]");
    }
}
