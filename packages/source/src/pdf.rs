//! PDF page text decoding via [`pdf_extract`].

use crate::{DocumentReader, SourceError};

/// Reads PDF documents with pure-Rust text extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDocumentReader;

impl DocumentReader for PdfDocumentReader {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>, SourceError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| SourceError::Extraction(format!("failed to extract text from PDF: {e}")))?;

        log::debug!(
            "Extracted {} pages ({} characters) from {} bytes of PDF",
            pages.len(),
            pages.iter().map(String::len).sum::<usize>(),
            bytes.len()
        );

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = PdfDocumentReader.pages(b"<html>not a pdf</html>").unwrap_err();
        assert!(matches!(err, SourceError::Extraction(_)));
    }
}
