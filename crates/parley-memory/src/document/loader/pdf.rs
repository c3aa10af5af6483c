use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentLoader, DocumentMetadata, LoadError, Upload,
};

/// One document per page, numbered from 1.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

fn extract_pages(name: String, bytes: Vec<u8>) -> Result<Vec<String>, LoadError> {
    pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| LoadError::Pdf {
        name,
        reason: e.to_string(),
    })
}

impl DocumentLoader for PdfLoader {
    const EXTENSIONS: &'static [&'static str] = &["pdf"];

    async fn load(&self, upload: &Upload) -> Result<Vec<Document>, LoadError> {
        super::check_size(upload, self.max_file_size)?;

        // pdf-extract is synchronous and can be slow on large files
        let (name, bytes) = (upload.name.clone(), upload.bytes.clone());
        let pages = tokio::task::spawn_blocking(move || extract_pages(name, bytes))
            .await
            .map_err(|e| LoadError::Io(std::io::Error::other(e)))??;

        let mut docs = Vec::with_capacity(pages.len());
        for (page, content) in (1u32..).zip(pages) {
            docs.push(Document {
                content,
                metadata: DocumentMetadata::new(upload.name.clone(), "application/pdf")
                    .with_page(page),
            });
        }
        Ok(docs)
    }
}
