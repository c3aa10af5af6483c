use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentLoader, DocumentMetadata, LoadError, Upload,
};

const BOM: char = '\u{feff}';

/// Plain text and markdown. The whole upload becomes one document with `\n` line endings.
pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

fn content_type(upload: &Upload) -> &'static str {
    let declared_markdown = upload
        .content_type
        .as_deref()
        .is_some_and(|t| t == "text/markdown");
    match upload.extension().as_deref() {
        Some("md" | "markdown") => "text/markdown",
        _ if declared_markdown => "text/markdown",
        _ => "text/plain",
    }
}

fn decode(upload: &Upload) -> Result<String, LoadError> {
    let text = std::str::from_utf8(&upload.bytes).map_err(|e| {
        LoadError::UnsupportedFormat(format!(
            "{} is not UTF-8 text (invalid byte at {})",
            upload.name,
            e.valid_up_to()
        ))
    })?;
    let text = text.strip_prefix(BOM).unwrap_or(text);
    Ok(if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_owned()
    })
}

impl DocumentLoader for TextLoader {
    const EXTENSIONS: &'static [&'static str] = &["txt", "text", "md", "markdown"];

    async fn load(&self, upload: &Upload) -> Result<Vec<Document>, LoadError> {
        super::check_size(upload, self.max_file_size)?;
        let content = decode(upload)?;
        Ok(vec![Document {
            content,
            metadata: DocumentMetadata::new(upload.name.clone(), content_type(upload)),
        }])
    }
}
