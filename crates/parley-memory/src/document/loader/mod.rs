#[cfg(feature = "pdf")]
mod pdf;
mod text;

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;

use super::{Document, DocumentLoader, LoadError, Upload};

/// Pick a loader from the upload's extension or declared type and run it.
///
/// Documents whose text is blank are dropped; an upload that yields no text at all
/// fails with [`LoadError::Empty`].
///
/// # Errors
///
/// Returns [`LoadError`] when the upload is too large, of an unsupported type, unparsable or empty.
pub async fn load_upload(upload: &Upload, max_file_size: u64) -> Result<Vec<Document>, LoadError> {
    let ext = upload.extension();
    let declared = upload.content_type.as_deref().unwrap_or_default();

    let docs = if ext.as_deref() == Some("pdf") || declared == "application/pdf" {
        load_pdf(upload, max_file_size).await?
    } else if ext
        .as_deref()
        .is_some_and(|e| TextLoader::EXTENSIONS.contains(&e))
        || declared.starts_with("text/")
    {
        TextLoader { max_file_size }.load(upload).await?
    } else {
        return Err(LoadError::UnsupportedFormat(upload.name.clone()));
    };

    let docs: Vec<Document> = docs
        .into_iter()
        .filter(|d| !d.content.trim().is_empty())
        .collect();
    if docs.is_empty() {
        return Err(LoadError::Empty {
            name: upload.name.clone(),
        });
    }

    tracing::debug!(source = %upload.name, documents = docs.len(), "upload loaded");
    Ok(docs)
}

#[cfg(feature = "pdf")]
async fn load_pdf(upload: &Upload, max_file_size: u64) -> Result<Vec<Document>, LoadError> {
    PdfLoader { max_file_size }.load(upload).await
}

#[cfg(not(feature = "pdf"))]
#[allow(clippy::unused_async)]
async fn load_pdf(upload: &Upload, _max_file_size: u64) -> Result<Vec<Document>, LoadError> {
    Err(LoadError::UnsupportedFormat(format!(
        "{} (built without PDF support)",
        upload.name
    )))
}

pub(crate) fn check_size(upload: &Upload, limit: u64) -> Result<(), LoadError> {
    if upload.size() > limit {
        return Err(LoadError::TooLarge {
            name: upload.name.clone(),
            size: upload.size(),
            limit,
        });
    }
    Ok(())
}
