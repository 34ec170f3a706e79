use std::panic::{self, AssertUnwindSafe};

use lopdf::Document as PdfDocument;
use tracing::debug;

/// Extracts text from every page and concatenates it.
///
/// `pdf-extract` handles font encodings best but gives up on the whole file
/// when any page trips it (and can panic on malformed input). In that case the
/// document is re-read page by page with `lopdf`, and a page that yields
/// nothing contributes an empty string instead of failing the document.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            debug!("pdf-extract failed ({e}), falling back to per-page extraction");
            extract_by_page(bytes)
        }
        Err(_) => {
            debug!("pdf-extract panicked, falling back to per-page extraction");
            extract_by_page(bytes)
        }
    }
}

fn extract_by_page(bytes: &[u8]) -> Result<String, String> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| format!("invalid PDF: {e}"))?;
    if doc.is_encrypted() {
        return Err("PDF is password-protected".to_string());
    }

    let text = doc
        .get_pages()
        .keys()
        .map(|page_number| doc.extract_text(&[*page_number]).unwrap_or_default())
        .collect::<String>();
    Ok(text)
}
