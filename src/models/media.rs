use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use mime::Mime;

/// An image picked by the user, held in memory until the form is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk without blocking the runtime.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    /// `data:<mime>;base64,<payload>`, the local preview shown before upload.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type.essence_str(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

pub fn content_type_for(file_name: &str) -> Mime {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("svg") => mime::IMAGE_SVG,
        Some("bmp") => mime::IMAGE_BMP,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Reads every path concurrently; previews come back in selection order.
pub async fn read_all(paths: &[impl AsRef<Path>]) -> std::io::Result<Vec<ImageFile>> {
    let reads = paths.iter().map(|path| ImageFile::read(path));
    futures::future::try_join_all(reads).await
}
