use std::path::Path;

use automarket_core::upload::ImageCandidate;
use reqwest::multipart::Part;

use crate::error::{ClientError, ClientResult};

/// Файл, готовый к отправке в `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Имя файла в части формы.
    pub name: String,
    /// MIME-тип части.
    pub mime: String,
    /// Содержимое файла.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Файл из памяти (например, из `<input type="file">`).
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Читает файл с диска; MIME определяется по расширению.
    ///
    /// Файл больше `max_size` байт отклоняется по метаданным, без чтения.
    pub async fn from_path(path: impl AsRef<Path>, max_size: u64) -> ClientResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let size = tokio::fs::metadata(path).await?.len();
        if size > max_size {
            return Err(ClientError::FileTooLarge {
                name,
                size,
                limit: max_size,
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let mime = mime_for(&name).to_string();
        Ok(Self { name, mime, bytes })
    }

    /// Описание файла для проверок `UploadSelection`.
    pub fn candidate(&self) -> ImageCandidate {
        ImageCandidate::new(self.name.clone(), self.bytes.len() as u64).with_mime(self.mime.clone())
    }

    pub(crate) fn into_part(self) -> ClientResult<Part> {
        let part = Part::bytes(self.bytes)
            .file_name(self.name)
            .mime_str(&self.mime)?;
        Ok(part)
    }
}

fn mime_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
