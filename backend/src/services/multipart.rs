//! Reads the two-part upload form shared by results and documents:
//! a `json` field with metadata and a `file` field with the bytes.
//! Parts may come in either order; unknown parts are skipped.

use crate::error::ApiError;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;

pub(crate) struct UploadForm<M> {
    pub meta: M,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub(crate) async fn read_upload_form<M: DeserializeOwned>(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<UploadForm<M>, ApiError> {
    let mut meta: Option<M> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "The file is larger than {} bytes",
                            max_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some((filename, bytes));
            }
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                let parsed = serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid upload details: {}", e)))?;
                meta = Some(parsed);
            }
            _ => {}
        }
    }

    let meta = meta.ok_or_else(|| ApiError::BadRequest("Missing upload details".to_string()))?;
    let (file_name, bytes) = file.ok_or_else(|| ApiError::BadRequest("Missing file".to_string()))?;
    Ok(UploadForm {
        meta,
        file_name,
        bytes,
    })
}
