//! Multipart form construction with upload progress
//!
//! The file part is fed to the transport as a stream of fixed-size chunks.
//! Progress is reported as each chunk is pulled, so the percentage follows
//! what the transport has actually consumed.

use futures::stream;
use gatehouse_domain::ApiError;
use reqwest::multipart::{Form, Part};
use reqwest::Body;

use super::request::{MultipartBody, ProgressFn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Build a fresh form for one attempt.
pub fn build_form(body: &MultipartBody) -> Result<Form, ApiError> {
    let total = body.bytes.len();
    let stream_body = progress_body(body, body.progress.clone());

    let mut part = Part::stream_with_length(stream_body, total as u64)
        .file_name(body.file_name.clone());
    if let Some(mime) = body.content_type.as_deref() {
        part = part
            .mime_str(mime)
            .map_err(|err| ApiError::local(format!("invalid content type {mime:?}: {err}")))?;
    }

    let form = body
        .fields
        .iter()
        .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()));
    Ok(form.part(body.field_name.clone(), part))
}

fn progress_body(body: &MultipartBody, progress: Option<ProgressFn>) -> Body {
    let total = body.bytes.len();
    let chunks: Vec<Vec<u8>> = body.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();

    if total == 0 {
        if let Some(progress) = progress.as_ref() {
            progress(100);
        }
    }

    let mut sent = 0usize;
    let chunks = chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        if let Some(progress) = progress.as_ref() {
            progress(percent(sent, total));
        }
        Ok::<_, std::io::Error>(chunk)
    });
    Body::wrap_stream(stream::iter(chunks))
}

/// `sent * 100 / total`, clamped to 100
pub fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let value = (sent as u128 * 100) / total as u128;
    value.min(100) as u8
}
