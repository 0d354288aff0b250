//! Static file serving module
//!
//! Resolves `/static/<path>` under the public directory and streams the file
//! in fixed-size chunks instead of buffering it.

use futures_util::{stream, TryStreamExt};
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::Response;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;

use crate::error::ApiError;
use crate::http::{self, mime, response::build_file_response, ResponseBody};
use crate::logger;

/// Serve `rest` (the part of the path after `/static/`) from `public_dir`
pub async fn serve(
    public_dir: &Path,
    rest: &str,
    chunk_size: usize,
) -> Result<Response<ResponseBody>, ApiError> {
    let Some(relative) = sanitize_path(rest) else {
        logger::log_warning(&format!("Path traversal attempt blocked: /static/{rest}"));
        return Err(ApiError::NotFound);
    };
    let file_path = public_dir.join(relative);

    let metadata = match fs::metadata(&file_path).await {
        Ok(m) => m,
        Err(e) if is_missing(&e) => return Err(ApiError::NotFound),
        Err(e) => return Err(file_error(&file_path, e)),
    };
    if !metadata.is_file() {
        return Err(ApiError::NotFound);
    }

    // Symlinks may still point outside the public directory
    let public_canonical = fs::canonicalize(public_dir)
        .await
        .map_err(|e| file_error(public_dir, e))?;
    let file_canonical = fs::canonicalize(&file_path)
        .await
        .map_err(|e| file_error(&file_path, e))?;
    if !file_canonical.starts_with(&public_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: /static/{rest} -> {}",
            file_canonical.display()
        ));
        return Err(ApiError::NotFound);
    }

    let file = File::open(&file_path)
        .await
        .map_err(|e| file_error(&file_path, e))?;

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    let body = stream_file(file, chunk_size, file_path.display().to_string());

    Ok(build_file_response(body, content_type, metadata.len()))
}

/// Turn the request remainder into a relative path
///
/// Empty and `.` segments are dropped; `..`, a NUL byte or a decoded
/// separator rejects the path. The result only holds normal components.
fn sanitize_path(rest: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in rest.split('/') {
        let segment = http::decode_path(segment);
        match segment.as_str() {
            "" | "." => {}
            ".." => return None,
            s if s.contains(['/', '\\', '\0']) => return None,
            s => relative.push(s),
        }
    }
    let normal_only = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    normal_only.then_some(relative)
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn file_error(path: &Path, source: io::Error) -> ApiError {
    ApiError::FileRead {
        path: path.display().to_string(),
        source,
    }
}

/// Stream an open file as response body frames
fn stream_file(file: File, chunk_size: usize, path: String) -> ResponseBody {
    let chunk_size = chunk_size.max(1);
    let frames = stream::try_unfold(file, move |file| read_chunk(file, chunk_size))
        .inspect_err(move |e| {
            logger::log_error(&format!("Failed to stream file '{path}': {e}"));
        });
    StreamBody::new(frames).boxed_unsync()
}

async fn read_chunk(
    mut file: File,
    chunk_size: usize,
) -> io::Result<Option<(Frame<Bytes>, File)>> {
    let mut buf = vec![0u8; chunk_size];
    let n = file.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some((Frame::data(Bytes::from(buf)), file)))
}
