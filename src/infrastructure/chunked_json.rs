// Chunked JSON streaming of live samples
use crate::domain::sample::Sample;
use crate::infrastructure::http_response::brotli_compress;
use crate::infrastructure::json_mapper::sample_to_json;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Create a chunked response where each frame is a 4-byte big-endian length
/// followed by one JSON sample (Brotli-compressed per frame when requested).
pub fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Sample> + Send + 'static,
{
    let byte_stream = stream.then(move |sample| async move { encode_frame(&sample, compress).await });

    let body = Body::from_stream(byte_stream);

    // Frames are compressed individually, so no Content-Encoding header.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-json-frames")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single sample into a length-prefixed frame
pub async fn encode_frame(sample: &Sample, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&sample_to_json(sample))?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);

    Ok(frame.freeze())
}

/// Stream new samples from the monitor, skipping any a slow client missed.
pub fn stream_from_receiver(mut rx: broadcast::Receiver<Sample>, compress: bool) -> impl IntoResponse {
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(sample) => yield sample,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Live subscriber lagged, skipped {} samples", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
