// Chunked JSON frame streaming utilities
use crate::domain::chart::ChartFrame;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::io::AsyncReadExt;

/// Create a chunked streaming response of chart frames, one length-prefixed
/// JSON document per frame.
pub async fn chunked_frame_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = ChartFrame> + Send + 'static,
{
    let byte_stream = stream.then(move |frame| async move { serialize_chunk(frame, compress).await });

    let body = Body::from_stream(byte_stream);

    // NOTE: We do NOT set Content-Encoding here because compression is
    // applied per chunk, not to the HTTP response as a whole. A client
    // decompressing the stream wholesale would break the chunk framing.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single frame to a chunk: JSON payload, optionally
/// Brotli-compressed, behind a 4-byte big-endian length prefix.
async fn serialize_chunk(frame: ChartFrame, compress: bool) -> Result<Bytes, std::io::Error> {
    let buffer = serde_json::to_vec(&frame)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let payload = if compress {
        let cursor = std::io::Cursor::new(buffer);
        let mut encoder = BrotliEncoder::new(cursor);
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await?;
        compressed
    } else {
        buffer
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<ChartFrame>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(frame) = rx.recv().await {
            yield frame;
        }
    };

    match chunked_frame_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{ChartSeries, PlotPoint};
    use crate::domain::range::TimeRange;

    fn frame() -> ChartFrame {
        ChartFrame {
            range: TimeRange::Minute,
            series: ChartSeries {
                points: vec![PlotPoint { x: 30.0, y: 0.011427 }],
                average: Some(10.0),
            },
            x_labels: TimeRange::Minute.x_labels(chrono::Local::now().naive_local()),
            axis: TimeRange::Minute.axis(),
        }
    }

    #[tokio::test]
    async fn test_chunk_is_length_prefixed_json() {
        let chunk = serialize_chunk(frame(), false).await.unwrap();
        let length = u32::from_be_bytes(chunk[..4].try_into().unwrap()) as usize;
        assert_eq!(length, chunk.len() - 4);
        let value: serde_json::Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(value["range"], "minute");
        assert_eq!(value["series"]["average"], 10.0);
        assert_eq!(value["axis"]["label_count"], 13);
    }

    #[tokio::test]
    async fn test_compressed_chunk_prefix_matches_payload() {
        let chunk = serialize_chunk(frame(), true).await.unwrap();
        let length = u32::from_be_bytes(chunk[..4].try_into().unwrap()) as usize;
        assert_eq!(length, chunk.len() - 4);
    }
}
