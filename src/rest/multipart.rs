/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! `multipart/form-data` upload bodies that stream the file instead of loading it.
//!
//! The body is laid out as a buffered header (one part per parameter plus the file part
//! headers), the raw file bytes and a buffered footer. The header and footer are fixed before
//! anything is sent so the total length can be declared up front.
//!
//! A spawned producer task reads the file and feeds a bounded channel whose receiving end is the
//! request body. A read failure is forwarded as an error item which aborts the request. If the
//! request goes away first the producer sees the closed channel and stops.
use bytes::Bytes;
use futures::SinkExt;
use futures::channel::mpsc;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const BOUNDARY: &str = "----flickr-rs-7d9f3a1c5e2b4860-upload";
pub const FILE_FIELD: &str = "photo";
const CRLF: &str = "\r\n";
const CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_DEPTH: usize = 4;

/// Chunks of the body as produced by the upload task
pub type BodyStream = mpsc::Receiver<io::Result<Bytes>>;

/// A multipart body ready to be streamed, with its exact length known
#[derive(Debug)]
pub struct MultipartBody {
    header: Bytes,
    footer: Bytes,
    file: File,
    file_len: u64,
}

impl MultipartBody {
    /// Opens the file and lays out the body around it.
    ///
    /// Fails before any network activity when the file cannot be opened or inspected, or when a
    /// parameter contains the boundary.
    pub async fn open(
        params: &HashMap<String, String>,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            header: header(params, &file_name, content_type)?,
            footer: footer(),
            file,
            file_len: metadata.len(),
        })
    }

    /// Value for the Content-Type header
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    /// Exact number of bytes the stream will yield
    pub fn content_length(&self) -> u64 {
        self.header.len() as u64 + self.file_len + self.footer.len() as u64
    }

    /// Starts the producer task and returns the consuming end.
    ///
    /// Must be called from within a tokio runtime.
    pub fn into_stream(self) -> BodyStream {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        tokio::spawn(produce(
            self.header,
            self.file,
            self.file_len,
            self.footer,
            tx,
        ));
        rx
    }
}

// Parameters are written raw, so none of them may contain the boundary
fn header(
    params: &HashMap<String, String>,
    file_name: &str,
    content_type: &str,
) -> io::Result<Bytes> {
    let clash = params
        .iter()
        .flat_map(|(k, v)| [k.as_str(), v.as_str()])
        .chain([file_name, content_type])
        .find(|value| value.contains(BOUNDARY));
    if let Some(value) = clash {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("multipart field contains the boundary: {:?}", value),
        ));
    }

    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        out.push_str(&format!("--{}{}", BOUNDARY, CRLF));
        out.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"{}{}",
            key, CRLF, CRLF
        ));
        out.push_str(&params[key]);
        out.push_str(CRLF);
    }
    out.push_str(&format!("--{}{}", BOUNDARY, CRLF));
    out.push_str(&format!(
        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{}",
        FILE_FIELD,
        file_name.replace('"', "%22"),
        CRLF
    ));
    out.push_str(&format!("Content-Type: {}{}{}", content_type, CRLF, CRLF));
    Ok(Bytes::from(out))
}

fn footer() -> Bytes {
    Bytes::from(format!("{}--{}--{}", CRLF, BOUNDARY, CRLF))
}

/// Sends header, exactly `expected` bytes of `source`, then footer.
///
/// A source that errors or comes up short ends the stream with an error item, so the consumer
/// never sees a body that disagrees with the declared length.
pub(crate) async fn produce<R>(
    header: Bytes,
    source: R,
    expected: u64,
    footer: Bytes,
    mut tx: mpsc::Sender<io::Result<Bytes>>,
) where
    R: AsyncRead + Unpin,
{
    if tx.send(Ok(header)).await.is_err() {
        return;
    }

    let mut source = source.take(expected);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut sent = 0u64;
    loop {
        match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                sent += n as u64;
                if tx.send(Ok(Bytes::copy_from_slice(&buf[..n]))).await.is_err() {
                    log::debug!("Upload body dropped after {} bytes", sent);
                    return;
                }
            }
            Err(err) => {
                log::warn!("Upload source failed after {} bytes: {}", sent, err);
                let _ = tx.send(Err(err)).await;
                return;
            }
        }
    }

    if sent != expected {
        let _ = tx
            .send(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank during upload: read {} of {} bytes", sent, expected),
            )))
            .await;
        return;
    }
    let _ = tx.send(Ok(footer)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::NamedTempFile;
    use tokio::io::ReadBuf;

    fn params() -> HashMap<String, String> {
        [
            ("oauth_token", "t"),
            ("oauth_consumer_key", "k"),
            ("oauth_signature", "abc/+="),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    async fn collect(stream: BodyStream) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut stream = stream;
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    fn temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    async fn assert_length_matches(size: usize) {
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        let file = temp_file(&content);
        let body = MultipartBody::open(&params(), file.path(), "image/jpeg")
            .await
            .unwrap();
        let declared = body.content_length();
        let bytes = collect(body.into_stream()).await.unwrap();
        assert_eq!(declared, bytes.len() as u64, "file of {} bytes", size);
    }

    #[tokio::test]
    async fn length_matches_empty_file() {
        assert_length_matches(0).await;
    }

    #[tokio::test]
    async fn length_matches_single_byte() {
        assert_length_matches(1).await;
    }

    #[tokio::test]
    async fn length_matches_multi_megabyte_file() {
        assert_length_matches(3 * 1024 * 1024 + 17).await;
    }

    #[tokio::test]
    async fn body_layout() {
        let file = temp_file(b"JPEGDATA");
        let body = MultipartBody::open(&params(), file.path(), "image/jpeg")
            .await
            .unwrap();
        let text = String::from_utf8(collect(body.into_stream()).await.unwrap()).unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();

        let expected = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"oauth_consumer_key\"\r\n\r\nk\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"oauth_signature\"\r\n\r\nabc/+=\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"oauth_token\"\r\n\r\nt\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{n}\"\r\n\
             Content-Type: image/jpeg\r\n\r\nJPEGDATA\r\n--{b}--\r\n",
            b = BOUNDARY,
            n = name
        );
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn file_bytes_stream_unchanged() {
        let content: Vec<u8> = (0..200_000u32).map(|i| (i * 7 % 256) as u8).collect();
        let file = temp_file(&content);
        let body = MultipartBody::open(&HashMap::new(), file.path(), "image/png")
            .await
            .unwrap();
        let header_len = body.header.len();
        let footer_len = body.footer.len();
        let bytes = collect(body.into_stream()).await.unwrap();
        let payload = &bytes[header_len..bytes.len() - footer_len];
        assert_eq!(
            format!("{:x}", md5::compute(payload)),
            format!("{:x}", md5::compute(&content))
        );
    }

    #[tokio::test]
    async fn value_containing_boundary_is_rejected() {
        let file = temp_file(b"JPEGDATA");
        let mut p = params();
        p.insert(
            "title".to_string(),
            format!("innocent\r\n--{}\r\nContent-Disposition: x", BOUNDARY),
        );
        let err = MultipartBody::open(&p, file.path(), "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        // Boundary-like text that is not the boundary is sent as is
        p.insert("title".to_string(), "--a\r\nb".to_string());
        assert!(MultipartBody::open(&p, file.path(), "image/jpeg").await.is_ok());
    }

    #[tokio::test]
    async fn missing_file_fails_before_streaming() {
        let err = MultipartBody::open(&params(), "/definitely/not/here.jpg", "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = MultipartBody::open(&params(), dir.path(), "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    // Yields some bytes then fails
    struct FailingReader {
        served: bool,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.served {
                return Poll::Ready(Err(io::Error::other("disk went away")));
            }
            self.served = true;
            buf.put_slice(b"partial");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn read_error_reaches_consumer() {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        tokio::spawn(produce(
            Bytes::from_static(b"head"),
            FailingReader { served: false },
            100,
            Bytes::from_static(b"foot"),
            tx,
        ));
        let err = collect(rx).await.unwrap_err();
        assert_eq!(err.to_string(), "disk went away");
    }

    #[tokio::test]
    async fn short_source_reaches_consumer() {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        tokio::spawn(produce(
            Bytes::from_static(b"head"),
            &b"only ten b"[..],
            64,
            Bytes::from_static(b"foot"),
            tx,
        ));
        let err = collect(rx).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn longer_source_is_truncated_to_declared_length() {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        tokio::spawn(produce(
            Bytes::from_static(b"<"),
            &b"0123456789"[..],
            4,
            Bytes::from_static(b">"),
            tx,
        ));
        assert_eq!(collect(rx).await.unwrap(), b"<0123>".to_vec());
    }

    #[tokio::test]
    async fn dropped_consumer_stops_producer() {
        let file = temp_file(&vec![0u8; 4 * CHUNK_SIZE * CHANNEL_DEPTH]);
        let body = MultipartBody::open(&params(), file.path(), "image/jpeg")
            .await
            .unwrap();
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        let producer = tokio::spawn(produce(
            body.header,
            body.file,
            body.file_len,
            body.footer,
            tx,
        ));
        drop(rx);
        // Completes instead of blocking on the full channel
        producer.await.unwrap();
    }
}
