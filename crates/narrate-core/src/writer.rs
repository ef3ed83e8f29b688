//! Persisting audio to disk

use futures::StreamExt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::synth::AudioStream;

async fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::write_failed(parent, e))?;
    }
    Ok(())
}

/// Write a complete buffer, replacing any existing file.
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<u64> {
    create_parent(path).await?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| Error::write_failed(path, e))?;
    debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(bytes.len() as u64)
}

/// Create (or truncate) the output file, creating parent directories.
///
/// Callers that watch the file size must open it before starting the
/// watcher, so a larger file left by an earlier run is never observed.
pub async fn create_output(path: &Path) -> Result<File> {
    create_parent(path).await?;
    File::create(path)
        .await
        .map_err(|e| Error::write_failed(path, e))
}

/// Drain `stream` into `path` in arrival order and return the byte count.
pub async fn drain_to_file(stream: AudioStream, path: &Path) -> Result<u64> {
    let file = create_output(path).await?;
    drain_into(file, stream, path).await
}

/// Drain `stream` into an already opened `file`.
///
/// Each chunk is flushed before the next is awaited, so readers watching the
/// file size see it grow. Runs until the stream ends or fails.
pub async fn drain_into(mut file: File, mut stream: AudioStream, path: &Path) -> Result<u64> {
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::write_failed(path, e))?;
        file.flush().await.map_err(|e| Error::write_failed(path, e))?;
        written += chunk.len() as u64;
    }

    file.sync_all()
        .await
        .map_err(|e| Error::write_failed(path, e))?;
    debug!("Streamed {} bytes to {:?}", written, path);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_drain_creates_parents_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.mp3");

        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"ID3")),
            Ok(Bytes::from_static(b"-frame-1")),
            Ok(Bytes::from_static(b"-frame-2")),
        ];
        let written = drain_to_file(stream::iter(chunks).boxed(), &path)
            .await
            .unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(written, on_disk.len() as u64);
        assert_eq!(on_disk, b"ID3-frame-1-frame-2");
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");

        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(Error::SynthesisFailed("reset".to_string())),
        ];
        let err = drain_to_file(stream::iter(chunks).boxed(), &path)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SynthesisFailed(_)));
    }

    #[tokio::test]
    async fn test_write_bytes_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.mp3");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let written = assert_ok!(write_bytes(&path, b"short").await);
        assert_eq!(written, 5);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_create_output_truncates_before_streaming() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.mp3");
        std::fs::write(&path, vec![0u8; 100_000]).unwrap();

        let file = assert_ok!(create_output(&path).await);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

        let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from_static(b"fresh"))];
        let written = assert_ok!(drain_into(file, stream::iter(chunks).boxed(), &path).await);
        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_unwritable_path_is_write_failed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = assert_err!(write_bytes(&blocker.join("out.mp3"), b"data").await);
        assert!(matches!(err, Error::WriteFailed { .. }));
    }
}
