//! The parallel piece-hashing pipeline.
//!
//! A single producer reads the input files in order, filling one
//! piece-length buffer. Every time the buffer fills, its contents are handed
//! to a blocking worker as an independent hashing task and a fresh buffer is
//! started. After the last byte, the residual partial piece (if any) is
//! submitted as the final task.
//!
//! Task handles are kept in a FIFO and awaited strictly in submission order,
//! never in completion order, so the digest string always matches the piece
//! order regardless of which worker finishes first. The FIFO is drained down
//! whenever it reaches the worker count, which bounds the number of buffers
//! in flight.
use std::collections::VecDeque;
use std::path::PathBuf;

use sha1::{Digest, Sha1};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::PIECE_HASH_SIZE;

/// Environment variable overriding the number of hashing workers.
pub const HASHING_THREADS_ENV_VAR: &str = "TTORRENT_HASHING_THREADS";

/// Errors from the hashing pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading an input file failed; the pipeline is aborted and no partial
    /// digest string is returned.
    #[error("i/o error while hashing torrent data: {0}")]
    Io(#[from] std::io::Error),
}

/// SHA-1 of a byte buffer.
#[must_use]
pub fn sha1(bytes: &[u8]) -> [u8; PIECE_HASH_SIZE] {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// How many workers to use for piece hashing.
///
/// `TTORRENT_HASHING_THREADS` wins when it holds a positive integer;
/// otherwise the host's reported parallelism is used.
#[must_use]
pub fn hashing_threads_count() -> usize {
    match std::env::var(HASHING_THREADS_ENV_VAR) {
        Ok(value) => threads_from_env_value(Some(&value)),
        Err(_) => threads_from_env_value(None),
    }
}

fn threads_from_env_value(value: Option<&str>) -> usize {
    if let Some(threads) = value.and_then(|raw| raw.parse::<usize>().ok()) {
        if threads > 0 {
            return threads;
        }
    }

    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Hashes the logical concatenation of `files` in consecutive windows of
/// `piece_length` bytes, returning the concatenated 20-byte SHA-1 digests in
/// piece order. The final piece may be shorter than `piece_length`.
///
/// # Errors
///
/// Any I/O error on an input file aborts the pipeline; workers running at
/// that moment are abandoned and the error is returned instead of a partial
/// digest string.
///
/// # Panics
///
/// Panics if a hashing worker itself panics, which hashing a byte buffer
/// does not.
pub async fn hash_files(files: &[PathBuf], piece_length: usize) -> Result<Vec<u8>, Error> {
    let workers = hashing_threads_count();

    let mut handles: VecDeque<JoinHandle<[u8; PIECE_HASH_SIZE]>> = VecDeque::new();
    let mut digests: Vec<u8> = Vec::new();
    let mut buffer: Vec<u8> = Vec::with_capacity(piece_length);
    let mut chunk = vec![0u8; piece_length];

    for path in files {
        let mut file = tokio::fs::File::open(path).await?;

        debug!("hashing data from {} with {workers} workers", path.display());

        loop {
            let wanted = piece_length - buffer.len();
            let read = file.read(&mut chunk[..wanted]).await?;
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            if buffer.len() == piece_length {
                // Fill, submit a copy, then start a fresh buffer.
                let piece = std::mem::replace(&mut buffer, Vec::with_capacity(piece_length));
                handles.push_back(tokio::task::spawn_blocking(move || sha1(&piece)));

                if handles.len() >= workers {
                    accumulate_digest(&mut digests, &mut handles).await;
                }
            }
        }
    }

    // The residual partial piece, if any, is the last task.
    if !buffer.is_empty() {
        handles.push_back(tokio::task::spawn_blocking(move || sha1(&buffer)));
    }

    while !handles.is_empty() {
        accumulate_digest(&mut digests, &mut handles).await;
    }

    info!(
        "hashed {} file(s) into {} piece(s) of {piece_length} byte(s)",
        files.len(),
        digests.len() / PIECE_HASH_SIZE
    );

    Ok(digests)
}

/// Awaits the oldest in-flight task, preserving submission order.
async fn accumulate_digest(digests: &mut Vec<u8>, handles: &mut VecDeque<JoinHandle<[u8; PIECE_HASH_SIZE]>>) {
    if let Some(handle) = handles.pop_front() {
        let digest = handle.await.expect("it should join the hashing task");
        digests.extend_from_slice(&digest);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::{hash_files, sha1, threads_from_env_value, PIECE_HASH_SIZE};

    fn write_temp_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn sequential_digests(bytes: &[u8], piece_length: usize) -> Vec<u8> {
        let mut digests = Vec::new();
        for piece in bytes.chunks(piece_length) {
            digests.extend_from_slice(&sha1(piece));
        }
        digests
    }

    #[test]
    fn the_worker_count_should_come_from_the_environment_when_it_is_a_positive_integer() {
        assert_eq!(threads_from_env_value(Some("3")), 3);
    }

    #[test]
    fn the_worker_count_should_fall_back_to_host_parallelism_on_bad_values() {
        let default = threads_from_env_value(None);

        assert!(default >= 1);
        assert_eq!(threads_from_env_value(Some("0")), default);
        assert_eq!(threads_from_env_value(Some("-2")), default);
        assert_eq!(threads_from_env_value(Some("lots")), default);
    }

    #[tokio::test]
    async fn it_should_hash_a_file_shorter_than_one_piece() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_file(&dir, "short.bin", b"spam");

        let digests = hash_files(&[path], 16).await.unwrap();

        assert_eq!(digests, sha1(b"spam"));
    }

    #[tokio::test]
    async fn it_should_hash_consecutive_pieces_with_a_shorter_final_piece() {
        let bytes: Vec<u8> = (0..100u8).collect();
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_file(&dir, "data.bin", &bytes);

        let digests = hash_files(&[path], 32).await.unwrap();

        // ceil(100 / 32) = 4 pieces, the last one 4 bytes long.
        assert_eq!(digests.len(), 4 * PIECE_HASH_SIZE);
        assert_eq!(digests, sequential_digests(&bytes, 32));
    }

    #[tokio::test]
    async fn pieces_should_span_file_boundaries_in_file_order() {
        let first: Vec<u8> = (0..50u8).collect();
        let second: Vec<u8> = (50..100u8).collect();
        let dir = tempfile::tempdir().unwrap();
        let path_1 = write_temp_file(&dir, "first.bin", &first);
        let path_2 = write_temp_file(&dir, "second.bin", &second);

        let digests = hash_files(&[path_1, path_2], 32).await.unwrap();

        let concatenated: Vec<u8> = (0..100u8).collect();
        assert_eq!(digests, sequential_digests(&concatenated, 32));
    }

    #[tokio::test]
    async fn an_exact_multiple_of_the_piece_length_should_not_produce_an_empty_final_piece() {
        let bytes = vec![7u8; 64];
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_file(&dir, "exact.bin", &bytes);

        let digests = hash_files(&[path], 32).await.unwrap();

        assert_eq!(digests.len(), 2 * PIECE_HASH_SIZE);
        assert_eq!(digests, sequential_digests(&bytes, 32));
    }

    #[tokio::test]
    async fn a_missing_input_file_should_abort_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");

        assert!(hash_files(&[missing], 32).await.is_err());
    }

    #[tokio::test]
    async fn the_digest_string_should_not_depend_on_buffering_boundaries() {
        // Many small pieces force the ordered drain to kick in repeatedly.
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_file(&dir, "many.bin", &bytes);

        let digests = hash_files(&[path.clone()], 64).await.unwrap();

        assert_eq!(digests.len(), (4096 / 64) * PIECE_HASH_SIZE);
        assert_eq!(digests, sequential_digests(&bytes, 64));
    }
}
