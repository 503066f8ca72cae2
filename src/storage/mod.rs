//! Torrent byte-data storage, as consumed by downloading clients.
//!
//! The piece-exchange client lives outside this crate; it only needs a thin
//! random-access surface over the torrent's byte data. [`FileStorage`] is the
//! single-file implementation: while a download is in progress the bytes live
//! in a partial file next to the target (the target path plus
//! [`PARTIAL_FILE_NAME_SUFFIX`]), and [`TorrentByteStorage::finish`] swaps
//! the completed partial file over the target.
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Suffix of the partial file a download writes to until it is finished.
pub const PARTIAL_FILE_NAME_SUFFIX: &str = ".!pc";

/// Errors from the storage layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A read returned fewer bytes than requested.
    #[error("storage underrun: {got} of {requested} byte(s) at offset {offset}")]
    Underrun { offset: u64, requested: usize, got: usize },

    /// A read or write would cross the end of the storage.
    #[error("invalid storage request: {requested} byte(s) at offset {offset} exceeds size {size}")]
    OutOfRange { offset: u64, requested: usize, size: u64 },
}

/// Random-access byte storage for one torrent file.
pub trait TorrentByteStorage {
    /// Reads exactly `buf.len()` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when the request crosses the end of the storage,
    /// [`Error::Underrun`] when fewer bytes than requested are available.
    fn read(&self, buf: &mut [u8], offset: u64) -> Result<(), Error>;

    /// Writes `buf` at `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when the request crosses the end of the storage.
    fn write(&mut self, buf: &[u8], offset: u64) -> Result<(), Error>;

    /// Total size of the stored data in bytes.
    fn size(&self) -> u64;

    /// Flushes and closes the storage.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when syncing the file fails.
    fn close(&mut self) -> Result<(), Error>;

    /// Marks the download complete: the partial file replaces the target.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the file cannot be moved into place.
    fn finish(&mut self) -> Result<(), Error>;

    /// Whether the storage is backed by the finished target file.
    fn is_finished(&self) -> bool;
}

/// Single-file storage backed by a partial file until finished.
pub struct FileStorage {
    target: PathBuf,
    partial: PathBuf,
    current: PathBuf,
    file: File,
    size: u64,
}

impl FileStorage {
    /// Opens (or creates) storage for `target` with the given total size.
    ///
    /// A pre-existing partial file is resumed; a pre-existing target is used
    /// as already-finished storage; otherwise a fresh partial file is
    /// started. The backing file is always extended or truncated to `size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the backing file cannot be opened or sized.
    pub fn open(target: &Path, size: u64) -> Result<FileStorage, Error> {
        let partial = partial_path(target);

        let current = if partial.exists() {
            debug!("partial download found at {}, continuing", partial.display());
            partial.clone()
        } else if !target.exists() {
            debug!("downloading new file to {}", partial.display());
            partial.clone()
        } else {
            debug!("using existing file {}", target.display());
            target.to_path_buf()
        };

        let file = OpenOptions::new().read(true).write(true).create(true).open(&current)?;
        file.set_len(size)?;

        info!("initialized byte storage file at {} ({} byte(s))", current.display(), size);

        Ok(FileStorage {
            target: target.to_path_buf(),
            partial,
            current,
            file,
            size,
        })
    }
}

impl TorrentByteStorage for FileStorage {
    fn read(&self, buf: &mut [u8], offset: u64) -> Result<(), Error> {
        self.validate_range(buf.len(), offset)?;

        let got = self.file.read_at(buf, offset)?;
        if got < buf.len() {
            return Err(Error::Underrun {
                offset,
                requested: buf.len(),
                got,
            });
        }

        Ok(())
    }

    fn write(&mut self, buf: &[u8], offset: u64) -> Result<(), Error> {
        self.validate_range(buf.len(), offset)?;

        self.file.write_all_at(buf, offset)?;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn close(&mut self) -> Result<(), Error> {
        debug!("closing byte storage at {}", self.current.display());
        self.file.sync_all()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.file.sync_all()?;

        if self.is_finished() {
            return Ok(());
        }

        // Delete-then-rename swap of the partial file over the target.
        if self.target.exists() {
            std::fs::remove_file(&self.target)?;
        }
        std::fs::rename(&self.current, &self.target)?;

        self.file = OpenOptions::new().read(true).write(true).open(&self.target)?;
        self.file.set_len(self.size)?;
        self.current.clone_from(&self.target);

        info!("moved torrent data from {} to {}", self.partial.display(), self.target.display());

        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.current == self.target
    }
}

impl FileStorage {
    fn validate_range(&self, requested: usize, offset: u64) -> Result<(), Error> {
        let end = offset.checked_add(requested as u64);

        match end {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::OutOfRange {
                offset,
                requested,
                size: self.size,
            }),
        }
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut path = target.as_os_str().to_owned();
    path.push(PARTIAL_FILE_NAME_SUFFIX);
    PathBuf::from(path)
}
