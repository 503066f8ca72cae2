//! The torrent metainfo engine.
//!
//! A [`Torrent`] is the in-memory representation of a `.torrent` metainfo
//! blob. It can be built from existing bytes ([`Torrent::parse`] /
//! [`Torrent::load`]) or created from local files
//! ([`Torrent::create`](builder), which runs the parallel piece-hashing
//! pipeline in [`hashing`]).
//!
//! The info-hash is derived from the raw bytes of the `info` substructure as
//! they appeared in the decoded input, never from a re-encoding. Since the
//! full original blob is kept as well, loading and re-saving a torrent is
//! byte-exact and the info-hash is stable across round trips.
pub mod builder;
pub mod hashing;

use std::collections::HashSet;
use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error;
use ttorrent_bencode::{BDecodeOpt, BDictAccess, BRefAccess, BencodeRef};
use ttorrent_primitives::info_hash::InfoHash;
use url::Url;

/// Piece length used when creating torrents: 512 KiB.
pub const DEFAULT_PIECE_LENGTH: u64 = 512 * 1024;

/// Size of one SHA-1 piece digest in the `pieces` byte string.
pub const PIECE_HASH_SIZE: usize = 20;

/// Errors building a [`Torrent`].
#[derive(Error, Debug)]
pub enum Error {
    /// The bytes are not structurally valid bencode.
    #[error("malformed bencode: {0}")]
    MalformedBencode(#[from] ttorrent_bencode::Error),

    /// The bencode is valid but the metainfo schema is violated.
    #[error("malformed metainfo: missing field '{field}' in {location}")]
    MissingField {
        field: &'static str,
        location: &'static Location<'static>,
    },

    #[error("malformed metainfo: field '{field}' has the wrong type in {location}")]
    WrongFieldType {
        field: &'static str,
        location: &'static Location<'static>,
    },

    #[error("malformed metainfo: invalid value for field '{field}' in {location}")]
    InvalidField {
        field: &'static str,
        location: &'static Location<'static>,
    },

    /// A file entry in a multi-file torrent has no path components.
    #[error("malformed metainfo: a file entry has an empty path in {location}")]
    EmptyFilePath { location: &'static Location<'static> },

    /// A file handed to the creator is not under the torrent's parent
    /// directory, so no relative path can be derived for it.
    #[error("file {path} is not under the torrent parent directory in {location}")]
    FileOutsideParent {
        path: PathBuf,
        location: &'static Location<'static>,
    },

    /// An announce URI failed strict parsing.
    #[error("unsupported announce uri '{uri}': {source}")]
    UnsupportedUri { uri: String, source: url::ParseError },

    /// I/O failure in the piece-hashing pipeline.
    #[error(transparent)]
    Hashing(#[from] hashing::Error),

    /// I/O failure reading or writing a `.torrent` file.
    #[error("torrent file i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// One file described by a torrent, with its path relative to the download
/// root (platform separators) and its size in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TorrentFile {
    pub path: PathBuf,
    pub size: u64,
}

/// A torrent's metainfo.
///
/// Effectively immutable after construction; the info-hash never changes for
/// a given `Torrent`.
#[derive(Clone, Debug)]
pub struct Torrent {
    encoded: Vec<u8>,
    encoded_info: Vec<u8>,
    info_hash: InfoHash,
    trackers: Vec<Vec<Url>>,
    tracker_count: usize,
    creation_date: Option<i64>,
    comment: Option<String>,
    created_by: Option<String>,
    name: String,
    piece_length: u64,
    pieces: Vec<u8>,
    files: Vec<TorrentFile>,
    size: u64,
    seeder: bool,
}

impl Torrent {
    /// Parses metainfo bytes.
    ///
    /// `seeder` records whether we hold the complete data for this torrent
    /// (torrents we create are seeded by us; loaded ones usually are not).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBencode`] for structurally invalid bytes, a
    /// schema error for valid bencode that is not a metainfo dictionary, and
    /// [`Error::UnsupportedUri`] when an announce URI does not parse.
    pub fn parse(bytes: &[u8], seeder: bool) -> Result<Torrent, Error> {
        let bencode = BencodeRef::decode(bytes, BDecodeOpt::default())?;

        let root = bencode.dict().ok_or(Error::WrongFieldType {
            field: "(root)",
            location: Location::caller(),
        })?;

        let info = lookup(root, "info")?;
        let encoded_info = info.buffer().to_vec();
        let info_hash = InfoHash(hashing::sha1(&encoded_info));

        let info = info.dict().ok_or(Error::WrongFieldType {
            field: "info",
            location: Location::caller(),
        })?;

        let (trackers, tracker_count) = parse_announce_tiers(root)?;

        let creation_date = optional_int(root, "creation date")?;
        let comment = optional_text(root, "comment")?;
        let created_by = optional_text(root, "created by")?;

        let name = latin1_to_string(bytes_field(info, "name")?);
        let piece_length = int_field(info, "piece length")?;
        let piece_length = u64::try_from(piece_length).map_err(|_| Error::InvalidField {
            field: "piece length",
            location: Location::caller(),
        })?;
        let pieces = bytes_field(info, "pieces")?.to_vec();

        let files = parse_files(info, &name)?;
        let size = files.iter().map(|file| file.size).sum();

        Ok(Torrent {
            encoded: bytes.to_vec(),
            encoded_info,
            info_hash,
            trackers,
            tracker_count,
            creation_date,
            comment,
            created_by,
            name,
            piece_length,
            pieces,
            files,
            size,
            seeder,
        })
    }

    /// Loads a torrent from a `.torrent` file, assuming we are not a seeder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, otherwise as
    /// [`Torrent::parse`].
    pub fn load(path: &Path) -> Result<Torrent, Error> {
        let bytes = std::fs::read(path)?;
        Torrent::parse(&bytes, false)
    }

    /// Writes the metainfo blob to a `.torrent` file, byte-exact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, &self.encoded)?;
        Ok(())
    }

    /// The torrent's name: the file name for single-file torrents, the
    /// top-level directory for multi-file ones.
    #[must_use]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    /// Total size in bytes of all files described by this torrent.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The 20-byte SHA-1 of the `info` substructure.
    #[must_use]
    pub fn info_hash(&self) -> InfoHash {
        self.info_hash
    }

    /// The info-hash as an uppercase 40-character hex string.
    #[must_use]
    pub fn info_hash_hex(&self) -> String {
        self.info_hash.to_hex_string()
    }

    /// Announce tiers, in the order the operator supplied them.
    #[must_use]
    pub fn announce_list(&self) -> &Vec<Vec<Url>> {
        &self.trackers
    }

    /// Number of distinct tracker URIs across all tiers.
    #[must_use]
    pub fn tracker_count(&self) -> usize {
        self.tracker_count
    }

    /// A torrent with no announce tiers at all is "trackerless".
    #[must_use]
    pub fn is_trackerless(&self) -> bool {
        self.trackers.is_empty()
    }

    /// The files described by this torrent, paths relative to the download
    /// root.
    #[must_use]
    pub fn files(&self) -> &Vec<TorrentFile> {
        &self.files
    }

    #[must_use]
    pub fn is_multifile(&self) -> bool {
        self.files.len() > 1
    }

    /// Whether we hold the complete data for this torrent.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.seeder
    }

    /// The full metainfo blob, as read or created.
    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// The raw bytes of the `info` substructure the info-hash is derived
    /// from.
    #[must_use]
    pub fn encoded_info(&self) -> &[u8] {
        &self.encoded_info
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// Creation time in Unix seconds, when present.
    #[must_use]
    pub fn creation_date(&self) -> Option<i64> {
        self.creation_date
    }

    #[must_use]
    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    /// Concatenated 20-byte SHA-1 piece digests, in file order.
    #[must_use]
    pub fn pieces(&self) -> &[u8] {
        &self.pieces
    }

    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_HASH_SIZE
    }
}

/// Decodes an ISO-8859-1 byte string: every byte is its own code point.
#[must_use]
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

fn lookup<'a, 'b>(
    dict: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>,
    field: &'static str,
) -> Result<&'b BencodeRef<'a>, Error> {
    dict.lookup(field.as_bytes()).ok_or(Error::MissingField {
        field,
        location: Location::caller(),
    })
}

fn bytes_field<'a, 'b>(dict: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>, field: &'static str) -> Result<&'b [u8], Error> {
    lookup(dict, field)?.bytes().ok_or(Error::WrongFieldType {
        field,
        location: Location::caller(),
    })
}

fn int_field<'a, 'b>(dict: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>, field: &'static str) -> Result<i64, Error> {
    lookup(dict, field)?.int().ok_or(Error::WrongFieldType {
        field,
        location: Location::caller(),
    })
}

fn optional_int<'a, 'b>(dict: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>, field: &'static str) -> Result<Option<i64>, Error> {
    match dict.lookup(field.as_bytes()) {
        None => Ok(None),
        Some(value) => value.int().map(Some).ok_or(Error::WrongFieldType {
            field,
            location: Location::caller(),
        }),
    }
}

fn optional_text<'a, 'b>(
    dict: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>,
    field: &'static str,
) -> Result<Option<String>, Error> {
    match dict.lookup(field.as_bytes()) {
        None => Ok(None),
        Some(value) => value.bytes().map(|bytes| Some(latin1_to_string(bytes))).ok_or(Error::WrongFieldType {
            field,
            location: Location::caller(),
        }),
    }
}

/// Parses `announce-list` (tiers, per the multitracker metadata extension) or
/// the single `announce` field.
///
/// If the torrent defines an `announce-list`, `announce` is ignored and the
/// tiers are read in order, dropping URIs already seen in an earlier tier and
/// skipping tiers that end up empty. Otherwise the mandatory `announce` field
/// becomes a single single-URI tier. A torrent with neither is trackerless.
fn parse_announce_tiers<'a, 'b>(root: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>) -> Result<(Vec<Vec<Url>>, usize), Error> {
    let mut trackers: Vec<Vec<Url>> = Vec::new();
    let mut all_trackers: HashSet<Url> = HashSet::new();

    if let Some(announce_list) = root.lookup(b"announce-list") {
        let tiers = announce_list.list().ok_or(Error::WrongFieldType {
            field: "announce-list",
            location: Location::caller(),
        })?;

        for tier_value in tiers {
            let tier_uris = tier_value.list().ok_or(Error::WrongFieldType {
                field: "announce-list",
                location: Location::caller(),
            })?;

            let mut tier: Vec<Url> = Vec::new();
            for uri_value in tier_uris {
                let uri_bytes = uri_value.bytes().ok_or(Error::WrongFieldType {
                    field: "announce-list",
                    location: Location::caller(),
                })?;
                let uri = parse_tracker_uri(&latin1_to_string(uri_bytes))?;

                if !all_trackers.contains(&uri) {
                    all_trackers.insert(uri.clone());
                    tier.push(uri);
                }
            }

            if !tier.is_empty() {
                trackers.push(tier);
            }
        }
    } else if let Some(announce) = root.lookup(b"announce") {
        let uri_bytes = announce.bytes().ok_or(Error::WrongFieldType {
            field: "announce",
            location: Location::caller(),
        })?;
        let uri = parse_tracker_uri(&latin1_to_string(uri_bytes))?;

        all_trackers.insert(uri.clone());
        trackers.push(vec![uri]);
    }

    Ok((trackers, all_trackers.len()))
}

fn parse_tracker_uri(uri: &str) -> Result<Url, Error> {
    Url::parse(uri).map_err(|source| Error::UnsupportedUri {
        uri: uri.to_owned(),
        source,
    })
}

/// Parses the file list: `info.files` for multi-file torrents, the
/// `info.length`/`info.name` pair for single-file ones.
fn parse_files<'a, 'b>(info: &'b dyn BDictAccess<&'a [u8], BencodeRef<'a>>, name: &str) -> Result<Vec<TorrentFile>, Error> {
    let mut files = Vec::new();

    if let Some(file_list) = info.lookup(b"files") {
        let file_list = file_list.list().ok_or(Error::WrongFieldType {
            field: "files",
            location: Location::caller(),
        })?;

        for file_value in file_list {
            let file_dict = file_value.dict().ok_or(Error::WrongFieldType {
                field: "files",
                location: Location::caller(),
            })?;

            let length = int_field(file_dict, "length")?;
            let size = u64::try_from(length).map_err(|_| Error::InvalidField {
                field: "length",
                location: Location::caller(),
            })?;

            let components = lookup(file_dict, "path")?.list().ok_or(Error::WrongFieldType {
                field: "path",
                location: Location::caller(),
            })?;

            if components.is_empty() {
                return Err(Error::EmptyFilePath {
                    location: Location::caller(),
                });
            }

            let mut path = PathBuf::from(name);
            for component in components {
                let component_bytes = component.bytes().ok_or(Error::WrongFieldType {
                    field: "path",
                    location: Location::caller(),
                })?;
                path.push(latin1_to_string(component_bytes));
            }

            files.push(TorrentFile { path, size });
        }
    } else {
        let length = int_field(info, "length")?;
        let size = u64::try_from(length).map_err(|_| Error::InvalidField {
            field: "length",
            location: Location::caller(),
        })?;

        files.push(TorrentFile {
            path: PathBuf::from(name),
            size,
        });
    }

    Ok(files)
}

pub mod fixture {
    //! Prebuilt metainfo blobs for tests.
    use ttorrent_bencode::{ben_bytes, ben_int, ben_map};

    /// A minimal valid single-file torrent blob.
    #[must_use]
    pub fn sample_torrent_bytes() -> Vec<u8> {
        (ben_map! {
            "announce" => ben_bytes!("http://localhost:6969/announce"),
            "created by" => ben_bytes!("ttorrent tests"),
            "info" => ben_map! {
                "length" => ben_int!(16),
                "name" => ben_bytes!("fixture.bin"),
                "piece length" => ben_int!(16),
                "pieces" => ben_bytes!(vec![0xAB_u8; 20])
            }
        })
        .encode()
    }
}
