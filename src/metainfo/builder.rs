//! Torrent creation: building the metainfo dictionary for local files and
//! hashing their contents into the `pieces` string.
use std::panic::Location;
use std::path::{Path, PathBuf};

use tracing::info;
use ttorrent_bencode::{BMutAccess, BencodeMut};
use ttorrent_clock::clock::Time;
use url::Url;

use super::{hashing, Error, Torrent, DEFAULT_PIECE_LENGTH};
use crate::CurrentClock;

impl Torrent {
    /// Creates a torrent for local files, hashing their contents.
    ///
    /// In single-file mode (`files` is `None`) `parent` is the file itself:
    /// `info.name` is its base name and `info.length` its size. In multi-file
    /// mode `parent` is the directory the torrent is named after and every
    /// file's `info.files` path is its location relative to `parent`.
    ///
    /// `announce` and `announce_list` are both emitted when both are given;
    /// with neither, the torrent is trackerless. Since we created the torrent
    /// from complete local data, the result is a seeder-mode [`Torrent`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hashing`] when reading the input files fails, and
    /// [`Error::FileOutsideParent`] when a file is not under `parent`.
    pub async fn create(
        parent: &Path,
        files: Option<&[PathBuf]>,
        announce: Option<Url>,
        announce_list: Option<Vec<Vec<Url>>>,
        created_by: &str,
    ) -> Result<Torrent, Error> {
        match files {
            None => info!("creating single-file torrent for {}...", parent.display()),
            Some(files) => info!("creating {}-file torrent {}...", files.len(), parent.display()),
        }

        let mut root = BencodeMut::new_dict();

        {
            let root_dict = root.dict_mut().expect("it should access the new dict");

            if let Some(announce) = &announce {
                root_dict.insert(
                    (&b"announce"[..]).into(),
                    BencodeMut::new_bytes(announce.as_str().as_bytes().to_vec().into()),
                );
            }
            if let Some(announce_list) = &announce_list {
                let mut tiers = BencodeMut::new_list();
                {
                    let tiers_list = tiers.list_mut().expect("it should access the new list");
                    for tier in announce_list {
                        let mut tier_values = BencodeMut::new_list();
                        {
                            let tier_list = tier_values.list_mut().expect("it should access the new list");
                            for tracker in tier {
                                tier_list.push(BencodeMut::new_bytes(tracker.as_str().as_bytes().to_vec().into()));
                            }
                        }
                        tiers_list.push(tier_values);
                    }
                }
                root_dict.insert((&b"announce-list"[..]).into(), tiers);
            }

            #[allow(clippy::cast_possible_wrap)]
            root_dict.insert(
                (&b"creation date"[..]).into(),
                BencodeMut::new_int(CurrentClock::now().as_secs() as i64),
            );
            root_dict.insert(
                (&b"created by"[..]).into(),
                BencodeMut::new_bytes(created_by.as_bytes().to_vec().into()),
            );

            let info = build_info_dict(parent, files).await?;
            root_dict.insert((&b"info"[..]).into(), info);
        }

        Torrent::parse(&root.encode(), true)
    }
}

async fn build_info_dict(parent: &Path, files: Option<&[PathBuf]>) -> Result<BencodeMut<'static>, Error> {
    let name = parent
        .file_name()
        .ok_or(Error::InvalidField {
            field: "name",
            location: Location::caller(),
        })?
        .to_string_lossy()
        .into_owned();

    let mut info = BencodeMut::new_dict();

    {
        let info_dict = info.dict_mut().expect("it should access the new dict");

        info_dict.insert((&b"name"[..]).into(), BencodeMut::new_bytes(name.into_bytes().into()));

        #[allow(clippy::cast_possible_wrap)]
        info_dict.insert((&b"piece length"[..]).into(), BencodeMut::new_int(DEFAULT_PIECE_LENGTH as i64));

        match files {
            None => {
                let size = tokio::fs::metadata(parent).await?.len();

                #[allow(clippy::cast_possible_wrap)]
                info_dict.insert((&b"length"[..]).into(), BencodeMut::new_int(size as i64));

                let piece_length = usize::try_from(DEFAULT_PIECE_LENGTH).expect("piece length fits a usize");
                let pieces = hashing::hash_files(&[parent.to_path_buf()], piece_length).await?;
                info_dict.insert((&b"pieces"[..]).into(), BencodeMut::new_bytes(pieces.into()));
            }
            Some(files) => {
                let mut file_entries = BencodeMut::new_list();
                {
                    let file_list = file_entries.list_mut().expect("it should access the new list");

                    for file in files {
                        let size = tokio::fs::metadata(file).await?.len();

                        let mut entry = BencodeMut::new_dict();
                        {
                            let entry_dict = entry.dict_mut().expect("it should access the new dict");

                            #[allow(clippy::cast_possible_wrap)]
                            entry_dict.insert((&b"length"[..]).into(), BencodeMut::new_int(size as i64));

                            let mut components = BencodeMut::new_list();
                            {
                                let component_list = components.list_mut().expect("it should access the new list");
                                for component in relative_components(file, parent)? {
                                    component_list.push(BencodeMut::new_bytes(component.into_bytes().into()));
                                }
                            }
                            entry_dict.insert((&b"path"[..]).into(), components);
                        }

                        file_list.push(entry);
                    }
                }
                info_dict.insert((&b"files"[..]).into(), file_entries);

                let piece_length = usize::try_from(DEFAULT_PIECE_LENGTH).expect("piece length fits a usize");
                let pieces = hashing::hash_files(files, piece_length).await?;
                info_dict.insert((&b"pieces"[..]).into(), BencodeMut::new_bytes(pieces.into()));
            }
        }
    }

    Ok(info)
}

/// The path components of `file` relative to `parent`, as they go into the
/// canonical `path` list of a file entry.
fn relative_components(file: &Path, parent: &Path) -> Result<Vec<String>, Error> {
    let relative = file.strip_prefix(parent).map_err(|_| Error::FileOutsideParent {
        path: file.to_path_buf(),
        location: Location::caller(),
    })?;

    Ok(relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use url::Url;

    use crate::metainfo::{Error, Torrent, DEFAULT_PIECE_LENGTH, PIECE_HASH_SIZE};

    fn announce_url() -> Url {
        Url::parse("http://localhost:6969/announce").unwrap()
    }

    fn write_file(dir: &std::path::Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn it_should_create_a_seeder_mode_single_file_torrent() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "file1.bin", &[42u8; 1000]);

        let torrent = Torrent::create(&source, None, Some(announce_url()), None, "Test").await.unwrap();

        assert!(torrent.is_seeder());
        assert!(!torrent.is_multifile());
        assert_eq!(torrent.name(), "file1.bin");
        assert_eq!(torrent.size(), 1000);
        assert_eq!(torrent.piece_length(), DEFAULT_PIECE_LENGTH);
        assert_eq!(torrent.piece_count(), 1);
        assert_eq!(torrent.created_by(), Some("Test"));
        assert_eq!(torrent.announce_list()[0][0], announce_url());
    }

    #[tokio::test]
    async fn it_should_create_a_multi_file_torrent_with_paths_relative_to_the_parent() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("bundle");
        std::fs::create_dir_all(parent.join("sub")).unwrap();
        let file_1 = write_file(&parent, "one.bin", &[1u8; 10]);
        let file_2 = write_file(&parent.join("sub"), "two.bin", &[2u8; 20]);

        let torrent = Torrent::create(&parent, Some(&[file_1, file_2]), Some(announce_url()), None, "Test")
            .await
            .unwrap();

        assert!(torrent.is_multifile());
        assert_eq!(torrent.name(), "bundle");
        assert_eq!(torrent.size(), 30);
        assert_eq!(torrent.files()[0].path, std::path::Path::new("bundle").join("one.bin"));
        assert_eq!(torrent.files()[1].path, std::path::Path::new("bundle").join("sub").join("two.bin"));
    }

    #[tokio::test]
    async fn the_pieces_length_should_match_the_piece_count_invariant() {
        let dir = tempfile::tempdir().unwrap();
        // Just above one piece so we get ceil(size / piece_length) = 2.
        let size = usize::try_from(DEFAULT_PIECE_LENGTH).unwrap() + 1;
        let source = write_file(dir.path(), "file1.bin", &vec![7u8; size]);

        let torrent = Torrent::create(&source, None, Some(announce_url()), None, "Test").await.unwrap();

        assert_eq!(torrent.pieces().len(), 2 * PIECE_HASH_SIZE);
    }

    #[tokio::test]
    async fn it_should_emit_both_announce_forms_when_both_are_supplied() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "file1.bin", b"data");
        let secondary = Url::parse("http://backup.test/announce").unwrap();

        let torrent = Torrent::create(
            &source,
            None,
            Some(announce_url()),
            Some(vec![vec![announce_url()], vec![secondary.clone()]]),
            "Test",
        )
        .await
        .unwrap();

        // The parsed view reads the tiers; the single announce is also in the
        // blob for clients that predate the multitracker extension.
        assert_eq!(torrent.announce_list().len(), 2);
        assert_eq!(torrent.announce_list()[1][0], secondary);
        assert!(String::from_utf8_lossy(torrent.encoded()).contains("8:announce30:"));
    }

    #[tokio::test]
    async fn it_should_create_a_trackerless_torrent_when_no_announce_is_supplied() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "file1.bin", b"data");

        let torrent = Torrent::create(&source, None, None, None, "Test").await.unwrap();

        assert!(torrent.is_trackerless());
    }

    #[tokio::test]
    async fn a_file_outside_the_parent_directory_should_be_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("bundle");
        std::fs::create_dir_all(&parent).unwrap();
        let stray = write_file(dir.path(), "stray.bin", b"data");

        let result = Torrent::create(&parent, Some(&[stray]), Some(announce_url()), None, "Test").await;

        assert!(matches!(result, Err(Error::FileOutsideParent { .. })));
    }
}
