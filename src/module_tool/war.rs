use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use tracing::debug;
use zip::{result::ZipError, write::SimpleFileOptions, ZipArchive, ZipWriter};

/// A web application archive, either unpacked on disk or a zip file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarFile {
    Exploded(PathBuf),
    Archive(PathBuf),
}

impl WarFile {
    /// Opens the WAR at `path`, which must exist.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(Self::Exploded(path.to_path_buf()))
        } else if path.is_file() {
            Ok(Self::Archive(path.to_path_buf()))
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no WAR at `{}`", path.display()),
            ))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Exploded(path) | Self::Archive(path) => path,
        }
    }

    /// Contents of the entry `name` (`/`-separated), `None` if missing.
    pub fn read_entry(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        match self {
            Self::Exploded(root) => match fs::read(root.join(name)) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err),
            },
            Self::Archive(path) => {
                let mut archive = ZipArchive::new(File::open(path)?).map_err(io::Error::other)?;
                let mut entry = match archive.by_name(name) {
                    Ok(entry) => entry,
                    Err(ZipError::FileNotFound) => return Ok(None),
                    Err(err) => return Err(io::Error::other(err)),
                };
                let mut bytes = Vec::new();
                let _ = entry.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
        }
    }

    /// Writes the entry `name`, replacing an existing one.
    pub fn write_entry(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        match self {
            Self::Exploded(root) => {
                let path = root.join(name);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, bytes)
            }
            Self::Archive(path) => Self::rewrite_archive(path, name, bytes),
        }
    }

    /// Copies every other entry into a sibling file, then swaps it in.
    fn rewrite_archive(path: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let result = (|| -> Result<(), ZipError> {
            let mut archive = ZipArchive::new(File::open(path)?)?;
            let mut writer = ZipWriter::new(File::create(&tmp_path)?);

            for index in 0..archive.len() {
                let entry = archive.by_index_raw(index)?;
                if entry.name() == name {
                    continue;
                }
                writer.raw_copy_file(entry)?;
            }

            writer.start_file(name, SimpleFileOptions::default())?;
            writer.write_all(bytes)?;
            let _ = writer.finish()?;
            Ok(())
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(io::Error::other(err));
        }

        debug!(war = %path.display(), entry = name, "rewrote archive");
        fs::rename(&tmp_path, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn zip_with(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let _ = writer.finish().unwrap();
    }

    #[test]
    fn test_open_detects_layout_passes() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("app.war");
        zip_with(&archive, &[("index.jsp", "hello")]);

        assert_eq!(
            WarFile::open(dir.path()).unwrap(),
            WarFile::Exploded(dir.path().to_path_buf())
        );
        assert_eq!(WarFile::open(&archive).unwrap(), WarFile::Archive(archive));
        assert!(WarFile::open(dir.path().join("missing.war")).is_err());
    }

    #[test]
    fn test_exploded_entries_passes() {
        let dir = tempfile::tempdir().unwrap();
        let war = WarFile::open(dir.path()).unwrap();

        assert_eq!(war.read_entry("WEB-INF/web.xml").unwrap(), None);
        war.write_entry("WEB-INF/classes/a.txt", b"abc").unwrap();
        assert_eq!(
            war.read_entry("WEB-INF/classes/a.txt").unwrap(),
            Some(b"abc".to_vec())
        );
    }

    #[test]
    fn test_archive_entries_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.war");
        zip_with(&path, &[("index.jsp", "hello"), ("WEB-INF/a.txt", "old")]);
        let war = WarFile::open(&path).unwrap();

        assert_eq!(war.read_entry("missing").unwrap(), None);
        assert_eq!(
            war.read_entry("WEB-INF/a.txt").unwrap(),
            Some(b"old".to_vec())
        );

        war.write_entry("WEB-INF/a.txt", b"new").unwrap();
        war.write_entry("WEB-INF/b.txt", b"added").unwrap();

        assert_eq!(
            war.read_entry("WEB-INF/a.txt").unwrap(),
            Some(b"new".to_vec())
        );
        assert_eq!(
            war.read_entry("WEB-INF/b.txt").unwrap(),
            Some(b"added".to_vec())
        );
        assert_eq!(
            war.read_entry("index.jsp").unwrap(),
            Some(b"hello".to_vec())
        );
        assert!(!dir.path().join("app.war.tmp").exists());
    }
}
