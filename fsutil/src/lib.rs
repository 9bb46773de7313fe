use serde::de::DeserializeOwned;
use std::{
    fs::{self, File, OpenOptions, ReadDir},
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
    time::SystemTime,
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("File already exists: {0}")]
        AlreadyExists(PathBuf),

        #[error("No entry matched glob '{0}' in '{1}'")]
        NoEntryMatchedGlob(::glob::Pattern, PathBuf),

        #[error("Cannot find '{0}' in '{1}' or any of its parent dirs")]
        NotFoundInAncestors(String, PathBuf),

        #[error("Cannot deserialize from JSON (src='{0}'): {1}")]
        DeserializeFromJson(PathBuf, #[source] serde_json::Error),
    }
}
pub use error::{Error, Result};

pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        self::mkdir_all(dir)?;
    }
    self::write(filepath, contents)
}

/// Like [`write_with_mkdir`] but refuses to replace an existing file.
pub fn create_new_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    let filepath = filepath.as_ref();
    if let Some(dir) = filepath.parent() {
        self::mkdir_all(dir)?;
    }
    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(filepath)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(filepath.to_owned()),
            _ => Error::SingleIO("Cannot create file", filepath.to_owned(), e),
        })?;
    f.write_all(contents.as_ref())
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.to_owned(), e))
}

pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

pub fn read_json_with_deserialize<P, T>(filepath: P) -> Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let filepath = filepath.as_ref();
    let f = File::open(filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.to_owned(), e))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| Error::DeserializeFromJson(filepath.to_owned(), e))
}

pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

/// Looks for `filename` in `start_dir` and then in each of its ancestors.
pub fn find_file_in_ancestors(start_dir: impl AsRef<Path>, filename: &str) -> Result<PathBuf> {
    let start_dir = start_dir.as_ref();
    start_dir
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|path| path.is_file())
        .ok_or_else(|| Error::NotFoundInAncestors(filename.to_owned(), start_dir.to_owned()))
}

pub fn find_most_recently_modified_file(
    dir: impl AsRef<Path>,
    filename_pattern: &::glob::Pattern,
) -> Result<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    for entry in self::read_dir(&dir)?.filter_map(std::result::Result::ok) {
        let file_type = entry.file_type();
        let modified = entry.metadata().and_then(|info| info.modified());
        let (Ok(file_type), Ok(modified)) = (file_type, modified) else {
            continue;
        };
        if file_type.is_dir() || !filename_pattern.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }
        if latest.as_ref().map_or(true, |(t, _)| *t < modified) {
            latest = Some((modified, entry.path()));
        }
    }
    latest.map(|(_, path)| path).ok_or_else(|| {
        Error::NoEntryMatchedGlob(filename_pattern.to_owned(), dir.as_ref().to_owned())
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fsutil-test-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        mkdir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn create_new_does_not_overwrite() {
        let dir = scratch_dir("create-new");
        let file = dir.join("a/b/config.toml");

        create_new_with_mkdir(&file, "first").unwrap();
        assert!(matches!(
            create_new_with_mkdir(&file, "second"),
            Err(Error::AlreadyExists(_))
        ));
        assert_eq!(read_to_string(&file).unwrap(), "first");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn find_in_ancestors() {
        let dir = scratch_dir("ancestors");
        let nested = dir.join("x/y/z");
        mkdir_all(&nested).unwrap();
        write(dir.join("x/marker.toml"), "").unwrap();

        assert_eq!(
            find_file_in_ancestors(&nested, "marker.toml").unwrap(),
            dir.join("x/marker.toml")
        );
        assert!(matches!(
            find_file_in_ancestors(&nested, "no-such-file.toml"),
            Err(Error::NotFoundInAncestors(..))
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn most_recently_modified() {
        let dir = scratch_dir("recent");
        let pat = ::glob::Pattern::new("solution.*").unwrap();
        assert!(matches!(
            find_most_recently_modified_file(&dir, &pat),
            Err(Error::NoEntryMatchedGlob(..))
        ));

        write(dir.join("solution.py"), "").unwrap();
        write(dir.join("notes.txt"), "").unwrap();
        mkdir_all(dir.join("solution.d")).unwrap();
        assert_eq!(
            find_most_recently_modified_file(&dir, &pat).unwrap(),
            dir.join("solution.py")
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
