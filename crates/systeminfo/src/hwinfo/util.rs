use std::ops::{Deref, DerefMut};
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::{Error, Result};

pub(crate) fn read_usize(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();

    let raw = std::fs::read_to_string(path).map_err(|e| Error::unreadable(e, path))?;
    let raw = raw.trim();

    raw.parse().map_err(|e| Error::unparseable(e, path))
}

pub(crate) fn read_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    let raw = std::fs::read_to_string(path).map_err(|e| Error::unreadable(e, path))?;
    let raw = raw.trim();

    Ok(raw.to_string())
}

/// Like [`read_string`] but treats a blank file as an error. Firmware
/// frequently leaves DMI fields present but empty.
pub(crate) fn read_value(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let value = read_string(path)?;

    if value.is_empty() {
        return Err(Error::empty(path));
    }

    Ok(value)
}

/// Reads a hex encoded id such as `0x10de`, returning it without the prefix.
pub(crate) fn read_hex(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let value = read_value(path)?;
    let digits = value.trim_start_matches("0x");

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::unparseable_text(path));
    }

    Ok(digits.to_ascii_uppercase())
}

pub(crate) fn read_list(path: impl AsRef<Path>) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| Error::unreadable(e, path))?;
    parse_list(&raw, path)
}

fn parse_list(raw: &str, path: &Path) -> Result<Vec<usize>> {
    let raw = raw.trim();
    let mut ret = Vec::new();

    for range in raw.split(',') {
        let mut parts = range.split('-');

        let first: Option<usize> = parts
            .next()
            .map(|text| text.parse())
            .transpose()
            .map_err(|e| Error::unparseable(e, path))?;
        let second: Option<usize> = parts
            .next()
            .map(|text| text.parse())
            .transpose()
            .map_err(|e| Error::unparseable(e, path))?;

        if parts.next().is_some() {
            // The line is invalid, skip it.
            continue;
        }

        match (first, second) {
            (Some(value), None) => ret.push(value),
            (Some(start), Some(stop)) => ret.extend(start..=stop),
            _ => continue,
        }
    }

    Ok(ret)
}

/// Lists the non-hidden directory entries directly beneath `path`, sorted by
/// name so that enumeration order is stable between polls. Fails only if
/// `path` itself cannot be read.
pub(crate) fn list_dir(path: impl AsRef<Path>) -> Result<Vec<DirEntry>> {
    let path = path.as_ref();

    std::fs::read_dir(path).map_err(|e| Error::unreadable(e, path))?;

    let walker = WalkDir::new(path)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter();

    Ok(walker
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .collect())
}

pub(crate) fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Guard which clears the contained string upon drop.
pub(crate) struct ClearGuard<'a>(&'a mut String);

impl<'a> ClearGuard<'a> {
    pub fn new(value: &'a mut String) -> Self {
        Self(value)
    }
}

impl<'a> Drop for ClearGuard<'a> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

impl<'a> Deref for ClearGuard<'a> {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'a> DerefMut for ClearGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::path::Path;

    /// Writes `contents` to `root/relative`, creating parent directories.
    pub fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing() {
        let list = "0-1\r\n";
        assert_eq!(parse_list(list, "/test/case".as_ref()).unwrap(), vec![0, 1]);

        let list = "0,2-4,7\n";
        assert_eq!(
            parse_list(list, "/test/case".as_ref()).unwrap(),
            vec![0, 2, 3, 4, 7]
        );
    }

    #[test]
    fn blank_values_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        fixture::write(dir.path(), "blank", "  \n");
        fixture::write(dir.path(), "value", "ABC123\n");

        let err = read_value(dir.path().join("blank")).unwrap_err();
        assert!(err.is_empty());
        assert_eq!(read_value(dir.path().join("value")).unwrap(), "ABC123");
    }

    #[test]
    fn hex_ids() {
        let dir = tempfile::tempdir().unwrap();
        fixture::write(dir.path(), "vendor", "0x10de\n");
        fixture::write(dir.path(), "junk", "0xzz\n");

        assert_eq!(read_hex(dir.path().join("vendor")).unwrap(), "10DE");
        assert!(read_hex(dir.path().join("junk")).is_err());
    }
}
