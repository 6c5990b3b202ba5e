// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Filesystem-related utility functions.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Modify the file at `path` through a temporary copy.
///
/// The file is copied to a temporary file in the same directory, `modify` is called with the
/// temporary path and, if it succeeds, the temporary file replaces the original file. If
/// `modify` fails, the original file is left untouched.
pub fn modify_through_copy<F>(path: &Path, modify: F) -> crate::Result<()>
where
    F: FnOnce(&Path) -> crate::Result<()>,
{
    let filename = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or(io::Error::other("cannot determine file name"))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let suffix = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut temp_file = tempfile::Builder::new()
        .prefix(format!(".tagreader.{filename}.").as_str())
        .suffix(suffix.as_str())
        .tempfile_in(dir)?;
    let mut source_file = fs::File::open(path)?;
    let _ = io::copy(&mut source_file, &mut temp_file)?;
    drop(source_file);
    fs::set_permissions(temp_file.path(), fs::metadata(path)?.permissions())?;

    let temp_path = temp_file.into_temp_path();
    let modified_path: &Path = &temp_path;
    modify(modified_path)?;

    // Only replace the original file when modifying the copy succeeded.
    temp_path.persist(path).map_err(|err| err.error)?;
    log::debug!("Replaced {} with modified copy", path.display());

    Ok(())
}

/// Set the modification time of the file to the current time.
pub fn touch(path: &Path) -> io::Result<()> {
    let file = fs::File::options().write(true).open(path)?;
    file.set_modified(SystemTime::now())?;
    log::debug!("Updated modification time of {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;

    #[test]
    fn test_modify_through_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        fs::write(&path, b"original").unwrap();

        modify_through_copy(&path, |temp_path| {
            assert_ne!(temp_path, path.as_path());
            assert_eq!(fs::read(temp_path).unwrap(), b"original");
            fs::write(temp_path, b"modified")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"modified");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_modify_through_copy_keeps_original_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        fs::write(&path, b"original").unwrap();

        let result = modify_through_copy(&path, |temp_path| {
            fs::write(temp_path, b"garbage")?;
            Err(ErrorType::UnknownFileType)
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_touch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        fs::write(&path, b"data").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH).unwrap();
        drop(file);

        touch(&path).unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(modified > SystemTime::UNIX_EPOCH);
    }
}
