//! Capability-based file access for dataset inputs and result outputs.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open an existing file for reading.
///
/// # Errors
///
/// Returns the I/O error raised by opening `path`.
pub fn open_input(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create (or truncate) a file for writing, creating parent directories.
///
/// # Errors
///
/// Returns an I/O error when `path` names no file or when a directory or
/// the file cannot be created.
pub fn create_output(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let (dir, file_name) = parent_dir(path, true)?;
    dir.create(file_name)
}

/// Whether `path` exists and is a regular file.
///
/// # Errors
///
/// Missing files and parents surface as [`io::ErrorKind::NotFound`].
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, file_name) = parent_dir(path, false)?;
    dir.metadata(file_name).map(|meta| meta.is_file())
}

fn parent_dir(path: &Utf8Path, create: bool) -> io::Result<(fs_utf8::Dir, &str)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    if create {
        let (root, relative) = split_root(&parent)?;
        if !matches!(relative.as_str(), "" | ".") {
            root.create_dir_all(&relative)?;
        }
    }
    let dir = fs_utf8::Dir::open_ambient_dir(&parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Split a directory into an ambient root and the relative remainder so that
/// `create_dir_all` never has to traverse an absolute path.
fn split_root(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let (root, relative) = if dir.is_absolute() {
        let root: Utf8PathBuf = dir
            .ancestors()
            .last()
            .map_or_else(|| Utf8PathBuf::from("/"), Utf8Path::to_path_buf);
        let relative = dir
            .strip_prefix(&root)
            .map_err(|_| io::Error::other(format!("cannot strip {root} from {dir}")))?
            .to_path_buf();
        (root, relative)
    } else {
        (Utf8PathBuf::from("."), dir.to_path_buf())
    };
    let handle = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((handle, relative))
}
