//! Enumerates the files whose bytes make up a torrent's piece stream.
//!
//! A single file is hashed on its own. A directory is walked recursively,
//! every regular file is collected, and the list is sorted by relative path
//! so that the virtual concatenation (and with it every piece hash) does not
//! depend on the order the filesystem returns entries in.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::error::MetainfoError;

/// A file inside a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Size of the file in bytes.
    pub length: u64,
    /// Path segments relative to the torrent root.
    pub path: Vec<String>,
}

/// A file on disk together with its position in the torrent.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Location of the file on disk.
    pub disk_path: PathBuf,
    pub entry: FileEntry,
}

/// Whether the torrent describes one file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    SingleFile,
    Directory,
}

/// The result of walking an input path.
#[derive(Debug, Clone)]
pub struct Content {
    root: PathBuf,
    kind: ContentKind,
    files: Vec<SourceFile>,
    total_length: u64,
}

impl Content {
    /// Walks `path`, which must be a regular file or a directory.
    ///
    /// # Errors
    ///
    /// - [`MetainfoError::PathNotFound`] if `path` does not exist
    /// - [`MetainfoError::EmptyContent`] if there are no bytes to hash
    /// - [`MetainfoError::NonUtf8Path`] for names that cannot go into a torrent
    /// - [`MetainfoError::Io`] if a directory or file cannot be inspected
    pub fn walk(path: impl AsRef<Path>) -> Result<Self, MetainfoError> {
        let root = path.as_ref().to_path_buf();
        let metadata = match fs::metadata(&root) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetainfoError::PathNotFound(root));
            }
            Err(e) => return Err(MetainfoError::io(root, e)),
        };

        let (kind, files) = if metadata.is_file() {
            let name = file_name(&root)?;
            let file = SourceFile {
                disk_path: root.clone(),
                entry: FileEntry {
                    length: metadata.len(),
                    path: vec![name],
                },
            };
            (ContentKind::SingleFile, vec![file])
        } else if metadata.is_dir() {
            let mut files = Vec::new();
            collect_files(&root, &mut Vec::new(), &mut files)?;
            files.sort_by(|a, b| a.entry.path.cmp(&b.entry.path));
            (ContentKind::Directory, files)
        } else {
            return Err(MetainfoError::UnsupportedPath(root));
        };

        let total_length = files.iter().map(|f| f.entry.length).sum();
        if total_length == 0 {
            return Err(MetainfoError::EmptyContent(root));
        }

        debug!(
            path = %root.display(),
            files = files.len(),
            total_length,
            "walked content"
        );

        Ok(Self {
            root,
            kind,
            files,
            total_length,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Files in hashing order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Sum of all file lengths.
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn is_single_file(&self) -> bool {
        self.kind == ContentKind::SingleFile
    }
}

fn collect_files(
    dir: &Path,
    prefix: &mut Vec<String>,
    out: &mut Vec<SourceFile>,
) -> Result<(), MetainfoError> {
    let entries = fs::read_dir(dir).map_err(|e| MetainfoError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| MetainfoError::io(dir, e))?;
        let path = entry.path();
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| MetainfoError::NonUtf8Path(path.clone()))?;

        let file_type = entry.file_type().map_err(|e| MetainfoError::io(&path, e))?;

        if file_type.is_dir() {
            prefix.push(name);
            collect_files(&path, prefix, out)?;
            prefix.pop();
            continue;
        }

        // Symlinked files are followed; symlinked directories are not, to avoid cycles.
        let metadata = if file_type.is_symlink() {
            fs::metadata(&path).map_err(|e| MetainfoError::io(&path, e))?
        } else {
            entry.metadata().map_err(|e| MetainfoError::io(&path, e))?
        };

        if !metadata.is_file() {
            trace!(path = %path.display(), "skipping non-regular entry");
            continue;
        }

        let mut segments = prefix.clone();
        segments.push(name);
        out.push(SourceFile {
            disk_path: path,
            entry: FileEntry {
                length: metadata.len(),
                path: segments,
            },
        });
    }

    Ok(())
}

fn file_name(path: &Path) -> Result<String, MetainfoError> {
    path.file_name()
        .ok_or_else(|| MetainfoError::UnsupportedPath(path.to_path_buf()))?
        .to_str()
        .map(String::from)
        .ok_or_else(|| MetainfoError::NonUtf8Path(path.to_path_buf()))
}
