//! Locating RSX files from command line arguments.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve `paths` into a sorted, de-duplicated list of files.
///
/// Files named explicitly are kept whatever their extension. Directories are walked recursively,
/// skipping hidden entries, and only files whose extension is in `extensions` are collected. No
/// paths means the current directory.
///
/// # Errors
///
/// Returns an error if a path does not exist or a directory cannot be read.
pub fn find_documents(paths: Vec<PathBuf>, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let paths = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths
    };

    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(&path, extensions, &mut documents)?;
        } else if path.is_file() {
            documents.push(path);
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}

fn walk(dir: &Path, extensions: &[String], documents: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_dir() {
            walk(&path, extensions, documents)?;
        } else if has_extension(&path, extensions) {
            documents.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.trim_start_matches('.') == ext))
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
