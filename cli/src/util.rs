use std::{
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::Context as _;
use leetrun_core::storage::ProblemWorkspace;

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

/// A file is taken as is; a dir (default: current dir) yields its most recently modified
/// file matching `include`.
pub fn determine_program_file(
    program_file_or_dir: &Option<PathBuf>,
    include: &glob::Pattern,
) -> anyhow::Result<PathBuf> {
    let path = program_file_or_dir.clone().unwrap_or_else(current_dir);
    if path.is_file() {
        return Ok(path);
    }
    fsutil::find_most_recently_modified_file(&path, include)
        .context("Cannot determine the program file")
}

/// Nearest problem workspace containing `program_file`.
pub fn workspace_of(program_file: &Path) -> anyhow::Result<ProblemWorkspace> {
    let dir = match program_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => current_dir(),
    };
    ProblemWorkspace::find_in_ancestors(dir).context("Not in a problem workspace")
}

pub fn replace_homedir_to_tilde(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let Some(home_dir) = ::dirs::home_dir() else {
        return path
    };
    path.strip_prefix(home_dir)
        .map(|path| Path::new("~").join(path))
        .unwrap_or(path)
}
