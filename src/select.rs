use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use tracing::debug;

use crate::{PipelineError, Result};

/// Prefix Excel uses for the lock file of an open workbook.
const LOCK_FILE_PREFIX: &str = "~$";

#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    stamp: SystemTime,
}

/// Picks the most recently created file in `dir` with the given extension.
///
/// Candidates are visited in path order and a later candidate only wins with a
/// strictly newer timestamp, so ties resolve to the first path.
pub fn latest_input_file<P: AsRef<Path>>(dir: P, extension: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let not_found = || PipelineError::NoInputFound {
        dir: dir.to_path_buf(),
        extension: extension.to_string(),
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cannot list {}: {}", dir.display(), e);
            return Err(not_found());
        }
    };

    let mut candidates: Vec<Candidate> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_input_file(path, extension))
        .filter_map(|path| {
            let metadata = fs::metadata(&path).ok()?;
            let stamp = metadata.created().or_else(|_| metadata.modified()).ok()?;
            Some(Candidate { path, stamp })
        })
        .collect();
    debug!("{} candidate input files in {}", candidates.len(), dir.display());

    newest(&mut candidates).ok_or_else(not_found)
}

/// Newest candidate by timestamp; on equal timestamps the smallest path wins.
fn newest(candidates: &mut [Candidate]) -> Option<PathBuf> {
    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    candidates
        .iter()
        .fold(None::<&Candidate>, |best, c| match best {
            Some(b) if b.stamp >= c.stamp => Some(b),
            _ => Some(c),
        })
        .map(|c| c.path.clone())
}

fn is_input_file(path: &Path, extension: &str) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX));
    path.is_file() && !is_lock_file && path.extension().is_some_and(|e| e == extension)
}
