use std::fs::File;
use std::io::{BufRead as _, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::action::DrawAction;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};
use crate::source::{ActionIter, ActionSource};

/// Action log stored as one JSON document per line, oldest first.
///
/// This is the shape `mongoexport --sort '{"create_at": 1}'` produces for the actions
/// collection. Lines that are not valid action documents are logged and yielded as inert
/// actions, so the stream length always matches [`ActionSource::count`].
#[derive(Clone, Debug)]
pub struct NdjsonSource {
    path: PathBuf,
}

impl NdjsonSource {
    /// Open an export, failing if the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> PlacelapseResult<Self> {
        let path = path.as_ref().to_path_buf();
        File::open(&path).map_err(|e| {
            PlacelapseError::source(format!(
                "failed to open action log '{}': {e}",
                path.display()
            ))
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> PlacelapseResult<BufReader<File>> {
        let f = File::open(&self.path)
            .with_context(|| format!("open action log '{}'", self.path.display()))?;
        Ok(BufReader::new(f))
    }
}

impl ActionSource for NdjsonSource {
    fn count(&mut self) -> PlacelapseResult<u64> {
        let mut n = 0u64;
        for line in self.reader()?.lines() {
            let line = line
                .with_context(|| format!("read action log '{}'", self.path.display()))?;
            if !line.trim().is_empty() {
                n += 1;
            }
        }
        Ok(n)
    }

    fn actions(&mut self) -> PlacelapseResult<ActionIter<'_>> {
        let path = self.path.clone();
        let lines = self.reader()?.lines().enumerate();
        Ok(Box::new(lines.filter_map(move |(i, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(PlacelapseError::source(format!(
                        "failed to read line {} of '{}': {e}",
                        i + 1,
                        path.display()
                    ))));
                }
            };
            let doc = line.trim();
            if doc.is_empty() {
                return None;
            }
            Some(Ok(parse_line(doc, i + 1)))
        })))
    }
}

fn parse_line(doc: &str, line_no: usize) -> DrawAction {
    match serde_json::from_str::<DrawAction>(doc) {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(line = line_no, error = %e, "unreadable action record, skipping");
            DrawAction::default()
        }
    }
}
