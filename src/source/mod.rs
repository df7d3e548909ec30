//! Ordered draw-action sources.
//!
//! A source yields every action in ascending `create_at` order and knows its total count up
//! front (for progress reporting). Iteration is lazy so very long histories are never held in
//! memory.

/// Live MongoDB `actions` collection.
pub mod mongo;
/// Newline-delimited JSON exports of the action log.
pub mod ndjson;

use std::path::Path;

use crate::action::DrawAction;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};

pub use mongo::MongoSource;
pub use ndjson::NdjsonSource;

/// Boxed lazy action stream. An `Err` item means the source itself failed mid-stream.
pub type ActionIter<'a> = Box<dyn Iterator<Item = PlacelapseResult<DrawAction>> + 'a>;

/// Chronologically ordered stream of draw actions.
pub trait ActionSource {
    /// Total number of records the next [`ActionSource::actions`] call will yield.
    fn count(&mut self) -> PlacelapseResult<u64>;

    /// Start a fresh pass over all records, oldest first.
    fn actions(&mut self) -> PlacelapseResult<ActionIter<'_>>;
}

/// In-memory source, mostly for tests and library callers that already hold the log.
#[derive(Clone, Debug, Default)]
pub struct VecSource {
    actions: Vec<DrawAction>,
}

impl VecSource {
    /// Wrap actions that are already in chronological order.
    pub fn new(actions: Vec<DrawAction>) -> Self {
        Self { actions }
    }
}

impl ActionSource for VecSource {
    fn count(&mut self) -> PlacelapseResult<u64> {
        Ok(self.actions.len() as u64)
    }

    fn actions(&mut self) -> PlacelapseResult<ActionIter<'_>> {
        Ok(Box::new(self.actions.iter().cloned().map(Ok)))
    }
}

/// Open the action source named by a connection string.
///
/// `mongodb://` and `mongodb+srv://` URIs connect to a live deployment (database from the URI
/// path, `place` otherwise). Anything else is a filesystem path or `file://` URL of an NDJSON
/// export.
pub fn open_source(uri: &str) -> PlacelapseResult<Box<dyn ActionSource>> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(PlacelapseError::source("action source must be non-empty"));
    }
    if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
        return Ok(Box::new(MongoSource::connect(uri)?));
    }

    let path = uri.strip_prefix("file://").unwrap_or(uri);
    Ok(Box::new(NdjsonSource::open(Path::new(path))?))
}
