/// Receives progress over the action stream.
///
/// The library only reports counts; presentation (progress bars, logs) is up to the caller.
pub trait Progress {
    /// Called once with the number of records the source reported.
    fn start(&mut self, _total: u64) {}
    /// Called after each consumed record.
    fn advance(&mut self, _n: u64) {}
    /// Called when the stream ends or is aborted.
    fn finish(&mut self) {}
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}
