/// Where a computation currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationState {
    /// Not yet started, or reset after a finished run.
    NotRunning,
    /// Started and making progress.
    Running,
    /// An abort was requested; the run will stop at its next cancel poll.
    PendingAbortion,
    /// Ran to completion.
    Finished,
    /// Stopped early because an abort was requested.
    Aborted,
}
