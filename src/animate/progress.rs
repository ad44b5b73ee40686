//! Progress reporting for long-running generations.

use std::fmt;

/// A checkpoint reached while a generation is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The creation request is about to be sent.
    Started,
    /// The remote job was accepted and is processing.
    Processing,
    /// A status check came back; `attempt` counts from 1.
    StillProcessing { attempt: u32 },
    /// The job finished and the result is being downloaded.
    FetchingResult,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Started => f.write_str("Starting video generation..."),
            Progress::Processing => {
                f.write_str("Video processing has started. This may take a few minutes...")
            }
            Progress::StillProcessing { attempt } => {
                write!(f, "Checking status (attempt {})... Still processing.", attempt)
            }
            Progress::FetchingResult => {
                f.write_str("Video generation complete! Fetching the result...")
            }
        }
    }
}

/// Receives progress notifications.
///
/// Called synchronously at each checkpoint. Implementations must return
/// quickly; the value is never inspected by the caller.
pub trait ProgressSink {
    fn report(&mut self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress),
{
    fn report(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Sink that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: &Progress) {}
}

/// Messages cycled on screen while a generation is loading.
pub const LOADING_MESSAGES: [&str; 11] = [
    "Warming up the animation cells...",
    "Analyzing video frames...",
    "Identifying subjects and actions...",
    "Sketching the keyframes...",
    "Applying the selected animation style...",
    "Inking the outlines...",
    "Adding color and shading...",
    "Rendering the final video...",
    "This can take a few minutes, please wait...",
    "Finalizing the masterpiece...",
    "Almost there, polishing the details...",
];

/// Seconds each loading message stays on screen.
pub const LOADING_MESSAGE_INTERVAL_SECS: u64 = 7;

/// Loading message for the given rotation tick (wraps around).
pub fn loading_message(tick: usize) -> &'static str {
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()]
}
