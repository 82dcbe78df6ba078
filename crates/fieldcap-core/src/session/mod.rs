mod recording_session;
mod segment;

pub use {
    recording_session::{CaptureMode, RecordingSession, SessionSnapshot, SessionState},
    segment::{Segment, SegmentRecord},
};
