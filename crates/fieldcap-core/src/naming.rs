//! Filename conventions for captured media.
//!
//! Every deliverable name is built here so the on-disk layout stays in one
//! place: `<prefix>_<session>_<ordinal>_<start>_to_<end>_<category>.<ext>`.

use chrono::{DateTime, Local};

/// Prefix for raw video deliverables.
pub const VIDEO_PREFIX: &str = "vdo";
/// Prefix for merged audio+video deliverables.
pub const MERGED_PREFIX: &str = "merged";
/// Prefix for standalone audio clips.
pub const AUDIO_PREFIX: &str = "audio";
/// Prefix for still images.
pub const IMAGE_PREFIX: &str = "img";

/// Container extension for video and merged segments.
pub const VIDEO_EXTENSION: &str = "mp4";
/// Container extension for audio clips.
pub const AUDIO_EXTENSION: &str = "wav";
/// Container extension for still images.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Filename-safe timestamp token, e.g. `16oct2026_142501`.
pub fn timestamp_token(at: &DateTime<Local>) -> String {
    at.format("%d%b%Y_%H%M%S").to_string().to_lowercase()
}

/// Wall-clock label, e.g. `14:25:01`.
pub fn clock_label(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Lowercase the category and replace spaces so it can sit inside a filename.
pub fn sanitize_category(category: &str) -> String {
    category.trim().replace(' ', "_").to_lowercase()
}

/// Permanent name for a finalized segment or clip.
pub fn final_name(
    prefix: &str,
    session_id: u64,
    ordinal: u32,
    started_at: &DateTime<Local>,
    ended_at: &DateTime<Local>,
    category: &str,
    extension: &str,
) -> String {
    format!(
        "{prefix}_{session_id}_{ordinal}_{}_to_{}_{}.{extension}",
        timestamp_token(started_at),
        timestamp_token(ended_at),
        sanitize_category(category),
    )
}

/// Intermediate name for a merged segment, before the category is known.
pub fn merged_name(
    session_id: u64,
    chunk: u32,
    started_at: &DateTime<Local>,
    ended_at: &DateTime<Local>,
) -> String {
    format!(
        "{MERGED_PREFIX}_{session_id}_{chunk}_{}_to_{}.{VIDEO_EXTENSION}",
        timestamp_token(started_at),
        timestamp_token(ended_at),
    )
}

/// Temp name for the video file of one segment.
pub fn temp_video_name(session_id: u64, ordinal: u32, started_at: &DateTime<Local>) -> String {
    format!(
        "temp_{VIDEO_PREFIX}_{session_id}_{ordinal}_{}.{VIDEO_EXTENSION}",
        timestamp_token(started_at)
    )
}

/// Temp name for one audio capture span.
pub fn temp_audio_name(span: u64, opened_at: &DateTime<Local>) -> String {
    format!(
        "temp_{AUDIO_PREFIX}_{span}_{}.{AUDIO_EXTENSION}",
        timestamp_token(opened_at)
    )
}

/// Name for a still image.
pub fn image_name(counter: u64, taken_at: &DateTime<Local>, category: &str) -> String {
    format!(
        "{IMAGE_PREFIX}_{counter}_{}_{}_{}.{IMAGE_EXTENSION}",
        taken_at.format("%d%b%Y").to_string().to_lowercase(),
        taken_at.format("%H%M%S"),
        sanitize_category(category),
    )
}
