//! Application constants

/// Maximum size of an uploaded video (100 MB)
pub const MAX_VIDEO_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Slack on top of the file limit for multipart framing, so oversized files
/// reach the handler and get a JSON 400 instead of a bare 413.
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Multipart field carrying the video bytes
pub const VIDEO_FIELD: &str = "video";

/// Accepted upload MIME types. `quicktime` and `x-msvideo` are what browsers
/// actually send for .mov and .avi files.
pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/mov",
    "video/quicktime",
    "video/avi",
    "video/x-msvideo",
    "video/webm",
];

/// Number of caption candidates returned per generation request
pub const CAPTION_CANDIDATES: usize = 3;

/// Default artificial processing delay for caption generation (ms)
pub const DEFAULT_CAPTION_DELAY_MS: u64 = 2000;

/// Conversation messages forwarded to the model with each chat request
pub const CHAT_HISTORY_WINDOW: usize = 4;

pub fn is_allowed_video_type(content_type: &str) -> bool {
    ALLOWED_VIDEO_TYPES.contains(&content_type)
}

/// Guess a response content type from a stored file name.
pub fn content_type_for(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".mp4") {
        "video/mp4"
    } else if lower.ends_with(".webm") {
        "video/webm"
    } else if lower.ends_with(".mov") {
        "video/quicktime"
    } else if lower.ends_with(".avi") {
        "video/x-msvideo"
    } else {
        "application/octet-stream"
    }
}
