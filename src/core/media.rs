use std::path::Path;

/// Media type used when the extension is missing or unknown
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Guess the media type of an upload from its file extension
pub fn guess_media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") | Some("jpe") | Some("jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("avif") => "image/avif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("jxl") => "image/jxl",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/vnd.microsoft.icon",
        _ => DEFAULT_MEDIA_TYPE,
    }
}
