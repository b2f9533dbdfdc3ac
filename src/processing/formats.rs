//! Image format detection and handling

use std::path::Path;

/// Extensions picked up when walking the input tree
pub fn supported_input_formats() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "bmp", "gif"]
}

/// Check if a file extension is supported for input
pub fn is_supported_input_format(extension: &str) -> bool {
    supported_input_formats()
        .iter()
        .any(|&fmt| fmt.eq_ignore_ascii_case(extension))
}

/// Check a path by the suffix of its file name.
///
/// Matches on the whole name rather than [`Path::extension`], so a file
/// called just `.jpg` is picked up as well.
pub fn is_supported_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, suffix)| is_supported_input_format(suffix))
}
