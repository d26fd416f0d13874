//! Destination file name derivation from download URLs.

use std::path::{Component, Path};

use url::Url;

use super::DownloadError;

/// Derives the destination file name from the last path segment of `url`.
///
/// The segment is percent-decoded and sanitized so it is always a single,
/// safe path component.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidInput`] if the URL is empty, cannot be
/// parsed as an absolute URL (including one without a scheme), or has no
/// non-empty final path segment.
pub fn file_name_from_url(url: &str) -> Result<String, DownloadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DownloadError::invalid_input("url cannot be empty"));
    }

    let parsed = Url::parse(url)
        .map_err(|e| DownloadError::invalid_input(format!("invalid url {url}: {e}")))?;

    let Some(last) = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
    else {
        return Err(DownloadError::invalid_input(format!(
            "url has no file name: {url}"
        )));
    };

    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    Ok(sanitize_filename(&decoded))
}

/// Replaces characters that are invalid in file names and neutralizes dot segments.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
