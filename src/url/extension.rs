/// Extensions of paths that are crawled as pages; the empty extension is a
/// directory or route
pub const PAGE_EXTENSIONS: &[&str] = &["html", "asp", "php", ""];

/// Extracts the file extension of a URL path
///
/// Only the final path segment (after the last `/`) is considered and the
/// extension is the text after its last `.`. A segment without a `.` yields
/// the empty string.
///
/// # Examples
///
/// ```
/// use quatermain::url::path_extension;
///
/// assert_eq!(path_extension("/docs/guide.pdf"), "pdf");
/// assert_eq!(path_extension("/v1.2/about"), "");
/// assert_eq!(path_extension("/"), "");
/// ```
pub fn path_extension(path: &str) -> &str {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(dot) => &segment[dot + 1..],
        None => "",
    }
}

/// Returns true when the extension denotes a crawlable page
pub fn is_page_extension(extension: &str) -> bool {
    PAGE_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}
