use std::path::{Path, PathBuf};

/// Check if the base name of `path` contains the temp-artifact `marker`.
///
/// Only the final component is inspected, so a directory whose name happens
/// to contain the marker does not hide the files below it.
///
/// ```
/// # use monitor::utils::has_marker;
/// let marker = ".goutputstream";
///
/// assert!(has_marker("/home/user/notes.txt.goutputstream-3KQ1Z2", marker));
/// assert!(!has_marker("/home/user/notes.txt", marker));
/// assert!(!has_marker("/tmp/x.goutputstream-1/notes.txt", marker));
/// ```
#[inline]
pub fn has_marker(path: impl AsRef<Path>, marker: &str) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(marker))
}

/// Candidate original for a temp artifact: the base name cut at the marker.
///
/// Returns `None` when the base name has no marker or nothing precedes it.
///
/// ```
/// # use monitor::utils::original_for_temp;
/// # use std::path::Path;
/// let marker = ".goutputstream";
///
/// assert_eq!(
///     original_for_temp("/srv/a.goutputstream.d/foo.goutputstream-XYZ", marker).as_deref(),
///     Some(Path::new("/srv/a.goutputstream.d/foo"))
/// );
/// assert_eq!(original_for_temp("/srv/.goutputstream-XYZ", marker), None);
/// assert_eq!(original_for_temp("/srv/foo", marker), None);
/// ```
#[inline]
pub fn original_for_temp(path: impl AsRef<Path>, marker: &str) -> Option<PathBuf> {
    let path = path.as_ref();
    let name = path.file_name()?.to_str()?;
    let (stem, _) = name.split_once(marker)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_marker() {
        let marker = ".goutputstream";
        assert!(has_marker("foo.goutputstream-ABC", marker));
        assert!(has_marker("/a/b/.goutputstream-ABC", marker));
        assert!(!has_marker("/a/b.goutputstream/c", marker));
        assert!(!has_marker("/", marker));
    }

    #[test]
    fn test_original_for_temp() {
        let marker = ".goutputstream";
        assert_eq!(
            original_for_temp("/a/foo.goutputstream-ABC", marker),
            Some(PathBuf::from("/a/foo"))
        );
        // relative paths keep their shape
        assert_eq!(
            original_for_temp("foo.goutputstream-ABC", marker),
            Some(PathBuf::from("foo"))
        );
        assert_eq!(original_for_temp("/a/foo", marker), None);
    }
}
