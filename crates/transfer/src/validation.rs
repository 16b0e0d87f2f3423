use crate::TransferError;

/// Validates a `/`-separated upload path relative to the deploy root.
///
/// Rejects:
/// - Empty paths
/// - Absolute paths (leading `/`)
/// - Empty segments (`a//b`, trailing `/`)
/// - `.` and `..` segments
///
/// A backslash is an ordinary filename character on Unix and is accepted.
pub fn validate_upload_path(file_path: &str) -> Result<(), TransferError> {
    if file_path.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    if file_path.starts_with('/') {
        return Err(TransferError::InvalidPath(format!(
            "absolute path not allowed: {file_path}"
        )));
    }

    for segment in file_path.split('/') {
        match segment {
            "" => {
                return Err(TransferError::InvalidPath(format!(
                    "empty path segment: {file_path}"
                )));
            }
            "." | ".." => {
                return Err(TransferError::InvalidPath(format!(
                    "relative segment not allowed: {file_path}"
                )));
            }
            _ => {}
        }
    }

    Ok(())
}
