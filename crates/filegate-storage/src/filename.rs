//! Upload filename validation.

use filegate_core::AccessError;

/// Accept only a single, visible path component as an upload filename.
///
/// Uploads always land directly in the upload directory, so separators,
/// `..` and hidden (dot-prefixed) names are refused outright.
pub fn validate_upload_filename(filename: &str) -> Result<&str, AccessError> {
    if filename.trim().is_empty() {
        return Err(AccessError::PathOutsideBase("filename is required".to_string()));
    }

    if filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return Err(AccessError::PathTraversal(format!(
            "invalid filename: {}",
            filename
        )));
    }

    if filename.starts_with('.') {
        return Err(AccessError::PathTraversal(
            "hidden files not allowed".to_string(),
        ));
    }

    Ok(filename)
}
