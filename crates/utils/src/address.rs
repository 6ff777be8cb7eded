use crate::{TransformError, TransformResult};

/// Returns the local part of an email address, the text before the
/// first `@` separator.
///
/// Fails with [`TransformError::MalformedAddress`] when the address has
/// no separator at all.
pub fn local_part(address: &str) -> TransformResult<&str> {
    address
        .split_once('@')
        .map(|(local, _)| local)
        .ok_or_else(|| TransformError::MalformedAddress(address.to_string()))
}
