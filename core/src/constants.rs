/// Header carrying the request timestamp, RFC 1123 rendered in GMT.
pub const X_MS_DATE: &str = "x-ms-date";

/// Header carrying the service protocol version.
pub const X_MS_VERSION: &str = "x-ms-version";

/// Header marking write requests as block-blob writes.
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";

/// Service protocol version every signed request is pinned to.
pub const STORAGE_VERSION: &str = "2020-04-08";

/// Signed version for service SAS tokens.
///
/// Token validity depends on the string-to-sign layout matching this version
/// exactly, so it is pinned rather than configurable.
pub const SAS_VERSION: &str = "2020-12-06";
