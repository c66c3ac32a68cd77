use thiserror::Error;

/// Errors surfaced while encoding or decoding an inline source map trailer.
///
/// A tagged trailer is only ever written by this crate, so a decode failure
/// means the trailer was corrupted after inlining. It is surfaced rather
/// than swallowed; callers decide whether to treat it as a missing map.
#[derive(Error, Debug)]
pub enum SourceMapError {
    #[error("Invalid base64 payload in source map trailer: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}
