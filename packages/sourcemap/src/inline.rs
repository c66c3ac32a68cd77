use crate::error::SourceMapError;
use crate::map::{InlineOptions, SourceMap, TransformedModule};
use crate::paths::normalize_sources;
use base64::prelude::*;
use tracing::debug;

/// Sentinel comment marking code that already carries a tagged trailer.
pub const SOURCEMAPPING_SOURCE: &str = "//# sourceMappingSource=vite-node";

/// First line of every tagged trailer, up to the base64 payload.
pub const SOURCEMAPPING_URL_PREFIX: &str =
    "//# sourceMappingURL=data:application/json;charset=utf-8;base64,";

/// Anchor shared by all generic inline source map comments, tagged or not.
const GENERIC_URL_PREFIX: &str = "//# sourceMappingURL=data:application/json";

/// Embed `module.map` into `module.code` as a tagged trailer.
///
/// Returns the module unchanged when it has no map, or when the code
/// already contains the sentinel comment (re-inlining is a no-op). Any
/// pre-existing generic inline map comments are stripped first, so the
/// output carries exactly one trailer. The map's `sources` entries are
/// normalized to absolute paths before encoding.
pub fn with_inline_sourcemap(
    mut module: TransformedModule,
    options: &InlineOptions,
) -> Result<TransformedModule, SourceMapError> {
    let Some(map) = module.map.as_mut() else {
        return Ok(module);
    };
    if module.code.contains(SOURCEMAPPING_SOURCE) {
        return Ok(module);
    }

    normalize_sources(map, &options.root, &options.filepath);

    // Only this crate's map is ever consumed downstream; dropping foreign
    // inline maps keeps the payload bounded to a single trailer.
    let code = strip_generic_trailers(&module.code);

    let json = serde_json::to_string(map)?;
    let payload = BASE64_STANDARD.encode(json.as_bytes());
    debug!(
        filepath = %options.filepath.display(),
        payload_len = payload.len(),
        "Inlined source map trailer"
    );

    module.code = format!(
        "{}\n\n{}\n{}{}\n",
        code.trim_end(),
        SOURCEMAPPING_SOURCE,
        SOURCEMAPPING_URL_PREFIX,
        payload
    );
    Ok(module)
}

/// Recover the source map embedded by [`with_inline_sourcemap`].
///
/// `Ok(None)` when the code carries no tagged trailer. A trailer whose
/// payload fails base64 or JSON decoding is corruption and surfaces as an
/// error.
pub fn extract_source_map(code: &str) -> Result<Option<SourceMap>, SourceMapError> {
    let Some(start) = code.find(SOURCEMAPPING_URL_PREFIX) else {
        return Ok(None);
    };

    let after = &code[start + SOURCEMAPPING_URL_PREFIX.len()..];
    let payload = after.lines().next().unwrap_or("");
    if payload.is_empty() {
        return Ok(None);
    }

    let bytes = BASE64_STANDARD.decode(payload)?;
    let map = serde_json::from_slice(&bytes)?;
    Ok(Some(map))
}

/// Remove every well-formed generic inline source map comment from `code`.
///
/// A match is anchored on the known marker token: the generic prefix, a
/// non-empty comma-free run of media-type parameters, `base64,`, then a
/// non-empty base64 payload ending the line. Anything that misses that
/// grammar (unterminated parameters, empty or non-base64 payload) is
/// ordinary code and is preserved. The line's newline is kept; only the
/// comment text is dropped.
fn strip_generic_trailers(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;

    while let Some(start) = rest.find(GENERIC_URL_PREFIX) {
        let after = &rest[start + GENERIC_URL_PREFIX.len()..];
        let line_len = after.find('\n').unwrap_or(after.len());

        if is_generic_trailer_tail(&after[..line_len]) {
            debug!("Stripped foreign inline source map comment");
            out.push_str(&rest[..start]);
            rest = &after[line_len..];
        } else {
            // Malformed candidate; emit the anchor and keep scanning.
            out.push_str(&rest[..start + GENERIC_URL_PREFIX.len()]);
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Validate the remainder of a candidate trailer line after the generic
/// prefix: `<params>base64,<payload>` with a comma-free non-empty `params`
/// run and a non-empty base64-alphabet payload.
fn is_generic_trailer_tail(tail: &str) -> bool {
    let Some(idx) = tail.find("base64,") else {
        return false;
    };
    let params = &tail[..idx];
    if params.is_empty() || params.contains(',') {
        return false;
    }

    let payload = &tail[idx + "base64,".len()..];
    !payload.is_empty()
        && payload
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}
