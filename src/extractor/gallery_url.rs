//! Identifier extraction from gallery URLs.
//!
//! Gallery links follow `/g/<gid>/<token>/` wherever they appear; list
//! rows, parent links and newer-version links all reuse this shape.

use url::Url;

use crate::error::ParseError;

/// Split a gallery URL into its `(gid, token)` identifier pair.
pub fn parse_gallery_url(raw: &str) -> Result<(i64, String), ParseError> {
    let url = Url::parse(raw).map_err(|_| ParseError::new("gallery url", raw))?;
    let mut segments = url
        .path_segments()
        .ok_or_else(|| ParseError::new("gallery url", raw))?;

    if segments.next() != Some("g") {
        return Err(ParseError::new("gallery url", raw));
    }
    let gid = segments
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ParseError::new("gallery url", raw))?;
    let token = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::new("gallery url", raw))?
        .to_string();

    Ok((gid, token))
}
