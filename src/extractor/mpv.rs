//! Parser for the multi-page viewer bootstrap page.
//!
//! The viewer embeds everything the client needs in one inline script: the
//! gallery id, the viewer key, and a JSON array with one entry per page.

use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use serde::Deserialize;

use crate::domain::models::{MpvImage, MpvImageManifest};
use crate::error::ParseError;

use super::selector;

fn gid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"var gid\s*=\s*(\d+)").unwrap())
}

fn mpvkey_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"var mpvkey\s*=\s*"([0-9a-z]+)""#).unwrap())
}

/// One page entry as embedded in the script payload.
#[derive(Deserialize)]
struct RawImage {
    /// Per-page fetch key.
    k: String,
    /// Image file name.
    n: String,
    /// Thumbnail URL.
    t: String,
}

/// Parse the viewer bootstrap page into an image manifest.
pub fn parse_mpv_manifest(html: &str) -> Result<MpvImageManifest, ParseError> {
    let doc = Html::parse_document(html);

    // The payload always sits in the second script element; the first is
    // the viewer library include.
    let script = doc
        .select(selector!("script"))
        .nth(1)
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| ParseError::new("viewer script", html))?;

    let gid = gid_re()
        .captures(&script)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .ok_or_else(|| ParseError::new("gid", &script))?;
    let mpv_key = mpvkey_re()
        .captures(&script)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| ParseError::new("mpv key", &script))?;

    let list_start = script
        .find("var imagelist")
        .ok_or_else(|| ParseError::new("image list", &script))?;
    let array = json_array_span(&script[list_start..])
        .ok_or_else(|| ParseError::new("image list", &script[list_start..]))?;
    let raw: Vec<RawImage> = serde_json::from_str(array)
        .map_err(|_| ParseError::new("image list", array))?;

    // Image ids are zero-padded to the width of the page count, so a
    // 120-page gallery numbers its pages 001 through 120.
    let width = raw.len().to_string().len();
    let images = raw
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let page = index as i64 + 1;
            MpvImage {
                img_id: format!("{page:0width$}"),
                key: entry.k,
                page,
                name: entry.n,
                thumbnail_url: entry.t,
            }
        })
        .collect();

    Ok(MpvImageManifest { gid, mpv_key, images })
}

/// Slice out the first bracket-balanced JSON array literal.
///
/// The depth scan is string-aware so bracket characters inside file names
/// cannot truncate the array.
fn json_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mocks;

    #[test]
    fn manifest_of_120_pages_pads_ids_to_three_digits() {
        let html = mocks::mpv_page(2231376, "z9y8x7w6v5", 120);
        let manifest = parse_mpv_manifest(&html).unwrap();
        assert_eq!(manifest.gid, 2231376);
        assert_eq!(manifest.mpv_key, "z9y8x7w6v5");
        assert_eq!(manifest.images.len(), 120);
        assert_eq!(manifest.images[0].img_id, "001");
        assert_eq!(manifest.images[0].page, 1);
        assert_eq!(manifest.images[119].img_id, "120");
        assert_eq!(manifest.images[119].page, 120);
    }

    #[test]
    fn single_digit_counts_are_not_padded() {
        let html = mocks::mpv_page(5, "abcdef0123", 9);
        let manifest = parse_mpv_manifest(&html).unwrap();
        assert_eq!(manifest.images[0].img_id, "1");
        assert_eq!(manifest.images[8].img_id, "9");
    }

    #[test]
    fn entries_keep_key_name_and_thumbnail() {
        let html = mocks::mpv_page(42, "abcdef0123", 3);
        let manifest = parse_mpv_manifest(&html).unwrap();
        let second = &manifest.images[1];
        assert_eq!(second.key, "key2");
        assert_eq!(second.name, "page-2.jpg");
        assert!(second.thumbnail_url.contains("/m/42/2"));
    }

    #[test]
    fn brackets_inside_file_names_do_not_truncate_the_list() {
        let html = mocks::mpv_page_with_names(7, "abcdef0123", &["[cover].jpg", "p]2.jpg"]);
        let manifest = parse_mpv_manifest(&html).unwrap();
        assert_eq!(manifest.images.len(), 2);
        assert_eq!(manifest.images[0].name, "[cover].jpg");
        assert_eq!(manifest.images[1].name, "p]2.jpg");
    }

    #[test]
    fn a_page_without_the_payload_script_fails() {
        let err = parse_mpv_manifest("<html><body></body></html>").unwrap_err();
        assert_eq!(err.field, "viewer script");
    }
}
