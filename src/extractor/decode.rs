//! Decode helpers for CSS-encoded page state: the rating sprite, the
//! favourite-bin markers and the raw-markup tag fallback.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::models::TagGroup;
use crate::error::ParseError;

/// Class marking a rating sprite as the viewer's own rating.
pub const PERSONAL_RATING_CLASS: &str = "irb";

/// Marker colours for favourite bins 0-9, in slot order.
pub const FAVCAT_COLORS: [&str; 10] = [
    "#000", "#f00", "#fa0", "#dd0", "#080", "#9f4", "#4bf", "#00f", "#508", "#e8e",
];

/// Height of one icon in the favourite sprite strip (detail pages).
const FAVCAT_SPRITE_STEP: i64 = 19;

/// Horizontal pixels per full star in the rating sprite.
const STAR_STEP: i64 = 16;

/// Vertical pixels per half-star row in the rating sprite.
const HALF_STAR_ROW: i64 = 21;

fn position_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"background-position:\s*(-?\d+)(?:px)?\s+(-?\d+)px").unwrap()
    })
}

fn border_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"border-color:\s*(#[0-9a-fA-F]{3,6})").unwrap())
}

fn tag_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"title="([a-z]+):([^"]+)""#).unwrap())
}

/// Decode a star rating from a sprite `background-position` style.
///
/// The sprite sheet advances one full star per 16px of horizontal offset
/// and drops to the half-star row 21px further down:
/// `rating = 5 - X/16 - floor(Y/21) * 0.5`.
///
/// An offset that lands outside the half-star grid is a parse failure:
/// it means the sprite sheet itself changed.
pub fn decode_rating(style: &str) -> Result<f32, ParseError> {
    let caps = position_re()
        .captures(style)
        .ok_or_else(|| ParseError::new("rating", style))?;
    let x = -caps[1].parse::<i64>().map_err(|_| ParseError::new("rating", style))?;
    let y = -caps[2].parse::<i64>().map_err(|_| ParseError::new("rating", style))?;

    if x < 0 || y < 0 || x % STAR_STEP != 0 {
        return Err(ParseError::new("rating", style));
    }

    let half_steps = 10 - 2 * (x / STAR_STEP) - y / HALF_STAR_ROW;
    if !(0..=10).contains(&half_steps) {
        return Err(ParseError::new("rating", style));
    }
    Ok(half_steps as f32 / 2.0)
}

/// Map a favourite marker colour back to its bin.
///
/// An unknown colour means "not favourited" rather than a failure; the
/// favourite bin is an optional field.
pub fn favcat_from_color(color: &str) -> Option<u8> {
    let color = color.trim().to_ascii_lowercase();
    FAVCAT_COLORS.iter().position(|c| *c == color).map(|i| i as u8)
}

/// Marker colour for a favourite bin. The inverse of [`favcat_from_color`].
pub fn favcat_color(slot: u8) -> &'static str {
    FAVCAT_COLORS[usize::from(slot.min(9))]
}

/// Detail pages encode the bin as a vertical sprite offset instead.
pub fn favcat_from_offset(offset_y: i64) -> Option<u8> {
    let slot = offset_y / FAVCAT_SPRITE_STEP;
    (0..10).contains(&slot).then_some(slot as u8)
}

/// Favourite bin from an inline style's `border-color`, list-page form.
pub(crate) fn favcat_from_style(style: &str) -> Option<u8> {
    border_color_re()
        .captures(style)
        .and_then(|caps| favcat_from_color(&caps[1]))
}

/// Vertical component of a `background-position` style, as a positive
/// downward offset.
pub(crate) fn sprite_offset_y(style: &str) -> Option<i64> {
    position_re()
        .captures(style)
        .and_then(|caps| caps[2].parse::<i64>().ok())
        .map(|v| -v)
}

/// Collect `namespace:text` tag pairs from raw tag-cell markup.
///
/// Attribute enumeration across repeated sibling cells is unreliable
/// through the structured API, so this scans the raw inner markup instead.
/// Tags sharing a namespace accumulate in encounter order; duplicates are
/// preserved, not deduplicated.
pub(crate) fn tags_from_markup(markup: &str) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    for caps in tag_title_re().captures_iter(markup) {
        let namespace = &caps[1];
        let tag = caps[2].to_string();
        match groups.iter_mut().find(|g| g.namespace == namespace) {
            Some(group) => group.tags.push(tag),
            None => groups.push(TagGroup {
                namespace: namespace.to_string(),
                tags: vec![tag],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sprite offset that renders `half_steps / 2` stars.
    fn style_for(half_steps: i64) -> String {
        let x = STAR_STEP * (5 - (half_steps + 1) / 2);
        let y = if half_steps % 2 == 1 { HALF_STAR_ROW } else { 1 };
        format!("background-position:-{x}px -{y}px")
    }

    #[test]
    fn rating_round_trips_over_the_half_star_grid() {
        for half_steps in 0..=10 {
            let style = style_for(half_steps);
            let rating = decode_rating(&style).unwrap();
            assert_eq!(rating, half_steps as f32 / 2.0, "style {style}");
        }
    }

    #[test]
    fn five_star_offset_is_zero() {
        assert_eq!(decode_rating("background-position:0px -1px").unwrap(), 5.0);
    }

    #[test]
    fn off_grid_offset_is_rejected() {
        assert!(decode_rating("background-position:-7px -1px").is_err());
        assert!(decode_rating("background-position:-160px -1px").is_err());
        assert!(decode_rating("no position here").is_err());
    }

    #[test]
    fn favcat_colors_round_trip() {
        for slot in 0..10u8 {
            assert_eq!(favcat_from_color(favcat_color(slot)), Some(slot));
        }
    }

    #[test]
    fn unknown_favcat_color_is_none() {
        assert_eq!(favcat_from_color("#123"), None);
    }

    #[test]
    fn favcat_offset_maps_in_19px_steps() {
        assert_eq!(favcat_from_offset(0), Some(0));
        assert_eq!(favcat_from_offset(38), Some(2));
        assert_eq!(favcat_from_offset(171), Some(9));
        assert_eq!(favcat_from_offset(190), None);
    }

    #[test]
    fn favcat_from_border_color_style() {
        assert_eq!(favcat_from_style("border-color:#f00; opacity:1"), Some(1));
        assert_eq!(favcat_from_style("color:#fff"), None);
    }

    #[test]
    fn tags_accumulate_per_namespace_keeping_duplicates() {
        let markup = r#"
            <div title="artist:alpha"><a>alpha</a></div>
            <div title="female:glasses"><a>glasses</a></div>
            <div title="artist:beta"><a>beta</a></div>
            <div title="artist:alpha"><a>alpha</a></div>
        "#;
        let groups = tags_from_markup(markup);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].namespace, "artist");
        assert_eq!(groups[0].tags, vec!["alpha", "beta", "alpha"]);
        assert_eq!(groups[1].namespace, "female");
        assert_eq!(groups[1].tags, vec!["glasses"]);
    }
}
