//! Extraction engine: pure functions from downloaded page text to the
//! typed domain model. No network or disk access happens here; documents
//! arrive as text and leave as values (or a `ParseError`).

/// A lazily compiled, cached CSS selector from a literal.
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: std::sync::OnceLock<scraper::Selector> = std::sync::OnceLock::new();
        SELECTOR.get_or_init(|| scraper::Selector::parse($css).unwrap())
    }};
}

pub(crate) use selector;

mod decode;
mod detail_page;
mod gallery_url;
mod list_page;
mod mpv;

pub use decode::{decode_rating, favcat_color, favcat_from_color, favcat_from_offset};
pub use detail_page::parse_gallery_detail;
pub use gallery_url::parse_gallery_url;
pub use list_page::parse_list_page;
pub use mpv::parse_mpv_manifest;
