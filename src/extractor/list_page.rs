//! Parser for gallery listing pages (front page, search results,
//! favourites).

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::domain::models::{
    Category, FavoritesOrder, GalleryListItem, GalleryListPage,
};
use crate::error::ParseError;

use super::{decode, selector};

fn pages_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+) pages?").unwrap())
}

/// Parse a listing page into its items and chrome.
///
/// All-or-nothing: any row that breaks the structural contract fails the
/// whole page.
pub fn parse_list_page(html: &str) -> Result<GalleryListPage, ParseError> {
    let doc = Html::parse_document(html);

    let mut items = Vec::new();
    for row in doc.select(selector!("table.itg tr")) {
        // Header and spacer rows carry no category cell.
        let Some(category_cell) = row.select(selector!("td.gl1c div")).next() else {
            continue;
        };
        items.push(parse_row(row, &category_cell)?);
    }

    let (current_page, total_pages) = parse_pager(&doc)?;

    let result_summary = doc
        .select(selector!("p.ip"))
        .next()
        .map(|el| collect_text(&el))
        .unwrap_or_default();

    Ok(GalleryListPage {
        items,
        current_page,
        total_pages,
        favorite_titles: parse_favorite_titles(&doc),
        favorites_order: parse_favorites_order(&doc),
        result_summary,
    })
}

fn parse_row(
    row: ElementRef<'_>,
    category_cell: &ElementRef<'_>,
) -> Result<GalleryListItem, ParseError> {
    let category = Category::from_site_name(&collect_text(category_cell))?;

    let thumb = row
        .select(selector!("td.gl2c img"))
        .next()
        .ok_or_else(|| ParseError::new("thumbnail", &row.html()))?;
    let thumbnail_url = thumb
        .value()
        .attr("data-src")
        .or_else(|| thumb.value().attr("src"))
        .ok_or_else(|| ParseError::new("thumbnail", &thumb.html()))?
        .to_string();

    let posted_el = row
        .select(selector!(r#"td.gl2c div[id^="posted_"]"#))
        .next()
        .ok_or_else(|| ParseError::new("posted", &row.html()))?;
    let posted = collect_text(&posted_el);
    let posted_style = posted_el.value().attr("style").unwrap_or_default();
    let favorite_slot = decode::favcat_from_style(posted_style);
    let visible = !posted_style.contains("line-through");

    let rating_el = row
        .select(selector!("td.gl2c div.ir"))
        .next()
        .ok_or_else(|| ParseError::new("rating", &row.html()))?;
    let rating = decode::decode_rating(rating_el.value().attr("style").unwrap_or_default())?;
    let is_personal_rating = rating_el
        .value()
        .classes()
        .any(|c| c == decode::PERSONAL_RATING_CLASS);

    let name_cell = row
        .select(selector!("td.gl3c"))
        .next()
        .ok_or_else(|| ParseError::new("title", &row.html()))?;
    let link = name_cell
        .select(selector!("a"))
        .next()
        .ok_or_else(|| ParseError::new("gallery url", &name_cell.html()))?;
    let url = link
        .value()
        .attr("href")
        .ok_or_else(|| ParseError::new("gallery url", &link.html()))?
        .to_string();
    let title_el = link
        .select(selector!("div.glink"))
        .next()
        .ok_or_else(|| ParseError::new("title", &link.html()))?;
    let title = collect_text(&title_el);
    let tags = decode::tags_from_markup(&name_cell.inner_html());

    let side_cell = row
        .select(selector!("td.gl4c"))
        .next()
        .ok_or_else(|| ParseError::new("length", &row.html()))?;
    let uploader = side_cell
        .select(selector!("a"))
        .next()
        .map(|a| collect_text(&a))
        .filter(|s| !s.is_empty());
    let side_text = collect_text(&side_cell);
    let length = pages_re()
        .captures(&side_text)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .ok_or_else(|| ParseError::new("length", &side_text))?;

    Ok(GalleryListItem {
        url,
        title,
        thumbnail_url,
        category,
        posted,
        visible,
        favorite_slot,
        rating,
        is_personal_rating,
        uploader,
        length,
        tags,
    })
}

/// Current/total pages from the pager table; a page without one (single
/// result pages, some favourites views) counts as 1 of 1.
fn parse_pager(doc: &Html) -> Result<(i64, i64), ParseError> {
    let Some(pager) = doc.select(selector!("table.ptt")).next() else {
        return Ok((1, 1));
    };

    let mut current = None;
    let mut total = None;
    for cell in pager.select(selector!("td")) {
        let text = collect_text(&cell);
        let Ok(number) = text.parse::<i64>() else {
            continue;
        };
        if cell.value().classes().any(|c| c == "ptds") {
            current = Some(number);
        }
        // Navigation arrows are non-numeric, so the last numeric cell is
        // the highest reachable page.
        total = Some(number);
    }

    match (current, total) {
        (Some(current), Some(total)) => Ok((current, total)),
        _ => Err(ParseError::new("pager", &pager.html())),
    }
}

/// The ten favourite-bin titles, present on favourites listings only.
fn parse_favorite_titles(doc: &Html) -> Option<Vec<(u8, String)>> {
    let bins: Vec<String> = doc
        .select(selector!("div.fp"))
        .map(|bin| {
            bin.select(selector!("div"))
                .last()
                .map(|el| collect_text(&el))
                .unwrap_or_default()
        })
        .collect();
    if bins.len() != 10 {
        return None;
    }
    Some(
        bins.into_iter()
            .enumerate()
            .map(|(slot, title)| (slot as u8, title))
            .collect(),
    )
}

fn parse_favorites_order(doc: &Html) -> Option<FavoritesOrder> {
    let selected = doc
        .select(selector!(r#"select[name="fs"] option[selected]"#))
        .next()?;
    match selected.value().attr("value") {
        Some("f") => Some(FavoritesOrder::Favorited),
        Some("p") => Some(FavoritesOrder::Posted),
        _ => None,
    }
}

fn collect_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mocks;

    fn default_row() -> String {
        mocks::list_row(
            2231376,
            "Space Adventure Vol. 1",
            "Manga",
            "",
            "background-position:0px -21px",
            false,
            Some("uploader_one"),
            24,
            r#"<div class="gt" title="artist:alpha"><a>alpha</a></div>"#,
        )
    }

    #[test]
    fn parses_a_plain_row() {
        let html = mocks::list_page(&default_row(), None, "Showing 1 result");
        let page = parse_list_page(&html).unwrap();
        assert_eq!(page.items.len(), 1);

        let item = &page.items[0];
        assert_eq!(item.title, "Space Adventure Vol. 1");
        assert_eq!(item.category, Category::Manga);
        assert_eq!(item.rating, 4.5);
        assert!(!item.is_personal_rating);
        assert_eq!(item.uploader.as_deref(), Some("uploader_one"));
        assert_eq!(item.length, 24);
        assert!(item.visible);
        assert_eq!(item.favorite_slot, None);
        assert_eq!(item.tags.len(), 1);
        assert_eq!(item.tags[0].namespace, "artist");
        assert_eq!(page.result_summary, "Showing 1 result");
    }

    #[test]
    fn page_without_pager_defaults_to_one_of_one() {
        let html = mocks::list_page(&default_row(), None, "Showing 1 result");
        let page = parse_list_page(&html).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn pager_cells_give_current_and_total() {
        let html = mocks::list_page(&default_row(), Some((3, 42)), "Showing 25 results");
        let page = parse_list_page(&html).unwrap();
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_pages, 42);
    }

    #[test]
    fn favcat_border_color_maps_to_slot() {
        let row = mocks::list_row(
            7,
            "Favourited",
            "Doujinshi",
            "border-color:#fa0;",
            "background-position:-16px -1px",
            false,
            None,
            8,
            "",
        );
        let html = mocks::list_page(&row, None, "");
        let item = &parse_list_page(&html).unwrap().items[0];
        assert_eq!(item.favorite_slot, Some(2));
        assert_eq!(item.uploader, None, "no anchor means disowned");
    }

    #[test]
    fn line_through_posted_marks_removed_gallery() {
        let row = mocks::list_row(
            8,
            "Gone",
            "Misc",
            "border-color:#000; text-decoration:line-through;",
            "background-position:-80px -1px",
            false,
            Some("someone"),
            4,
            "",
        );
        let html = mocks::list_page(&row, None, "");
        let item = &parse_list_page(&html).unwrap().items[0];
        assert!(!item.visible);
        assert_eq!(item.favorite_slot, Some(0));
        assert_eq!(item.rating, 0.0);
    }

    #[test]
    fn personal_rating_class_is_detected() {
        let row = mocks::list_row(
            9,
            "Rated by me",
            "Non-H",
            "",
            "background-position:-32px -1px",
            true,
            Some("someone"),
            12,
            "",
        );
        let html = mocks::list_page(&row, None, "");
        let item = &parse_list_page(&html).unwrap().items[0];
        assert!(item.is_personal_rating);
        assert_eq!(item.rating, 3.0);
    }

    #[test]
    fn unknown_category_fails_the_page() {
        let row = mocks::list_row(
            10,
            "Oddity",
            "Photobook",
            "",
            "background-position:0px -1px",
            false,
            None,
            1,
            "",
        );
        let html = mocks::list_page(&row, None, "");
        let err = parse_list_page(&html).unwrap_err();
        assert_eq!(err.field, "category");
    }

    #[test]
    fn favourites_chrome_is_decoded_when_present() {
        let html = mocks::favorites_page(&default_row(), "f");
        let page = parse_list_page(&html).unwrap();
        let titles = page.favorite_titles.expect("ten bins expected");
        assert_eq!(titles.len(), 10);
        assert_eq!(titles[0], (0, "Reading".to_string()));
        assert_eq!(titles[9].0, 9);
        assert_eq!(page.favorites_order, Some(FavoritesOrder::Favorited));
    }

    #[test]
    fn non_favourites_page_has_no_favourites_chrome() {
        let html = mocks::list_page(&default_row(), None, "");
        let page = parse_list_page(&html).unwrap();
        assert_eq!(page.favorite_titles, None);
        assert_eq!(page.favorites_order, None);
    }
}
