//! Parser for gallery detail pages: metadata block, identifiers, tag
//! table, preview grid and the comment thread.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::domain::models::{
    Category, Comment, GalleryDetail, NewerVersion, VoteState,
};
use crate::error::ParseError;

use super::{decode, selector};

/// Prefix of the score element ids the comment id is carried in.
const COMMENT_SCORE_ID_PREFIX: &str = "comment_score_";

fn script_var_re(pattern: &'static str, cell: &'static OnceLock<Regex>) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

fn gid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(r"var gid\s*=\s*(\d+)", &RE)
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(r#"var token\s*=\s*"([0-9a-f]+)""#, &RE)
}

fn apiuid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(r"var apiuid\s*=\s*(-?\d+)", &RE)
}

fn apikey_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(r#"var apikey\s*=\s*"([0-9a-f]+)""#, &RE)
}

fn css_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(r"url\(([^)]+)\)", &RE)
}

fn leading_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(r"(\d+)", &RE)
}

fn newer_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    script_var_re(
        r#"<a href="([^"]+)"[^>]*>([^<]+)</a>, added ([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2})"#,
        &RE,
    )
}

/// Parse a gallery detail page.
///
/// All-or-nothing: every structurally guaranteed field must decode, or the
/// whole page fails. Optional blocks (parent, newer versions, favourite
/// marker, uploader) degrade to empty.
pub fn parse_gallery_detail(html: &str) -> Result<GalleryDetail, ParseError> {
    let doc = Html::parse_document(html);

    let script = doc
        .select(selector!("script"))
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains("var gid"))
        .ok_or_else(|| ParseError::new("identifier script", html))?;
    let gid = capture_i64(gid_re(), &script, "gid")?;
    let token = capture_string(token_re(), &script, "token")?;
    let api_uid = capture_i64(apiuid_re(), &script, "api uid")?;
    let api_key = capture_string(apikey_re(), &script, "api key")?;

    let url = doc
        .select(selector!(r#"link[rel="canonical"]"#))
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("/g/{gid}/{token}/"));

    let english_title = doc
        .select(selector!("#gn"))
        .next()
        .map(|el| collect_text(&el))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::new("english title", html))?;
    let japanese_title = doc
        .select(selector!("#gj"))
        .next()
        .map(|el| collect_text(&el))
        .filter(|s| !s.is_empty());

    let thumb_el = doc
        .select(selector!("#gd1 div"))
        .next()
        .ok_or_else(|| ParseError::new("thumbnail", html))?;
    let thumbnail_url = css_url_re()
        .captures(thumb_el.value().attr("style").unwrap_or_default())
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| ParseError::new("thumbnail", &thumb_el.html()))?;

    let category_el = doc
        .select(selector!("#gdc div"))
        .next()
        .ok_or_else(|| ParseError::new("category", html))?;
    let category = Category::from_site_name(&collect_text(&category_el))?;

    let uploader = doc
        .select(selector!("#gdn a"))
        .next()
        .map(|el| collect_text(&el))
        .filter(|s| !s.is_empty());

    let meta = parse_meta_table(&doc)?;

    let rating_count = doc
        .select(selector!("#rating_count"))
        .next()
        .and_then(|el| collect_text(&el).parse::<i64>().ok())
        .ok_or_else(|| ParseError::new("rating count", html))?;

    let rating_el = doc
        .select(selector!("#rating_image"))
        .next()
        .ok_or_else(|| ParseError::new("rating", html))?;
    let rating = decode::decode_rating(rating_el.value().attr("style").unwrap_or_default())?;
    let is_personal_rating = rating_el
        .value()
        .classes()
        .any(|c| c == decode::PERSONAL_RATING_CLASS);

    let favorite_slot = doc
        .select(selector!("#fav .i"))
        .next()
        .and_then(|el| decode::sprite_offset_y(el.value().attr("style").unwrap_or_default()))
        .and_then(decode::favcat_from_offset);

    let newer_versions = doc
        .select(selector!("#gnd"))
        .next()
        .map(|el| parse_newer_versions(&el.inner_html()))
        .unwrap_or_default();

    let tags = doc
        .select(selector!("#taglist"))
        .next()
        .map(|el| decode::tags_from_markup(&el.inner_html()))
        .unwrap_or_default();

    let thumbnail_urls = parse_preview_grid(&doc)?;

    let comments = doc
        .select(selector!("#cdiv div.c1"))
        .map(|block| parse_comment(&block))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GalleryDetail {
        gid,
        token,
        api_uid,
        api_key,
        url,
        english_title,
        japanese_title,
        thumbnail_url,
        category,
        uploader,
        posted: meta.posted,
        parent_url: meta.parent_url,
        visible: meta.visible,
        language: meta.language,
        file_size: meta.file_size,
        length: meta.length,
        favorited_count: meta.favorited_count,
        favorite_slot,
        rating_count,
        rating,
        is_personal_rating,
        newer_versions,
        tags,
        thumbnail_urls,
        comments,
    })
}

struct MetaTable {
    posted: String,
    parent_url: Option<String>,
    visible: bool,
    language: String,
    file_size: String,
    length: i64,
    favorited_count: i64,
}

/// The key/value metadata table under the title block.
fn parse_meta_table(doc: &Html) -> Result<MetaTable, ParseError> {
    let mut posted = None;
    let mut parent_url = None;
    let mut visible = None;
    let mut language = None;
    let mut file_size = None;
    let mut length = None;
    let mut favorited_count = None;

    for row in doc.select(selector!("#gdd tr")) {
        let Some(key_cell) = row.select(selector!("td.gdt1")).next() else {
            continue;
        };
        let Some(value_cell) = row.select(selector!("td.gdt2")).next() else {
            continue;
        };
        let value = collect_text(&value_cell);
        match collect_text(&key_cell).as_str() {
            "Posted:" => posted = Some(value),
            "Parent:" => {
                parent_url = value_cell
                    .select(selector!("a"))
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string);
            }
            "Visible:" => visible = Some(value.starts_with("Yes")),
            "Language:" => language = Some(value),
            "File Size:" => file_size = Some(value),
            "Length:" => {
                length = leading_int_re()
                    .captures(&value)
                    .and_then(|caps| caps[1].parse::<i64>().ok());
            }
            "Favorited:" => favorited_count = Some(parse_favorited(&value)?),
            _ => {}
        }
    }

    Ok(MetaTable {
        posted: posted.ok_or_else(|| ParseError::new("posted", "metadata table"))?,
        parent_url,
        visible: visible.ok_or_else(|| ParseError::new("visible", "metadata table"))?,
        language: language.ok_or_else(|| ParseError::new("language", "metadata table"))?,
        file_size: file_size.ok_or_else(|| ParseError::new("file size", "metadata table"))?,
        length: length.ok_or_else(|| ParseError::new("length", "metadata table"))?,
        favorited_count: favorited_count
            .ok_or_else(|| ParseError::new("favorited count", "metadata table"))?,
    })
}

fn parse_favorited(value: &str) -> Result<i64, ParseError> {
    match value.trim() {
        "Never" => Ok(0),
        "Once" => Ok(1),
        "Twice" => Ok(2),
        other => leading_int_re()
            .captures(other)
            .and_then(|caps| caps[1].parse::<i64>().ok())
            .ok_or_else(|| ParseError::new("favorited count", other)),
    }
}

fn parse_newer_versions(markup: &str) -> Vec<NewerVersion> {
    newer_version_re()
        .captures_iter(markup)
        .map(|caps| NewerVersion {
            url: caps[1].to_string(),
            title: caps[2].trim().to_string(),
            added: caps[3].to_string(),
        })
        .collect()
}

/// One preview thumbnail per page: either an `<img>` or a sprite style.
fn parse_preview_grid(doc: &Html) -> Result<Vec<String>, ParseError> {
    let grid = doc
        .select(selector!("#gdt"))
        .next()
        .ok_or_else(|| ParseError::new("preview grid", "no #gdt element"))?;

    let mut urls = Vec::new();
    for cell in grid.select(selector!("a")) {
        let url = cell
            .select(selector!("img"))
            .next()
            .and_then(|img| img.value().attr("src").map(str::to_string))
            .or_else(|| {
                cell.select(selector!("div")).next().and_then(|div| {
                    css_url_re()
                        .captures(div.value().attr("style").unwrap_or_default())
                        .map(|caps| caps[1].to_string())
                })
            })
            .ok_or_else(|| ParseError::new("preview thumbnail", &cell.html()))?;
        urls.push(url);
    }
    Ok(urls)
}

/// Classify one comment block.
///
/// The vote cell decides between four mutually exclusive cases, tried in
/// order: uploader comment, plain non-votable comment, the viewer's own
/// comment, votable comment.
fn parse_comment(block: &ElementRef<'_>) -> Result<Comment, ParseError> {
    let byline = block
        .select(selector!("div.c3"))
        .next()
        .ok_or_else(|| ParseError::new("comment byline", &block.html()))?;
    let commenter = byline
        .select(selector!("a"))
        .next()
        .map(|a| collect_text(&a))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::new("commenter", &byline.html()))?;
    let byline_text = byline.text().collect::<String>();
    let posted = byline_text
        .trim()
        .strip_prefix("Posted on ")
        .and_then(|rest| rest.split(" by:").next())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ParseError::new("comment posted", &byline_text))?;

    let body_html = block
        .select(selector!("div.c6"))
        .next()
        .map(|el| el.inner_html().trim().to_string())
        .ok_or_else(|| ParseError::new("comment body", &block.html()))?;

    let vote_cell = block.select(selector!("div.c4")).next();
    let anchors: Vec<ElementRef<'_>> = vote_cell
        .map(|cell| cell.select(selector!("a")).collect())
        .unwrap_or_default();

    let vote_state = match vote_cell {
        Some(_) if anchors.iter().any(|a| a.value().attr("name").is_some()) => {
            // The uploader's pinned comment has no id, score or votes.
            return Ok(Comment {
                posted,
                commenter,
                comment_id: None,
                score: None,
                vote_state: VoteState::Uploader,
                body_html,
            });
        }
        None => VoteState::NonVotable,
        Some(_) if anchors.len() < 2 => VoteState::SelfComment,
        Some(_) => {
            let styled = |a: &ElementRef<'_>| {
                a.value().attr("style").is_some_and(|s| !s.trim().is_empty())
            };
            let my_vote = if styled(&anchors[0]) {
                Some(1)
            } else if styled(&anchors[1]) {
                Some(-1)
            } else {
                None
            };
            VoteState::Votable { my_vote }
        }
    };

    let score_el = block
        .select(selector!(r#"div.c5 span[id^="comment_score_"]"#))
        .next();
    let comment_id = score_el.and_then(|el| {
        el.value()
            .attr("id")
            .and_then(|id| id.strip_prefix(COMMENT_SCORE_ID_PREFIX))
            .and_then(|id| id.parse::<i64>().ok())
    });
    let score = score_el
        .map(|el| collect_text(&el))
        .filter(|s| !s.is_empty());

    Ok(Comment {
        posted,
        commenter,
        comment_id,
        score,
        vote_state,
        body_html,
    })
}

fn capture_i64(re: &Regex, text: &str, field: &'static str) -> Result<i64, ParseError> {
    re.captures(text)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .ok_or_else(|| ParseError::new(field, text))
}

fn capture_string(re: &Regex, text: &str, field: &'static str) -> Result<String, ParseError> {
    re.captures(text)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| ParseError::new(field, text))
}

fn collect_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
