//! Tokenizer for the catalogue search phrase.
//!
//! The scan walks the trimmed input front to back, stripping one token per
//! step. Patterns are all start-anchored and tried in a fixed priority
//! order, so tag syntax always wins over a plain keyword reading. The
//! cursor is the loop's own slice offset; nothing keeps state between
//! calls.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

pub const MAX_TITLE_KEYWORDS: usize = 3;
pub const MIN_KEYWORD_BYTES: usize = 3;

/// Namespace assumed when a tag token does not name one.
pub const DEFAULT_NAMESPACE: &str = "misc";

/// One `namespace:tag` clause of a search phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagClause {
    pub namespace: String,
    pub tag: String,
}

/// A tokenized, validated search phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSearch {
    pub title_keywords: Vec<String>,
    pub uploader: Option<String>,
    pub tag_clauses: Vec<TagClause>,
}

struct TokenPatterns {
    /// `namespace:"phrase with spaces$"`
    ns_quoted: Regex,
    /// `namespace:word$`
    ns_word: Regex,
    /// `"phrase$"`
    quoted: Regex,
    /// `word$`
    word_tag: Regex,
    /// `uploader:value`, no `$` terminator
    uploader: Regex,
    /// anything else up to whitespace
    keyword: Regex,
}

fn token_patterns() -> &'static TokenPatterns {
    static PATTERNS: OnceLock<TokenPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TokenPatterns {
        ns_quoted: Regex::new(r#"^([a-z]+):"([^"]+)\$""#).unwrap(),
        ns_word: Regex::new(r#"^([a-z]+):([^\s"]+)\$"#).unwrap(),
        quoted: Regex::new(r#"^"([^"]+)\$""#).unwrap(),
        word_tag: Regex::new(r#"^([^\s"]+)\$"#).unwrap(),
        uploader: Regex::new(r"^uploader:(\S+)").unwrap(),
        keyword: Regex::new(r"^\S+").unwrap(),
    })
}

/// Split a raw search phrase into tag clauses, an uploader clause and
/// title keywords, enforcing the documented limits.
pub fn tokenize(raw: &str) -> Result<ParsedSearch, ValidationError> {
    let patterns = token_patterns();
    let mut rest = raw.trim();
    let mut parsed = ParsedSearch::default();
    let mut uploader_clauses = 0usize;

    while !rest.is_empty() {
        let consumed = if let Some(caps) = patterns.ns_quoted.captures(rest) {
            parsed.tag_clauses.push(TagClause {
                namespace: caps[1].to_string(),
                tag: caps[2].to_string(),
            });
            caps[0].len()
        } else if let Some(caps) = patterns.ns_word.captures(rest) {
            parsed.tag_clauses.push(TagClause {
                namespace: caps[1].to_string(),
                tag: caps[2].to_string(),
            });
            caps[0].len()
        } else if let Some(caps) = patterns.quoted.captures(rest) {
            parsed.tag_clauses.push(TagClause {
                namespace: DEFAULT_NAMESPACE.to_string(),
                tag: caps[1].to_string(),
            });
            caps[0].len()
        } else if let Some(caps) = patterns.word_tag.captures(rest) {
            parsed.tag_clauses.push(TagClause {
                namespace: DEFAULT_NAMESPACE.to_string(),
                tag: caps[1].to_string(),
            });
            caps[0].len()
        } else if let Some(caps) = patterns.uploader.captures(rest) {
            uploader_clauses += 1;
            parsed.uploader = Some(caps[1].to_string());
            caps[0].len()
        } else if let Some(found) = patterns.keyword.find(rest) {
            parsed.title_keywords.push(found.as_str().to_string());
            found.end()
        } else {
            // Unreachable: a trimmed non-empty input always starts with a
            // non-whitespace byte the keyword pattern accepts.
            break;
        };
        rest = rest[consumed..].trim_start();
    }

    if uploader_clauses > 1 {
        return Err(ValidationError(
            "only one uploader: clause is allowed".to_string(),
        ));
    }
    if parsed.title_keywords.len() > MAX_TITLE_KEYWORDS {
        return Err(ValidationError(format!(
            "at most {MAX_TITLE_KEYWORDS} title keywords are allowed"
        )));
    }
    if let Some(short) = parsed
        .title_keywords
        .iter()
        .find(|k| k.len() < MIN_KEYWORD_BYTES)
    {
        return Err(ValidationError(format!(
            "keyword \"{short}\" is too short, need at least {MIN_KEYWORD_BYTES} bytes"
        )));
    }

    Ok(parsed)
}
