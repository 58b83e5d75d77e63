//! Compiles a validated search expression plus filter flags into one
//! parameterized SELECT over the local catalogue.

use crate::domain::models::Category;

use super::tokenizer::ParsedSearch;

/// One bind argument of a compiled query, in predicate order.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArg {
    Text(String),
    Int(i64),
}

/// A ready-to-execute parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub args: Vec<QueryArg>,
}

/// Page-count bounds as typed into the filter fields.
///
/// These are free-form text: anything that does not read as a positive
/// number falls back to 0, and a 0 bound means "unbounded", so its
/// predicate is omitted entirely. Bad numeric input from a text field is
/// never an error.
#[derive(Debug, Clone, Default)]
pub struct PageRange {
    pub min_text: String,
    pub max_text: String,
}

impl PageRange {
    pub fn new(min_text: impl Into<String>, max_text: impl Into<String>) -> Self {
        Self {
            min_text: min_text.into(),
            max_text: max_text.into(),
        }
    }

    fn min(&self) -> i64 {
        parse_bound(&self.min_text)
    }

    fn max(&self) -> i64 {
        parse_bound(&self.max_text)
    }
}

fn parse_bound(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0).max(0)
}

/// Category for each bitmask position; bit 0 is the least significant.
const BIT_CATEGORIES: [Category; 10] = [
    Category::Misc,
    Category::Doujinshi,
    Category::Manga,
    Category::ArtistCg,
    Category::GameCg,
    Category::ImageSet,
    Category::Cosplay,
    Category::AsianPorn,
    Category::NonH,
    Category::Western,
];

const SELECT_KEYS: &str = "SELECT DISTINCT gid || '_' || token FROM downloads";

/// Compile the clause set and filter flags into SQL plus its ordered
/// argument list. An empty filter set yields a statement with no WHERE
/// clause at all.
pub fn compile(
    search: &ParsedSearch,
    category_mask: u32,
    rating_floor: Option<u8>,
    page_range: Option<&PageRange>,
) -> CompiledQuery {
    let mut predicates: Vec<String> = Vec::new();
    let mut args: Vec<QueryArg> = Vec::new();

    for clause in &search.tag_clauses {
        predicates.push(
            "EXISTS (SELECT 1 FROM tags WHERE tags.gid = downloads.gid \
             AND tags.namespace = ? AND tags.tag = ?)"
                .to_string(),
        );
        args.push(QueryArg::Text(clause.namespace.clone()));
        args.push(QueryArg::Text(clause.tag.clone()));
    }

    if let Some(uploader) = &search.uploader {
        predicates.push("uploader = ?".to_string());
        args.push(QueryArg::Text(uploader.clone()));
    }

    for keyword in &search.title_keywords {
        predicates.push("(english_title LIKE ? OR japanese_title LIKE ?)".to_string());
        let like = format!("%{keyword}%");
        args.push(QueryArg::Text(like.clone()));
        args.push(QueryArg::Text(like));
    }

    let excluded: Vec<Category> = BIT_CATEGORIES
        .iter()
        .enumerate()
        .filter(|(bit, _)| category_mask & (1 << bit) != 0)
        .map(|(_, category)| *category)
        .collect();
    if !excluded.is_empty() {
        let holes = vec!["?"; excluded.len()].join(", ");
        predicates.push(format!("category NOT IN ({holes})"));
        for category in excluded {
            args.push(QueryArg::Text(category.as_str().to_string()));
        }
    }

    if let Some(floor) = rating_floor {
        predicates.push("rating >= ?".to_string());
        args.push(QueryArg::Int(i64::from(floor)));
    }

    if let Some(range) = page_range {
        let min = range.min();
        if min > 0 {
            predicates.push("length >= ?".to_string());
            args.push(QueryArg::Int(min));
        }
        let max = range.max();
        if max > 0 {
            predicates.push("length <= ?".to_string());
            args.push(QueryArg::Int(max));
        }
    }

    let sql = if predicates.is_empty() {
        SELECT_KEYS.to_string()
    } else {
        format!("{SELECT_KEYS} WHERE {}", predicates.join(" AND "))
    };

    CompiledQuery { sql, args }
}
