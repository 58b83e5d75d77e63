//! End-to-end catalogue search: entries in, phrase through the tokenizer
//! and compiler, composite keys out of the sqlite store.

use galdex::domain::models::{Category, DownloadEntry, TagGroup};
use galdex::repository::sqlite::DownloadRepository;
use galdex::repository::DownloadRepository as _;
use galdex::search::{compile, tokenize, PageRange, ParsedSearch};
use galdex::test_utils::fixtures;

fn entry(
    gid: i64,
    category: Category,
    english_title: &str,
    japanese_title: Option<&str>,
    length: i64,
    rating: f32,
    uploader: &str,
    tags: &[(&str, &str)],
) -> DownloadEntry {
    let mut groups: Vec<TagGroup> = Vec::new();
    for (namespace, tag) in tags {
        match groups.iter_mut().find(|g| g.namespace == *namespace) {
            Some(group) => group.tags.push((*tag).to_string()),
            None => groups.push(TagGroup {
                namespace: (*namespace).to_string(),
                tags: vec![(*tag).to_string()],
            }),
        }
    }
    DownloadEntry {
        gid,
        token: format!("t{gid:09}"),
        category,
        english_title: english_title.to_string(),
        japanese_title: japanese_title.map(str::to_string),
        length,
        posted: "2026-01-10 12:00".into(),
        rating,
        uploader: Some(uploader.to_string()),
        tags: groups,
    }
}

async fn seeded_repo() -> DownloadRepository {
    let pool = fixtures::setup_test_db().await;
    let repo = DownloadRepository::new(pool);

    repo.put(&entry(
        1,
        Category::Manga,
        "Space Adventure Vol. 1",
        None,
        24,
        4.5,
        "uploader_one",
        &[("artist", "alpha"), ("female", "glasses")],
    ))
    .await
    .unwrap();
    repo.put(&entry(
        2,
        Category::Doujinshi,
        "Ocean Story",
        Some("海の物語"),
        180,
        3.0,
        "uploader_two",
        &[("artist", "beta")],
    ))
    .await
    .unwrap();
    repo.put(&entry(
        3,
        Category::NonH,
        "Space Station Guide",
        None,
        64,
        5.0,
        "uploader_one",
        &[("artist", "alpha"), ("male", "glasses")],
    ))
    .await
    .unwrap();

    repo
}

async fn run(repo: &DownloadRepository, phrase: &str) -> Vec<String> {
    let query = compile(&tokenize(phrase).unwrap(), 0, None, None);
    let mut keys = repo.search(&query).await.unwrap();
    keys.sort();
    keys
}

#[tokio::test]
async fn tag_clause_matches_namespace_and_text() {
    let repo = seeded_repo().await;

    assert_eq!(run(&repo, "artist:alpha$").await, vec!["1_t000000001", "3_t000000003"]);
    assert_eq!(run(&repo, "female:glasses$").await, vec!["1_t000000001"]);
    // Bare exact tokens search the misc namespace, which nothing here uses.
    assert!(run(&repo, "glasses$").await.is_empty());
}

#[tokio::test]
async fn uploader_clause_is_an_equality_predicate() {
    let repo = seeded_repo().await;

    assert_eq!(run(&repo, "uploader:uploader_two").await, vec!["2_t000000002"]);
    assert_eq!(
        run(&repo, "uploader:uploader_one").await,
        vec!["1_t000000001", "3_t000000003"]
    );
}

#[tokio::test]
async fn title_keywords_search_both_title_columns() {
    let repo = seeded_repo().await;

    assert_eq!(run(&repo, "space").await, vec!["1_t000000001", "3_t000000003"]);
    // Keywords AND together.
    assert_eq!(run(&repo, "space station").await, vec!["3_t000000003"]);
    // A keyword can hit the japanese title column.
    assert_eq!(run(&repo, "物語").await, vec!["2_t000000002"]);
}

#[tokio::test]
async fn category_mask_excludes_marked_categories() {
    let repo = seeded_repo().await;

    // Bit 8 excludes Non-H.
    let query = compile(&tokenize("artist:alpha$").unwrap(), 1 << 8, None, None);
    assert_eq!(repo.search(&query).await.unwrap(), vec!["1_t000000001"]);

    // A zero mask excludes nothing.
    let query = compile(&tokenize("artist:alpha$").unwrap(), 0, None, None);
    assert_eq!(repo.search(&query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn rating_floor_and_page_range_are_numeric_bounds() {
    let repo = seeded_repo().await;

    let query = compile(&ParsedSearch::default(), 0, Some(4), None);
    let mut keys = repo.search(&query).await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["1_t000000001", "3_t000000003"]);

    let range = PageRange::new("50", "200");
    let query = compile(&ParsedSearch::default(), 0, None, Some(&range));
    let mut keys = repo.search(&query).await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["2_t000000002", "3_t000000003"]);

    // Garbage bounds degrade to "unbounded" instead of failing.
    let range = PageRange::new("plenty", "");
    let query = compile(&ParsedSearch::default(), 0, None, Some(&range));
    assert_eq!(repo.search(&query).await.unwrap().len(), 3);
}

#[tokio::test]
async fn empty_phrase_and_no_filters_list_the_whole_catalogue() {
    let repo = seeded_repo().await;

    let query = compile(&tokenize("").unwrap(), 0, None, None);
    assert!(!query.sql.contains("WHERE"));
    assert_eq!(repo.search(&query).await.unwrap().len(), 3);
}

#[tokio::test]
async fn validation_failures_block_compilation() {
    assert!(tokenize("one two three four").is_err());
    assert!(tokenize("uploader:a uploader:b").is_err());
    assert!(tokenize("hi").is_err());
}
