//! Typed domain model for gallery pages and the local catalogue.
//!
//! Everything here is an immutable value object: constructed once by the
//! extraction engine, owned by the caller, never shared mutably.

use serde::Serialize;

use crate::error::ParseError;

// ====== Category ======

/// The ten gallery categories the site recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Misc,
    Doujinshi,
    Manga,
    ArtistCg,
    GameCg,
    ImageSet,
    Cosplay,
    AsianPorn,
    NonH,
    Western,
}

impl Category {
    pub const ALL: [Category; 10] = [
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

    /// Canonical site spelling, as shown in listing cells and stored in the
    /// catalogue.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Misc => "Misc",
            Category::Doujinshi => "Doujinshi",
            Category::Manga => "Manga",
            Category::ArtistCg => "Artist CG",
            Category::GameCg => "Game CG",
            Category::ImageSet => "Image Set",
            Category::Cosplay => "Cosplay",
            Category::AsianPorn => "Asian Porn",
            Category::NonH => "Non-H",
            Category::Western => "Western",
        }
    }

    /// Accent colour for the category badge.
    pub fn accent_color(&self) -> &'static str {
        match self {
            Category::Misc => "#f06292",
            Category::Doujinshi => "#f44336",
            Category::Manga => "#ff9800",
            Category::ArtistCg => "#fbc02d",
            Category::GameCg => "#4caf50",
            Category::ImageSet => "#3f51b5",
            Category::Cosplay => "#9c27b0",
            Category::AsianPorn => "#9575cd",
            Category::NonH => "#2196f3",
            Category::Western => "#8bc34a",
        }
    }

    /// Decode a category string found on a page or in the catalogue.
    ///
    /// An unrecognized name is a hard parse failure, never a silent
    /// default: it signals an upstream format change.
    pub fn from_site_name(name: &str) -> Result<Self, ParseError> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == name.trim())
            .copied()
            .ok_or_else(|| ParseError::new("category", name))
    }
}

/// Sort order active on a favourites listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FavoritesOrder {
    /// Most recently favourited first.
    Favorited,
    /// Gallery posted time.
    Posted,
}

// ====== Tags ======

/// Tags of one namespace, in page encounter order. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    pub namespace: String,
    pub tags: Vec<String>,
}

// ====== List pages ======

#[derive(Debug, Clone, Serialize)]
pub struct GalleryListItem {
    pub url: String,
    pub title: String,
    pub thumbnail_url: String,
    pub category: Category,
    pub posted: String,
    /// False once the gallery has been expunged from the site.
    pub visible: bool,
    /// Favourite bin 0-9 when the gallery is favourited.
    pub favorite_slot: Option<u8>,
    /// 0 to 5 in half-star steps.
    pub rating: f32,
    /// True when the sprite shows the viewer's own rating.
    pub is_personal_rating: bool,
    /// Absent for disowned galleries.
    pub uploader: Option<String>,
    /// Page count.
    pub length: i64,
    pub tags: Vec<TagGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryListPage {
    pub items: Vec<GalleryListItem>,
    pub current_page: i64,
    pub total_pages: i64,
    /// `(slot, title)` pairs; present on favourites listings only.
    pub favorite_titles: Option<Vec<(u8, String)>>,
    pub favorites_order: Option<FavoritesOrder>,
    pub result_summary: String,
}

// ====== Gallery detail ======

/// A newer revision of a gallery, linked from its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewerVersion {
    pub url: String,
    pub title: String,
    pub added: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryDetail {
    pub gid: i64,
    pub token: String,
    pub api_uid: i64,
    pub api_key: String,
    pub url: String,
    pub english_title: String,
    pub japanese_title: Option<String>,
    pub thumbnail_url: String,
    pub category: Category,
    pub uploader: Option<String>,
    pub posted: String,
    pub parent_url: Option<String>,
    pub visible: bool,
    pub language: String,
    pub file_size: String,
    pub length: i64,
    pub favorited_count: i64,
    pub favorite_slot: Option<u8>,
    pub rating_count: i64,
    pub rating: f32,
    pub is_personal_rating: bool,
    pub newer_versions: Vec<NewerVersion>,
    pub tags: Vec<TagGroup>,
    /// One preview thumbnail per page, in page order.
    pub thumbnail_urls: Vec<String>,
    pub comments: Vec<Comment>,
}

impl GalleryDetail {
    /// Composite key used by the catalogue and the download manager.
    pub fn dl_key(&self) -> String {
        format!("{}_{}", self.gid, self.token)
    }
}

// ====== Comments ======

/// Vote-related state of a comment: exactly one of four cases, so the
/// illegal flag combinations cannot be represented at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VoteState {
    /// The uploader's pinned comment; carries no id, score or votes.
    Uploader,
    /// An ordinary comment the viewer cannot vote on.
    NonVotable,
    /// The viewer's own comment.
    SelfComment,
    /// A votable comment, with the viewer's current vote if any (+1/-1).
    Votable { my_vote: Option<i8> },
}

impl VoteState {
    pub fn is_uploader(&self) -> bool {
        matches!(self, VoteState::Uploader)
    }

    pub fn voteable(&self) -> bool {
        matches!(self, VoteState::Votable { .. })
    }

    pub fn is_self_comment(&self) -> bool {
        matches!(self, VoteState::SelfComment)
    }

    pub fn my_vote(&self) -> Option<i8> {
        match self {
            VoteState::Votable { my_vote } => *my_vote,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub posted: String,
    pub commenter: String,
    pub comment_id: Option<i64>,
    /// Score display string, e.g. "+12".
    pub score: Option<String>,
    pub vote_state: VoteState,
    /// Raw inner markup of the comment body.
    pub body_html: String,
}

// ====== Multi-page viewer ======

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MpvImage {
    /// 1-based page index, zero-padded to the width of the page count.
    pub img_id: String,
    pub key: String,
    pub page: i64,
    pub name: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MpvImageManifest {
    pub gid: i64,
    pub mpv_key: String,
    pub images: Vec<MpvImage>,
}

// ====== Local catalogue ======

/// The catalogue row persisted for a downloaded gallery.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadEntry {
    pub gid: i64,
    pub token: String,
    pub category: Category,
    pub english_title: String,
    pub japanese_title: Option<String>,
    pub length: i64,
    pub posted: String,
    pub rating: f32,
    pub uploader: Option<String>,
    pub tags: Vec<TagGroup>,
}

impl DownloadEntry {
    pub fn from_detail(detail: &GalleryDetail) -> Self {
        Self {
            gid: detail.gid,
            token: detail.token.clone(),
            category: detail.category,
            english_title: detail.english_title.clone(),
            japanese_title: detail.japanese_title.clone(),
            length: detail.length,
            posted: detail.posted.clone(),
            rating: detail.rating,
            uploader: detail.uploader.clone(),
            tags: detail.tags.clone(),
        }
    }

    pub fn dl_key(&self) -> String {
        format!("{}_{}", self.gid, self.token)
    }
}
