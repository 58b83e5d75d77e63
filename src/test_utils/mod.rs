//! Shared test support: an in-memory catalogue pool and builders for the
//! fixture pages the extractor tests parse.

/// Database fixtures.
pub mod fixtures {
    use sqlx::SqlitePool;

    use crate::domain::models::{Category, DownloadEntry, TagGroup};

    /// Creates an in-memory SQLite database with migrations applied.
    pub async fn setup_test_db() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    /// A minimal catalogue entry keyed by `gid`.
    pub fn sample_entry(gid: i64) -> DownloadEntry {
        DownloadEntry {
            gid,
            token: format!("token{gid}"),
            category: Category::Manga,
            english_title: format!("Sample Gallery {gid}"),
            japanese_title: None,
            length: 24,
            posted: "2026-01-10 12:00".into(),
            rating: 4.5,
            uploader: Some("uploader_one".into()),
            tags: vec![TagGroup {
                namespace: "artist".into(),
                tags: vec!["alpha".into()],
            }],
        }
    }
}

/// Fixture page builders mirroring the site markup the extractor decodes.
pub mod mocks {
    /// One compact-listing row.
    #[allow(clippy::too_many_arguments)]
    pub fn list_row(
        gid: i64,
        title: &str,
        category: &str,
        posted_style: &str,
        rating_style: &str,
        personal: bool,
        uploader: Option<&str>,
        pages: i64,
        tag_markup: &str,
    ) -> String {
        let uploader_cell = match uploader {
            Some(name) => format!(r#"<a href="https://gal.example/uploader/{name}">{name}</a>"#),
            None => String::new(),
        };
        let rating_class = if personal { "ir irb" } else { "ir" };
        format!(
            r#"<tr>
  <td class="gl1c glcat"><div class="cn">{category}</div></td>
  <td class="gl2c">
    <div class="glthumb"><img src="https://img.example/t/{gid}.jpg" title="{title}"></div>
    <div id="posted_{gid}" style="{posted_style}">2026-01-10 12:00</div>
    <div class="{rating_class}" style="{rating_style}"></div>
  </td>
  <td class="gl3c glname"><a href="https://gal.example/g/{gid}/deadbeef00/"><div class="glink">{title}</div>{tag_markup}</a></td>
  <td class="gl4c glhide">{uploader_cell}<div>{pages} pages</div></td>
</tr>"#
        )
    }

    /// A listing page around prebuilt rows.
    pub fn list_page(rows: &str, pager: Option<(i64, i64)>, summary: &str) -> String {
        let pager_html = pager
            .map(|(current, total)| {
                format!(
                    r#"<table class="ptt"><tr><td><a>&lt;</a></td><td class="ptds"><a>{current}</a></td><td><a>{total}</a></td><td><a>&gt;</a></td></tr></table>"#
                )
            })
            .unwrap_or_default();
        format!(
            r#"<html><body>
<p class="ip">{summary}</p>
<table class="itg gltc">{rows}</table>
{pager_html}
</body></html>"#
        )
    }

    /// A favourites listing: ten bins plus the order selector.
    pub fn favorites_page(rows: &str, order_value: &str) -> String {
        let bin_names = [
            "Reading", "Classics", "Artists", "Series", "Later",
            "Maybe", "Translated", "Raw", "Archive", "Everything else",
        ];
        let bins: String = bin_names
            .iter()
            .enumerate()
            .map(|(slot, name)| {
                format!(
                    r#"<div class="fp"><div>{slot}</div><div class="i"></div><div>{name}</div></div>"#
                )
            })
            .collect();
        let order = format!(
            r#"<select name="fs"><option value="p"{}>Posted Time</option><option value="f"{}>Favorited Time</option></select>"#,
            if order_value == "p" { " selected" } else { "" },
            if order_value == "f" { " selected" } else { "" },
        );
        format!(
            r#"<html><body>
<div class="ido">{bins}{order}</div>
<p class="ip">Showing 1 result</p>
<table class="itg gltc">{rows}</table>
</body></html>"#
        )
    }

    /// A gallery detail page. `fav_offset` is the vertical sprite offset of
    /// the favourite marker; `newer` is a prebuilt `#gnd` block or empty.
    pub fn detail_page(
        gid: i64,
        token: &str,
        comments: &str,
        fav_offset: Option<i64>,
        newer: &str,
        parent: Option<&str>,
    ) -> String {
        let fav = fav_offset
            .map(|y| {
                format!(
                    r#"<div id="fav"><div class="i" style="background-position:0px -{y}px"></div></div>"#
                )
            })
            .unwrap_or_default();
        let parent_cell = match parent {
            Some(url) => format!(r#"<a href="{url}">{url}</a>"#),
            None => "None".to_string(),
        };
        format!(
            r#"<html><head><link rel="canonical" href="https://gal.example/g/{gid}/{token}/"></head>
<body>
<script type="text/javascript">
var gid = {gid};
var token = "{token}";
var apiuid = 4321;
var apikey = "0123456789abcdef";
</script>
<div id="gd1"><div style="width:250px; background:transparent url(https://img.example/t/{gid}-cover.jpg) no-repeat"></div></div>
<h1 id="gn">Sample Gallery {gid}</h1>
<h1 id="gj">サンプルギャラリー</h1>
<div id="gdc"><div class="cs">Manga</div></div>
<div id="gdn"><a href="https://gal.example/uploader/uploader_one">uploader_one</a></div>
<div id="gdd"><table>
<tr><td class="gdt1">Posted:</td><td class="gdt2">2026-01-10 12:00</td></tr>
<tr><td class="gdt1">Parent:</td><td class="gdt2">{parent_cell}</td></tr>
<tr><td class="gdt1">Visible:</td><td class="gdt2">Yes</td></tr>
<tr><td class="gdt1">Language:</td><td class="gdt2">Japanese</td></tr>
<tr><td class="gdt1">File Size:</td><td class="gdt2">25.6 MiB</td></tr>
<tr><td class="gdt1">Length:</td><td class="gdt2">24 pages</td></tr>
<tr><td class="gdt1">Favorited:</td><td class="gdt2">96 times</td></tr>
</table></div>
<div id="gdr"><table><tr>
<td id="grt3"><span id="rating_count">161</span></td>
<td><div id="rating_image" class="ir" style="background-position:-16px -1px"></div></td>
<td id="rating_label">Average: 4.03</td>
</tr></table></div>
{fav}
{newer}
<div id="taglist"><table>
<tr><td class="tc">artist:</td><td><div class="gt" title="artist:alpha"><a>alpha</a></div></td></tr>
<tr><td class="tc">female:</td><td><div class="gt" title="female:glasses"><a>glasses</a></div><div class="gt" title="female:ponytail"><a>ponytail</a></div></td></tr>
</table></div>
<div id="gdt">
<a href="https://gal.example/s/aaa/{gid}-1"><div title="Page 1" style="background:transparent url(https://img.example/p/{gid}-01.jpg) no-repeat"></div></a>
<a href="https://gal.example/s/bbb/{gid}-2"><div title="Page 2" style="background:transparent url(https://img.example/p/{gid}-02.jpg) no-repeat"></div></a>
</div>
<div id="cdiv">{comments}</div>
</body></html>"#
        )
    }

    fn comment_block(byline_name: &str, vote_cell: &str, score_cell: &str) -> String {
        format!(
            r#"<div class="c1"><div class="c2">
<div class="c3">Posted on 11 January 2026, 09:30 by: <a href="https://gal.example/uploader/{byline_name}">{byline_name}</a></div>
{vote_cell}
{score_cell}
</div><div class="c6">A comment body.</div></div>"#
        )
    }

    /// The uploader's pinned comment: a named anchor, no score cell.
    pub fn comment_uploader(commenter: &str) -> String {
        comment_block(
            commenter,
            r#"<div class="c4"><a name="ulcomment"></a>Uploader Comment</div>"#,
            "",
        )
    }

    /// An ordinary comment the viewer cannot vote on: no vote cell.
    pub fn comment_plain(id: i64, commenter: &str, score: &str) -> String {
        comment_block(
            commenter,
            "",
            &format!(r#"<div class="c5">Score <span id="comment_score_{id}">{score}</span></div>"#),
        )
    }

    /// The viewer's own comment: the vote cell holds a single edit anchor.
    pub fn comment_self(id: i64, commenter: &str, score: &str) -> String {
        comment_block(
            commenter,
            &format!(r##"<div class="c4"><a href="#" onclick="edit_comment({id})">Edit</a></div>"##),
            &format!(r#"<div class="c5">Score <span id="comment_score_{id}">{score}</span></div>"#),
        )
    }

    /// A votable comment; a non-empty style on a vote anchor marks the
    /// viewer's current vote.
    pub fn comment_votable(
        id: i64,
        commenter: &str,
        score: &str,
        up_style: &str,
        down_style: &str,
    ) -> String {
        comment_block(
            commenter,
            &format!(
                r##"<div class="c4"><a href="#" style="{up_style}" onclick="vote_comment({id},1)">Vote+</a> <a href="#" style="{down_style}" onclick="vote_comment({id},-1)">Vote-</a></div>"##
            ),
            &format!(r#"<div class="c5">Score <span id="comment_score_{id}">{score}</span></div>"#),
        )
    }

    /// A multi-page viewer bootstrap page with `count` sequential pages.
    pub fn mpv_page(gid: i64, mpv_key: &str, count: usize) -> String {
        let names: Vec<String> = (1..=count).map(|i| format!("page-{i}.jpg")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        mpv_page_with_names(gid, mpv_key, &name_refs)
    }

    /// A viewer page whose entries carry the given file names.
    pub fn mpv_page_with_names(gid: i64, mpv_key: &str, names: &[&str]) -> String {
        let entries: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let page = index + 1;
                format!(
                    r#"{{"n":{},"k":"key{page}","t":"https://img.example/m/{gid}/{page}.jpg"}}"#,
                    serde_json::to_string(name).expect("file name serializes"),
                )
            })
            .collect();
        let imagelist = entries.join(",");
        format!(
            r#"<html><head>
<script type="text/javascript" src="https://gal.example/z/mpv.js"></script>
<script type="text/javascript">
var gid = {gid};
var mpvkey = "{mpv_key}";
var pagecount = {count};
var imagelist = [{imagelist}];
</script>
</head><body><div id="pane_images"></div></body></html>"#,
            count = names.len(),
        )
    }
}
