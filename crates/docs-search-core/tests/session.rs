use std::path::PathBuf;

use docs_search_core::{
    bootstrap, bootstrap_from, interactive::serve_lines, markdown, SearchSession, ViewerConfig,
};
use docs_search_index::InlineSource;
use serde_json::Value;

const DRAW_SHARD: &str = "var searchData=\n[\n\
  ['draw',['Draw',['../classDynacoe_1_1Entity.html#a3d',1,'Dynacoe::Entity::Draw()'],\
['../classDynacoe_1_1Graphics.html#a7d',1,'Dynacoe::Graphics::Draw(Render2D &amp;)']]],\n\
  ['drawduration',['DrawDuration',['../classDynacoe_1_1Graphics.html#a6e',1,'Dynacoe::Graphics']]]\n\
];\n";

fn config(max_results: usize) -> ViewerConfig {
    ViewerConfig {
        site_root: "https://docs.example.com/dynacoe".to_string(),
        max_results,
        ..ViewerConfig::default()
    }
}

async fn draw_session(max_results: usize) -> SearchSession {
    let source = InlineSource::default().with_shard("all_3", DRAW_SHARD);
    bootstrap_from(config(max_results), &source)
        .await
        .expect("bootstrap succeeds")
}

#[tokio::test]
async fn search_resolves_links_and_caps_hits() {
    let session = draw_session(2).await;
    let page = session.search("DRA");

    assert_eq!(page.total, 3);
    assert_eq!(page.hits.len(), 2);
    assert!(page.truncated());
    assert_eq!(
        page.hits[1].url,
        "https://docs.example.com/dynacoe/classDynacoe_1_1Graphics.html#a7d"
    );

    let everything = session.search_with_limit("dra", 0);
    assert_eq!(everything.hits.len(), 3);
    assert!(!everything.truncated());
}

#[tokio::test]
async fn no_match_is_an_empty_page() {
    let session = draw_session(20).await;
    let page = session.search("draws");
    assert_eq!(page.total, 0);
    assert!(page.hits.is_empty());
}

#[tokio::test]
async fn keys_lists_matching_entries() {
    let session = draw_session(20).await;
    let keys = session.keys("draw");
    let names: Vec<&str> = keys.iter().map(|summary| summary.key.as_str()).collect();
    assert_eq!(names, vec!["draw", "drawduration"]);
    assert_eq!(keys[0].results, 2);
}

#[tokio::test]
async fn markdown_page_rendering() {
    let session = draw_session(2).await;
    let rendered = markdown::search_page(&session.search("dra"));

    insta::assert_snapshot!(rendered, @r###"
    # Search results for "dra"

    **Matches:** 3

    - [Draw](https://docs.example.com/dynacoe/classDynacoe_1_1Entity.html#a3d) — `Dynacoe::Entity::Draw()`
    - [Draw](https://docs.example.com/dynacoe/classDynacoe_1_1Graphics.html#a7d) — `Dynacoe::Graphics::Draw(Render2D &)`

    _Showing 2 of 3 matches._
    "###);
}

#[tokio::test]
async fn interactive_answers_each_line() {
    let session = draw_session(20).await;
    let input: &[u8] = b"d\ndrawd\nzzzznotfound\n";
    let mut output = Vec::new();

    let answered = serve_lines(&session, input, &mut output)
        .await
        .expect("interactive loop");
    assert_eq!(answered, 3);

    let text = String::from_utf8(output).expect("utf-8 output");
    let pages: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0]["total"], 3);
    assert_eq!(pages[1]["hits"][0]["label"], "DrawDuration");
    assert_eq!(pages[1]["hits"][0]["scope"], "Dynacoe::Graphics");
    assert_eq!(pages[2]["total"], 0);
}

#[tokio::test]
async fn generated_fixtures_bootstrap() {
    let config = ViewerConfig {
        shard_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../docs-search-index/tests/fixtures/search"),
        ..config(0)
    };
    let session = bootstrap(config).await.expect("fixtures load");

    assert!(session.report().is_complete());
    let page = session.search("define");
    // define, defineregion and definevertices from both shards
    assert_eq!(page.total, 12);
    assert_eq!(
        page.hits[0].url,
        "https://docs.example.com/dynacoe/classDynacoe_1_1AudioBlock.html#a6965a197c9533b1ddb9872fce636d885"
    );
}
