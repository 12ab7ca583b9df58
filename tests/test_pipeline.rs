use async_trait::async_trait;
use craftdb::{CraftDb, CraftError, CrawlConfig, Ingredient, PageSource, ParseError, Workstation};
use mockito::{Mock, ServerGuard};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn item_row(id: u32, name: &str, image_base: &str) -> String {
    let file = name.replace(' ', "_");
    format!(
        "<tr>\n\
         <td><span style=\"white-space:nowrap\"><a href=\"/{file}\" title=\"{name}\"><img alt=\"{file}.png\" src=\"{image_base}/images/{file}.png\" /></a> <a href=\"/{file}\" title=\"{name}\">{name}</a></span>\n\
         </td><td>{id}\n\
         </td></tr>\n"
    )
}

fn item_listing(rows: &[(u32, &str)], image_base: &str) -> String {
    let rows: String = rows.iter().map(|&(id, name)| item_row(id, name, image_base)).collect();
    format!("<h1>Item IDs</h1>\n<table class=\"terraria\">\n<tr><th>Item</th><th>ID</th></tr>\n{rows}</table>\n")
}

/// Table of contents entries followed by one link per section
fn overview(sections: &[(&str, &str)], links: &[&str]) -> String {
    let toc: String = sections
        .iter()
        .enumerate()
        .map(|(index, (anchor, text))| {
            format!(
                "<li class=\"toclevel-1 tocsection-{n}\"><a href=\"#{anchor}\"><span class=\"tocnumber\">{n}</span> <span class=\"toctext\">{text}</span></a></li>\n",
                n = index + 1
            )
        })
        .collect();
    let details: String = links
        .iter()
        .map(|anchor| format!("<h2>{anchor}</h2>\n<div class=\"hatnote\"><a href=\"/Recipes/{anchor}\" title=\"Recipes\">Recipes</a></div>\n"))
        .collect();
    format!("<h1>Recipes</h1>\n<div id=\"toc\" class=\"toc\">\n<ul>\n{toc}</ul>\n</div>\n{details}")
}

fn record(product: &str, product_suffix: &str, ingredients: &[(&str, &str)]) -> String {
    let mut html = format!(
        "<tr><td style=\"text-align:center;width:1%\"><a href=\"/{product}\" title=\"{product}\"><img src=\"x.png\" /></a>\n\
         </td><td rowspan=\"{rows}\"><a href=\"/{product}\" title=\"{product}\">{product}</a>{product_suffix}\n",
        rows = ingredients.len(),
    );
    for (name, suffix) in ingredients {
        html.push_str(&format!(
            "</td></tr><tr><td><a href=\"/{name}\" title=\"{name}\"><img src=\"x.png\" /></a>\n\
             </td><td><a href=\"/{name}\" title=\"{name}\">{name}</a>{suffix}\n"
        ));
    }
    html.push_str("</td></tr>\n");
    html
}

fn recipe_table(records: &[String]) -> String {
    format!("<table class=\"inner\">\n<tr><th>Result</th><th>Ingredients</th></tr>\n{}</table>\n", records.concat())
}

async fn page(server: &mut ServerGuard, path: &str, body: String) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await
}

fn config(server: &ServerGuard, item_pages: u32) -> CrawlConfig {
    let mut config = CrawlConfig {
        base_url: server.url(),
        item_pages,
        concurrency: 2,
        ..CrawlConfig::default()
    };
    config.images.enabled = false;
    config
}

/// A small wiki: two listing pages, three workstation sections
///
/// `missing` names a recipe sub-page left unserved; mockito answers it with 501.
async fn wiki(server: &mut ServerGuard, missing: Option<&str>) -> Vec<Mock> {
    let base = server.url();
    let mut mocks = vec![
        page(
            server,
            "/Item_IDs_Part1",
            item_listing(&[(9, "Wood"), (8, "Torch"), (23, "Gel"), (36, "Work Bench")], &base),
        )
        .await,
        page(
            server,
            "/Item_IDs_Part2",
            item_listing(
                &[(24, "Wooden Sword"), (22, "Iron Bar"), (35, "Iron Anvil"), (716, "Lead Anvil"), (2, "Dirt Block")],
                &base,
            ),
        )
        .await,
        page(
            server,
            "/Recipes",
            overview(
                &[
                    ("By_Hand", "By Hand"),
                    ("Work_Bench", "Work Bench"),
                    ("Iron_Anvil", "<span>Iron Anvil</span> <span>Lead Anvil</span>"),
                ],
                &["By_Hand", "Work_Bench", "Iron_Anvil"],
            ),
        )
        .await,
    ];

    let sub_pages = [
        ("/Recipes/By_Hand", vec![record("Torch", " (3)", &[("Wood", ""), ("Gel", "")])]),
        (
            "/Recipes/Work_Bench",
            vec![
                record("Wooden Sword", "", &[("Wood", " (7)")]),
                record("Work Bench", "", &[("Wood", " (10)")]),
            ],
        ),
        ("/Recipes/Iron_Anvil", vec![record("Iron Anvil", "", &[("Iron Bar", " (5)")])]),
    ];
    for (path, records) in sub_pages {
        if missing != Some(path) {
            mocks.push(page(server, path, recipe_table(&records)).await);
        }
    }
    mocks
}

#[tokio::test]
async fn test_full_harvest() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = wiki(&mut server, None).await;

    let harvest = CraftDb::builder().config(config(&server, 2)).build().await.unwrap();
    assert!(harvest.skipped.is_empty());

    let dataset = harvest.dataset;
    let products: Vec<(u32, Ingredient)> = dataset.recipes.iter().map(|r| (r.id, r.product)).collect();
    assert_eq!(
        products,
        vec![
            (1, Ingredient::new(8, 3)),
            (2, Ingredient::new(24, 1)),
            (3, Ingredient::new(36, 1)),
            (4, Ingredient::new(35, 1)),
        ]
    );
    assert_eq!(dataset.recipes[0].workstations, vec![Workstation::Other("By Hand".to_string())]);
    assert_eq!(dataset.recipes[1].workstations, vec![Workstation::Item(36)]);
    assert_eq!(dataset.recipes[3].workstations, vec![Workstation::Item(35), Workstation::Item(716)]);

    assert_eq!(dataset.relations[&9], vec![1, 2, 3]);
    assert_eq!(dataset.relations[&36], vec![3]);
    // Dangling and workstation-only items are not indexed
    assert!(!dataset.item_index.contains_key(&2));
    assert!(!dataset.item_index.contains_key(&716));
    assert_eq!(dataset.items.len(), 7);
}

#[tokio::test]
async fn test_failed_subpage_is_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = wiki(&mut server, Some("/Recipes/Work_Bench")).await;

    let harvest = CraftDb::builder().config(config(&server, 2)).build().await.unwrap();

    assert_eq!(harvest.skipped.len(), 1);
    assert_eq!(harvest.skipped[0].page, "/Recipes/Work_Bench");
    assert!(matches!(harvest.skipped[0].error, CraftError::HttpStatus { status: 501, .. }));

    let products: Vec<u32> = harvest.dataset.recipes.iter().map(|r| r.product.item).collect();
    assert_eq!(products, vec![8, 35]);
    let ids: Vec<u32> = harvest.dataset.recipes.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_strict_mode_aborts_on_failed_subpage() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = wiki(&mut server, Some("/Recipes/Work_Bench")).await;

    let result = CraftDb::builder().config(config(&server, 2)).strict(true).build().await;
    assert!(matches!(result, Err(CraftError::HttpStatus { .. })));
}

#[tokio::test]
async fn test_partial_page_keeps_parsed_recipes() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let _items = page(&mut server, "/Item_IDs_Part1", item_listing(&[(9, "Wood"), (8, "Torch"), (23, "Gel")], &base)).await;
    let _overview = page(&mut server, "/Recipes", overview(&[("By_Hand", "By Hand")], &["By_Hand"])).await;
    let _recipes = page(
        &mut server,
        "/Recipes/By_Hand",
        recipe_table(&[
            record("Torch", " (3)", &[("Wood", ""), ("Gel", "")]),
            record("Mystery Box", "", &[("Wood", "")]),
        ]),
    )
    .await;

    let harvest = CraftDb::builder().config(config(&server, 1)).build().await.unwrap();

    assert_eq!(harvest.dataset.recipes.len(), 1);
    assert_eq!(harvest.skipped.len(), 1);
    assert!(matches!(
        harvest.skipped[0].error,
        CraftError::Parse(ParseError::UnresolvedReference { ref name, .. }) if name == "Mystery Box"
    ));
}

#[tokio::test]
async fn test_directory_mismatch_always_aborts() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let _items = page(&mut server, "/Item_IDs_Part1", item_listing(&[(9, "Wood")], &base)).await;
    let _overview = page(
        &mut server,
        "/Recipes",
        overview(&[("By_Hand", "By Hand"), ("Work_Bench", "Work Bench")], &["By_Hand"]),
    )
    .await;

    let result = CraftDb::builder().config(config(&server, 1)).build().await;
    assert!(matches!(
        result,
        Err(CraftError::Parse(ParseError::StructuralMismatch { left_count: 2, right_count: 1, .. }))
    ));
}

#[tokio::test]
async fn test_missing_listing_page_is_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = wiki(&mut server, None).await;

    // Part3 is not served, so the catalog stage records one failure and moves on
    let harvest = CraftDb::builder().config(config(&server, 3)).build().await.unwrap();
    assert_eq!(harvest.skipped.len(), 1);
    assert_eq!(harvest.skipped[0].page, "/Item_IDs_Part3");
    assert_eq!(harvest.dataset.recipes.len(), 4);
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected() {
    let result = CraftDb::builder().concurrency(0).build().await;
    assert!(matches!(result, Err(CraftError::Builder(_))));
}

#[tokio::test]
async fn test_images_are_cached_locally() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let _items = page(&mut server, "/Item_IDs_Part1", item_listing(&[(9, "Wood"), (8, "Torch")], &base)).await;
    let _overview = page(&mut server, "/Recipes", overview(&[("By_Hand", "By Hand")], &["By_Hand"])).await;
    let _recipes = page(
        &mut server,
        "/Recipes/By_Hand",
        recipe_table(&[record("Torch", "", &[("Wood", "")])]),
    )
    .await;
    let wood = server
        .mock("GET", "/images/Wood.png")
        .with_status(200)
        .with_body(b"wood-png".to_vec())
        .expect(1)
        .create_async()
        .await;
    let torch = server
        .mock("GET", "/images/Torch.png")
        .with_status(200)
        .with_body(b"torch-png".to_vec())
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, 1);
    config.images.enabled = true;
    config.images.dir = dir.path().join("img");

    let first = CraftDb::builder().config(config.clone()).build().await.unwrap();
    // The second run finds both icons on disk and downloads nothing
    let second = CraftDb::builder().config(config).build().await.unwrap();
    wood.assert_async().await;
    torch.assert_async().await;

    let local = dir.path().join("img").join("Wood.png");
    assert_eq!(std::fs::read(&local).unwrap(), b"wood-png");
    assert_eq!(first.dataset.item_index[&9].image, local.to_string_lossy());
    assert_eq!(first.dataset, second.dataset);
}

/// In-memory wiki whose pages answer after a per-page delay
///
/// A page without a body answers with HTTP 500. Every fetch that runs to
/// completion is recorded in `finished`.
#[derive(Default)]
struct DelayedWiki {
    pages: HashMap<String, (Duration, Option<String>)>,
    finished: Mutex<Vec<String>>,
}

impl DelayedWiki {
    fn page(mut self, path: &str, delay_ms: u64, body: Option<String>) -> Self {
        self.pages.insert(path.to_string(), (Duration::from_millis(delay_ms), body));
        self
    }

    fn finished_sub_pages(&self) -> Vec<String> {
        let finished = self.finished.lock().unwrap();
        finished.iter().filter(|path| path.starts_with("/Recipes/")).cloned().collect()
    }

    /// Three workstation sections; the sub-page bodies and delays are up to the caller
    fn with_sections(sub_pages: [(&str, u64, Option<String>); 3]) -> Self {
        let mut wiki = DelayedWiki::default()
            .page(
                "/Item_IDs_Part1",
                0,
                Some(item_listing(
                    &[(9, "Wood"), (8, "Torch"), (23, "Gel"), (36, "Work Bench"), (24, "Wooden Sword"), (22, "Iron Bar"), (35, "Iron Anvil")],
                    "https://cdn.example.com",
                )),
            )
            .page(
                "/Recipes",
                0,
                Some(overview(
                    &[("By_Hand", "By Hand"), ("Work_Bench", "Work Bench"), ("Iron_Anvil", "Iron Anvil")],
                    &["By_Hand", "Work_Bench", "Iron_Anvil"],
                )),
            );
        for (path, delay_ms, body) in sub_pages {
            wiki = wiki.page(path, delay_ms, body);
        }
        wiki
    }
}

#[async_trait]
impl PageSource for DelayedWiki {
    async fn fetch(&self, path: &str) -> Result<String, CraftError> {
        let (delay, body) = self.pages.get(path).cloned().ok_or_else(|| CraftError::HttpStatus {
            url: path.to_string(),
            status: 404,
        })?;
        tokio::time::sleep(delay).await;
        self.finished.lock().unwrap().push(path.to_string());
        body.ok_or_else(|| CraftError::HttpStatus {
            url: path.to_string(),
            status: 500,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CraftError> {
        Err(CraftError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn offline_config() -> CrawlConfig {
    let mut config = CrawlConfig {
        item_pages: 1,
        concurrency: 3,
        ..CrawlConfig::default()
    };
    config.images.enabled = false;
    config
}

#[tokio::test(start_paused = true)]
async fn test_recipes_follow_directory_order_not_fetch_order() {
    let wiki = Arc::new(DelayedWiki::with_sections([
        (
            "/Recipes/By_Hand",
            300,
            Some(recipe_table(&[record("Torch", " (3)", &[("Wood", ""), ("Gel", "")])])),
        ),
        (
            "/Recipes/Work_Bench",
            200,
            Some(recipe_table(&[record("Wooden Sword", "", &[("Wood", " (7)")])])),
        ),
        (
            "/Recipes/Iron_Anvil",
            0,
            Some(recipe_table(&[record("Iron Anvil", "", &[("Iron Bar", " (5)")])])),
        ),
    ]));

    let harvest = CraftDb::builder()
        .config(offline_config())
        .source(wiki.clone())
        .build()
        .await
        .unwrap();

    // Later sections finished first
    assert_eq!(
        wiki.finished_sub_pages(),
        vec!["/Recipes/Iron_Anvil", "/Recipes/Work_Bench", "/Recipes/By_Hand"]
    );

    let recipes = &harvest.dataset.recipes;
    let order: Vec<(u32, u32)> = recipes.iter().map(|r| (r.id, r.product.item)).collect();
    assert_eq!(order, vec![(1, 8), (2, 24), (3, 35)]);
    assert_eq!(recipes[0].workstations, vec![Workstation::Other("By Hand".to_string())]);
    assert_eq!(recipes[1].workstations, vec![Workstation::Item(36)]);
    assert_eq!(recipes[2].workstations, vec![Workstation::Item(35)]);
}

#[tokio::test(start_paused = true)]
async fn test_strict_failure_cancels_pending_fetches() {
    let wiki = Arc::new(DelayedWiki::with_sections([
        ("/Recipes/By_Hand", 0, None),
        (
            "/Recipes/Work_Bench",
            10_000,
            Some(recipe_table(&[record("Wooden Sword", "", &[("Wood", " (7)")])])),
        ),
        (
            "/Recipes/Iron_Anvil",
            10_000,
            Some(recipe_table(&[record("Iron Anvil", "", &[("Iron Bar", " (5)")])])),
        ),
    ]));

    let result = CraftDb::builder()
        .config(offline_config())
        .source(wiki.clone())
        .strict(true)
        .build()
        .await;
    assert!(matches!(result, Err(CraftError::HttpStatus { status: 500, .. })));

    // Give any fetch that is still running ample time to finish
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(wiki.finished_sub_pages(), vec!["/Recipes/By_Hand"]);
}
