//! MediaWiki API access: page listing, per-page content fetch, and the
//! serialized snapshot loop. Requests run one at a time with a fixed pause,
//! which keeps the wiki happy and the output order deterministic.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::categorize;
use crate::config::{api_endpoint, PAGE_BATCH, REQUEST_DELAY};
use crate::model::{Page, Snapshot, SnapshotMetadata};
use crate::snapshot::now_iso;
use crate::wikitext;

const USER_AGENT: &str = concat!("eldermyth_scraper/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT_SECS: u64 = 30;

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

/// All main-namespace page titles, walked via apcontinue.
pub async fn list_all_pages(client: &reqwest::Client, base: &str) -> Result<Vec<String>> {
    let endpoint = api_endpoint(base);
    let mut titles = Vec::new();
    let mut cont: Option<String> = None;
    loop {
        let mut params = vec![
            ("action", "query".to_string()),
            ("list", "allpages".to_string()),
            ("aplimit", PAGE_BATCH.to_string()),
            ("apnamespace", "0".to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(from) = &cont {
            params.push(("apcontinue", from.clone()));
        }
        let body: Value = client
            .get(&endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to list pages")?;

        let (batch, next) = titles_from_response(&body);
        titles.extend(batch);
        cont = next;
        if cont.is_none() {
            break;
        }
        sleep(REQUEST_DELAY).await;
    }
    info!("Listed {} page titles", titles.len());
    Ok(titles)
}

/// One page's markup and categories, parsed into a [`Page`].
pub async fn fetch_page(client: &reqwest::Client, base: &str, title: &str) -> Result<Page> {
    let body: Value = client
        .get(api_endpoint(base))
        .query(&[
            ("action", "query"),
            ("prop", "revisions|categories"),
            ("rvprop", "content"),
            ("rvslots", "main"),
            ("titles", title),
            ("format", "json"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .with_context(|| format!("Failed to fetch page {title}"))?;
    page_from_response(&body, title)
}

/// One rendered wiki page as HTML.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("Failed to fetch {url}"))
}

/// List every page, fetch each serially, and bucket the results. Pages that
/// fail to fetch are logged and skipped rather than failing the run.
pub async fn scrape_snapshot(client: &reqwest::Client, base: &str) -> Result<Snapshot> {
    let titles = list_all_pages(client, base).await?;
    info!("Fetching {} pages from {}", titles.len(), base);

    let pb = ProgressBar::new(titles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut snapshot = Snapshot::default();
    let mut ok = 0usize;
    let mut errors = 0usize;
    for title in &titles {
        match fetch_page(client, base, title).await {
            Ok(page) => {
                ok += 1;
                snapshot.all_pages.insert(page.title.clone(), page.clone());
                categorize::assign(&mut snapshot.categories, page);
            }
            Err(e) => {
                errors += 1;
                warn!("Skipping {}: {}", title, e);
            }
        }
        pb.inc(1);
        sleep(REQUEST_DELAY).await;
    }
    pb.finish_and_clear();
    info!("Fetched {} pages ({} ok, {} errors)", titles.len(), ok, errors);

    snapshot.metadata = SnapshotMetadata {
        source: base.to_string(),
        scraped_at: now_iso(),
        version: "1.0".into(),
        total_pages: snapshot.all_pages.len(),
        stats: categorize::bucket_stats(&snapshot.categories),
    };
    Ok(snapshot)
}

fn titles_from_response(body: &Value) -> (Vec<String>, Option<String>) {
    let titles = body
        .pointer("/query/allpages")
        .and_then(Value::as_array)
        .map(|pages| {
            pages
                .iter()
                .filter_map(|page| page.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let cont = body
        .pointer("/continue/apcontinue")
        .and_then(Value::as_str)
        .map(str::to_string);
    (titles, cont)
}

fn page_from_response(body: &Value, requested: &str) -> Result<Page> {
    let pages = body
        .pointer("/query/pages")
        .and_then(Value::as_object)
        .with_context(|| format!("Malformed response for {requested}: no pages object"))?;
    let page = pages
        .values()
        .next()
        .with_context(|| format!("Malformed response for {requested}: empty pages object"))?;
    let page_id = page
        .get("pageid")
        .and_then(Value::as_i64)
        .with_context(|| format!("page not found: {requested}"))?;

    // the slotted layout arrived with MW 1.32; older mirrors inline the text
    let content = page
        .get("revisions")
        .and_then(Value::as_array)
        .and_then(|revs| revs.first())
        .and_then(|rev| rev.pointer("/slots/main/*").or_else(|| rev.get("*")))
        .and_then(Value::as_str)
        .unwrap_or("");

    let categories = page
        .get("categories")
        .and_then(Value::as_array)
        .map(|cats| {
            cats.iter()
                .filter_map(|cat| cat.get("title").and_then(Value::as_str))
                .map(|cat| cat.trim_start_matches("Category:").to_string())
                .collect()
        })
        .unwrap_or_default();

    let title = page
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(requested);
    Ok(wikitext::parse_page(title, page_id, categories, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn titles_walk_reads_batch_and_continuation() {
        let body = json!({
            "continue": { "apcontinue": "Cthulhu", "continue": "-||" },
            "query": { "allpages": [
                { "pageid": 1, "ns": 0, "title": "Azathoth" },
                { "pageid": 2, "ns": 0, "title": "Carolyn Vance" },
            ]},
        });
        let (titles, cont) = titles_from_response(&body);
        assert_eq!(titles, vec!["Azathoth", "Carolyn Vance"]);
        assert_eq!(cont.as_deref(), Some("Cthulhu"));

        let last = json!({ "query": { "allpages": [] } });
        let (titles, cont) = titles_from_response(&last);
        assert!(titles.is_empty());
        assert!(cont.is_none());
    }

    #[test]
    fn page_response_parses_slotted_revision() {
        let body = json!({
            "query": { "pages": { "41": {
                "pageid": 41,
                "title": "Azathoth",
                "revisions": [ { "slots": { "main": { "*": "== Lore ==\nThe blind god." } } } ],
                "categories": [
                    { "title": "Category:Antagonists" },
                    { "title": "Category:Core Game" },
                ],
            }}},
        });
        let page = page_from_response(&body, "Azathoth").unwrap();
        assert_eq!(page.title, "Azathoth");
        assert_eq!(page.page_id, 41);
        assert_eq!(page.categories, vec!["Antagonists", "Core Game"]);
        assert_eq!(page.sections.get("Lore").unwrap(), "The blind god.");
    }

    #[test]
    fn missing_page_is_an_error() {
        let body = json!({
            "query": { "pages": { "-1": { "ns": 0, "title": "Nope", "missing": "" } } },
        });
        let err = page_from_response(&body, "Nope").unwrap_err();
        assert!(err.to_string().contains("page not found"));
    }
}
