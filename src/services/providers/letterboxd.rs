//! Letterboxd public activity feed
//!
//! `GET {base}/{username}/rss/` returns an RSS 2.0 document whose
//! `channel/item/title` entries name the films the user logged, newest first,
//! optionally suffixed with a parenthesized release year.

use crate::{
    error::{AppError, AppResult},
    services::providers::HistoryProvider,
};
use reqwest::{Client as HttpClient, Url};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Clone)]
pub struct LetterboxdFeed {
    http_client: HttpClient,
    feed_base_url: String,
}

impl LetterboxdFeed {
    pub fn new(http_client: HttpClient, feed_base_url: String) -> Self {
        Self {
            http_client,
            feed_base_url,
        }
    }

    fn feed_url(&self, username: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.feed_base_url)
            .map_err(|e| AppError::Internal(format!("Invalid feed base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Feed base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(username)
            .push("rss")
            .push("");

        Ok(url)
    }
}

/// Extracts normalized titles from an RSS document, in document order
pub fn parse_feed(xml: &str) -> AppResult<Vec<String>> {
    let document: RssDocument = quick_xml::de::from_str(xml)?;

    Ok(document
        .channel
        .items
        .into_iter()
        .filter_map(|item| item.title)
        .map(|title| normalize_title(&title))
        .filter(|title| !title.is_empty())
        .collect())
}

/// Trims a title and drops a trailing ` (YYYY)` release year
pub fn normalize_title(raw: &str) -> String {
    strip_year_suffix(raw.trim()).trim().to_string()
}

fn strip_year_suffix(title: &str) -> &str {
    let bytes = title.as_bytes();
    if bytes.len() < 6 || !title.ends_with(')') {
        return title;
    }

    let open = bytes.len() - 6;
    let is_year = bytes[open] == b'('
        && bytes[open + 1..bytes.len() - 1]
            .iter()
            .all(u8::is_ascii_digit);

    if is_year {
        &title[..open]
    } else {
        title
    }
}

#[async_trait::async_trait]
impl HistoryProvider for LetterboxdFeed {
    async fn watched_titles(&self, username: &str) -> AppResult<Vec<String>> {
        let url = self.feed_url(username)?;

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(
                username = %username,
                status = %status,
                "Watch history feed request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Feed returned status {}",
                status
            )));
        }

        let xml = response.text().await?;
        let titles = parse_feed(&xml)?;

        tracing::info!(
            username = %username,
            titles = titles.len(),
            provider = self.name(),
            "Watch history fetched"
        );

        Ok(titles)
    }

    fn name(&self) -> &'static str {
        "letterboxd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Letterboxd - ana</title>
    <link>https://letterboxd.com/ana/</link>
    <description>Letterboxd - ana</description>
    <item>
      <title>Heat (1995)</title>
      <link>https://letterboxd.com/ana/film/heat-1995/</link>
      <guid isPermaLink="false">letterboxd-review-1</guid>
      <description><![CDATA[<p>Watched on Sunday.</p>]]></description>
      <dc:creator>ana</dc:creator>
    </item>
    <item>
      <title>Crouching Tiger, Hidden Dragon</title>
      <link>https://letterboxd.com/ana/film/crouching-tiger-hidden-dragon/</link>
    </item>
    <item>
      <title>  Tom &amp; Viv (1994)  </title>
    </item>
  </channel>
</rss>"#;

    fn create_test_feed(base: &str) -> LetterboxdFeed {
        LetterboxdFeed::new(reqwest::Client::new(), base.to_string())
    }

    #[test]
    fn test_parse_feed_normalizes_titles_in_order() {
        let titles = parse_feed(FEED).unwrap();
        assert_eq!(
            titles,
            vec![
                "Heat".to_string(),
                "Crouching Tiger, Hidden Dragon".to_string(),
                "Tom & Viv".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_feed_without_items() {
        let xml = r#"<rss version="2.0"><channel><title>Letterboxd - nobody</title></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_html() {
        let html = "<html><body><h1>Sorry, we can’t find the page</h1></body></html>";
        assert!(matches!(parse_feed(html), Err(AppError::FeedParse(_))));
    }

    #[test]
    fn test_normalize_title_strips_year() {
        assert_eq!(normalize_title("Heat (1995)"), "Heat");
        assert_eq!(normalize_title("Heat(1995)"), "Heat");
        assert_eq!(normalize_title("  Heat  "), "Heat");
    }

    #[test]
    fn test_normalize_title_keeps_other_parentheses() {
        assert_eq!(normalize_title("Nope (Director's Cut)"), "Nope (Director's Cut)");
        assert_eq!(normalize_title("Blade Runner 2049"), "Blade Runner 2049");
        assert_eq!(normalize_title("(1995)"), "");
        assert_eq!(normalize_title("M (19a1)"), "M (19a1)");
    }

    #[test]
    fn test_normalize_title_non_ascii() {
        assert_eq!(normalize_title("Amélie (2001)"), "Amélie");
        assert_eq!(normalize_title("八月"), "八月");
    }

    #[test]
    fn test_feed_url() {
        let feed = create_test_feed("https://letterboxd.com");
        assert_eq!(
            feed.feed_url("ana").unwrap().as_str(),
            "https://letterboxd.com/ana/rss/"
        );
    }

    #[test]
    fn test_feed_url_escapes_username() {
        let feed = create_test_feed("https://letterboxd.com/");
        assert_eq!(
            feed.feed_url("a b/c").unwrap().as_str(),
            "https://letterboxd.com/a%20b%2Fc/rss/"
        );
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_error() {
        let feed = create_test_feed("http://127.0.0.1:1");
        assert!(feed.watched_titles("ana").await.is_err());
    }
}
