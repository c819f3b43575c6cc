//! RSS and Atom ingestion.
//!
//! Feeds are read with a streaming XML reader so a broken document still yields every
//! entry that was completed before the fault.

use std::time::Duration;
use chrono::{DateTime, Utc};
use el_core::{Article, Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The outcome of parsing one feed document.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub articles: Vec<Article>,
    /// Set when the document was malformed. `articles` still holds the completed entries.
    pub error: Option<String>,
}

impl ParsedFeed {
    pub fn is_malformed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Encoded,
    Summary,
    Content,
    Link,
    Published,
    DcDate,
    Updated,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"description" => Some(Field::Description),
            b"content:encoded" => Some(Field::Encoded),
            b"summary" => Some(Field::Summary),
            b"content" => Some(Field::Content),
            b"link" => Some(Field::Link),
            b"pubDate" | b"published" => Some(Field::Published),
            b"dc:date" => Some(Field::DcDate),
            b"updated" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    title: Option<String>,
    description: Option<String>,
    encoded: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    link: Option<String>,
    alternate_link: Option<String>,
    published: Option<String>,
    dc_date: Option<String>,
    updated: Option<String>,
}

impl EntryBuilder {
    fn set(&mut self, field: Field, value: String) {
        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Encoded => &mut self.encoded,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::DcDate => &mut self.dc_date,
            Field::Updated => &mut self.updated,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Atom links carry the target in `href`; `rel="alternate"` (or no rel) wins.
    fn set_link_from(&mut self, tag: &BytesStart<'_>) {
        let Some(href) = attribute(tag, "href") else {
            return;
        };
        match attribute(tag, "rel").as_deref() {
            None | Some("alternate") => {
                if self.alternate_link.is_none() {
                    self.alternate_link = Some(href);
                }
            }
            Some(_) => {
                if self.link.is_none() {
                    self.link = Some(href);
                }
            }
        }
    }

    fn finish(self, source: &str) -> Article {
        let published = self.published.or(self.dc_date).or(self.updated);
        Article {
            title: self.title.unwrap_or_else(|| Article::UNTITLED.to_string()),
            description: self
                .description
                .or(self.encoded)
                .or(self.summary)
                .or(self.content)
                .unwrap_or_default(),
            link: self.alternate_link.or(self.link).unwrap_or_default(),
            published_at: published.as_deref().and_then(parse_date),
            published: published.unwrap_or_else(|| Article::UNKNOWN_DATE.to_string()),
            source: source.to_string(),
        }
    }
}

fn attribute(tag: &BytesStart<'_>, name: &str) -> Option<String> {
    tag.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty())
}

/// RFC 2822 (RSS) first, then RFC 3339 (Atom).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn is_entry(name: &[u8]) -> bool {
    matches!(name, b"item" | b"entry")
}

/// Parses an RSS 2.0 or Atom document into articles tagged with `source`.
pub fn parse_feed(xml: &str, source: &str) -> ParsedFeed {
    let mut reader = Reader::from_str(xml);
    let mut parsed = ParsedFeed::default();
    let mut entry: Option<EntryBuilder> = None;
    // The field being read and the tag that closes it.
    let mut field: Option<(Field, Vec<u8>)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                let name = tag.name().as_ref().to_vec();
                if is_entry(&name) {
                    entry = Some(EntryBuilder::default());
                    field = None;
                } else if field.is_none() {
                    if let (Some(current), Some(f)) = (entry.as_mut(), Field::from_tag(&name)) {
                        if f == Field::Link {
                            current.set_link_from(&tag);
                        }
                        field = Some((f, name));
                        text.clear();
                    }
                }
            }
            Ok(Event::Empty(tag)) => {
                if field.is_none() && tag.name().as_ref() == b"link" {
                    if let Some(current) = entry.as_mut() {
                        current.set_link_from(&tag);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if field.is_some() {
                    match t.unescape() {
                        Ok(value) => text.push_str(&value),
                        Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(tag)) => {
                let name = tag.name();
                let name = name.as_ref();
                if field.as_ref().is_some_and(|(_, closing)| closing.as_slice() == name) {
                    if let (Some((f, _)), Some(current)) = (field.take(), entry.as_mut()) {
                        current.set(f, std::mem::take(&mut text));
                    }
                } else if is_entry(name) && field.is_none() {
                    if let Some(done) = entry.take() {
                        parsed.articles.push(done.finish(source));
                    }
                }
            }
            Ok(Event::Eof) => {
                if entry.is_some() {
                    parsed.error = Some("Unexpected end of document inside an entry".to_string());
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                parsed.error = Some(format!(
                    "Malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
                break;
            }
        }
    }

    parsed
}

/// Reads feeds from HTTP(S) URLs, `file://` URLs or plain filesystem paths.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("entilytics/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Fetches and parses a feed. Failures are logged and yield an empty list.
    pub async fn fetch_articles(&self, location: &str) -> Vec<Article> {
        tracing::info!("📡 Fetching feed from: {}", location);

        let body = match self.load(location).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("❌ Error fetching feed {}: {}", location, e);
                return Vec::new();
            }
        };

        let parsed = parse_feed(&body, location);
        if let Some(error) = &parsed.error {
            tracing::warn!("⚠️ Feed may have issues ({}): {}", location, error);
        }
        tracing::info!("✨ Fetched {} articles", parsed.articles.len());
        parsed.articles
    }

    async fn load(&self, location: &str) -> Result<String> {
        let location = location.trim();
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let body = self
                    .client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(body)
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::Feed(format!("Invalid file URL: {}", location)))?;
                Ok(tokio::fs::read_to_string(path).await?)
            }
            Ok(url) => Err(Error::Feed(format!("Unsupported feed scheme: {}", url.scheme()))),
            Err(_) => Ok(tokio::fs::read_to_string(location).await?),
        }
    }
}
