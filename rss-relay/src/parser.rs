use crate::types::{FeedPost, ParsedFeed, RelayError, Result};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, info, warn};

pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS/Atom document, keeping entries in feed order.
    pub fn parse_feed(&self, content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        // feed-rs invents ids for entries without one; keep them empty so the
        // link fallback below applies.
        let feed = parser::Builder::new()
            .id_generator(|_links, _title, _uri| String::new())
            .build()
            .parse(content)
            .map_err(|e| RelayError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);

        // feed-rs normalises dates; the report wants them as published.
        let mut raw_dates = raw_entry_dates(content).into_iter();

        let entries: Vec<FeedPost> = feed
            .entries
            .into_iter()
            .map(|entry| Self::parse_entry(entry, raw_dates.next().and_then(RawDates::preferred)))
            .collect();

        info!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { title, entries })
    }

    fn parse_entry(entry: Entry, raw_published: Option<String>) -> FeedPost {
        let link = primary_link(&entry.links).unwrap_or_default();

        let id = if !entry.id.trim().is_empty() {
            entry.id.trim().to_string()
        } else {
            link.clone()
        };
        if id.is_empty() {
            warn!("Feed entry has neither an id nor a link");
        }

        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());

        // JSON feeds have no raw text to recover
        let published = raw_published
            .or_else(|| entry.published.or(entry.updated).map(|dt| dt.to_rfc2822()))
            .unwrap_or_default();

        let tags = entry.categories.into_iter().map(|c| c.term).collect();

        // Prefer content over summary
        let content = entry
            .content
            .and_then(|c| c.body)
            .or_else(|| entry.summary.map(|s| s.content))
            .unwrap_or_default();

        FeedPost {
            id,
            title,
            link,
            published,
            tags,
            content,
        }
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The entry's page: an alternate link if there is one, else the first link.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

#[derive(Debug, Default)]
struct RawDates {
    published: Option<String>,
    updated: Option<String>,
}

impl RawDates {
    fn preferred(self) -> Option<String> {
        self.published.or(self.updated)
    }
}

#[derive(Debug, Clone, Copy)]
enum DateField {
    Published,
    Updated,
}

impl DateField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"pubDate" | b"published" | b"date" => Some(Self::Published),
            b"updated" => Some(Self::Updated),
            _ => None,
        }
    }
}

/// Date text of every RSS `item` / Atom `entry`, in document order, exactly
/// as written. Only direct children of the entry are looked at.
fn raw_entry_dates(content: &[u8]) -> Vec<RawDates> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();

    let mut entries: Vec<RawDates> = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut entry_depth: Option<usize> = None;
    let mut field: Option<DateField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                match entry_depth {
                    None if matches!(name.as_ref(), b"item" | b"entry") => {
                        entry_depth = Some(depth);
                        entries.push(RawDates::default());
                    }
                    Some(d) if depth == d + 1 => {
                        field = DateField::from_local_name(name.as_ref());
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) if field.is_some() => {
                if let Ok(decoded) = decoder.decode(&t) {
                    text.push_str(&decoded);
                }
            }
            Ok(Event::CData(t)) if field.is_some() => {
                if let Ok(decoded) = decoder.decode(&t) {
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(r)) if field.is_some() => {
                if let Ok(Some(ch)) = r.resolve_char_ref() {
                    text.push(ch);
                } else if let Ok(name) = decoder.decode(&r) {
                    if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(&name) {
                        text.push_str(resolved);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let (Some(kind), Some(dates)) = (field.take(), entries.last_mut()) {
                    let value = text.trim();
                    if !value.is_empty() {
                        let slot = match kind {
                            DateField::Published => &mut dates.published,
                            DateField::Updated => &mut dates.updated,
                        };
                        slot.get_or_insert_with(|| value.to_string());
                    }
                }
                if entry_depth == Some(depth) {
                    entry_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("Stopped scanning raw entry dates: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    entries
}
