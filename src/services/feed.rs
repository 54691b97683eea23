//! RSS and Atom feed parsing

use crate::classify::classify_event;
use crate::errors::Result;
use crate::models::{NormalizedEvent, Provider};
use crate::text::{decode_entities, sanitize_description};
use quick_xml::events::Event;
use quick_xml::Reader;
use rss::Channel;

/// Most recent upstream entries kept per provider.
pub const MAX_RECENT_EVENTS: usize = 30;

/// One entry from either feed flavour, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedItem {
    pub title: String,
    /// Raw, possibly HTML, body.
    pub description: String,
    pub date: String,
    pub guid: String,
    pub categories: Vec<String>,
}

pub fn parse_rss(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let channel = Channel::read_from(bytes)?;

    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().unwrap_or_default().to_string(),
            description: item.description().unwrap_or_default().to_string(),
            date: item.pub_date().unwrap_or_default().to_string(),
            guid: item.guid().map(|g| g.value().to_string()).unwrap_or_default(),
            categories: item
                .categories()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        })
        .collect();

    Ok(items)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtomField {
    Title,
    Content,
    Summary,
    Updated,
    Published,
    Id,
}

impl AtomField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(AtomField::Title),
            b"content" => Some(AtomField::Content),
            b"summary" => Some(AtomField::Summary),
            b"updated" => Some(AtomField::Updated),
            b"published" => Some(AtomField::Published),
            b"id" => Some(AtomField::Id),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct AtomEntry {
    title: String,
    content: String,
    summary: String,
    updated: String,
    published: String,
    id: String,
    categories: Vec<String>,
}

impl AtomEntry {
    fn push_text(&mut self, field: AtomField, text: &str) {
        let target = match field {
            AtomField::Title => &mut self.title,
            AtomField::Content => &mut self.content,
            AtomField::Summary => &mut self.summary,
            AtomField::Updated => &mut self.updated,
            AtomField::Published => &mut self.published,
            AtomField::Id => &mut self.id,
        };
        target.push_str(text);
    }

    fn into_item(self) -> FeedItem {
        let date = first_non_empty(self.updated, self.published);
        FeedItem {
            title: self.title.trim().to_string(),
            description: first_non_empty(self.content, self.summary),
            date: date.trim().to_string(),
            guid: self.id.trim().to_string(),
            categories: self.categories,
        }
    }
}

fn first_non_empty(a: String, b: String) -> String {
    if a.trim().is_empty() { b } else { a }
}

/// Parse an Atom document into feed items, in document order.
pub fn parse_atom(xml: &str) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut entry: Option<AtomEntry> = None;
    let mut field: Option<AtomField> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"entry" {
                    entry = Some(AtomEntry::default());
                    field = None;
                } else if entry.is_some() && field.is_none() {
                    field = AtomField::from_tag(name.as_ref());
                }
            }
            Event::Empty(e) => {
                if let Some(current) = entry.as_mut() {
                    if e.local_name().as_ref() == b"category" {
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"term" {
                                let term = String::from_utf8_lossy(&attr.value);
                                current.categories.push(decode_entities(&term));
                            }
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        // HTML entities such as &nbsp; are not XML entities
                        Err(_) => decode_entities(&String::from_utf8_lossy(&t)),
                    };
                    current.push_text(f, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    current.push_text(f, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == b"entry" {
                    if let Some(done) = entry.take() {
                        items.push(done.into_item());
                    }
                    field = None;
                } else if field.is_some() && field == AtomField::from_tag(name.as_ref()) {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Turn feed items into normalized events: keep the newest
/// [`MAX_RECENT_EVENTS`], strip markup and classify.
pub fn normalize_events<F>(items: Vec<FeedItem>, provider: Provider, service_of: F) -> Vec<NormalizedEvent>
where
    F: Fn(&FeedItem) -> String,
{
    items
        .into_iter()
        .take(MAX_RECENT_EVENTS)
        .map(|item| {
            let event_type = classify_event(&item.title, &item.description);
            NormalizedEvent {
                service: service_of(&item),
                description: sanitize_description(&item.description),
                title: item.title,
                date: item.date,
                guid: item.guid,
                event_type,
                provider,
            }
        })
        .collect()
}
