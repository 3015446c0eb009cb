//! Book model and related types.
//!
//! A [`Book`] is only ever built from a validated [`BookPayload`]; the
//! `finished` flag is derived from the page counters and cannot be set by
//! callers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use utoipa::ToSchema;

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    /// Total number of pages
    pub page_count: i32,
    /// Pages read so far, never above `page_count`
    pub read_page: i32,
    /// True once `read_page` reaches `page_count`
    pub finished: bool,
    /// Whether the book is currently being read
    pub reading: bool,
    #[serde(serialize_with = "iso_millis")]
    pub inserted_at: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

/// Create / update book request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPayload {
    /// Required, must not be empty
    pub name: Option<String>,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: i32,
    pub read_page: i32,
    pub reading: bool,
}

/// Book list query parameters, as sent on the query string
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1` for books being read, anything else for the others
    pub reading: Option<String>,
    /// `1` for finished books, anything else for the others
    pub finished: Option<String>,
}

/// The single filter applied to a book listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    All,
    /// Lowercased needle
    Name(String),
    Reading(bool),
    Finished(bool),
}

/// Reasons a payload is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidBook {
    #[error("Mohon isi nama buku")]
    MissingName,

    #[error("readPage tidak boleh lebih besar dari pageCount")]
    ReadPageExceedsPageCount,
}

/// Payload fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: i32,
    pub read_page: i32,
    pub reading: bool,
}

pub fn is_finished(read_page: i32, page_count: i32) -> bool {
    read_page == page_count
}

impl BookPayload {
    /// Check the name first, then the page counters.
    pub fn validate(self) -> Result<BookFields, InvalidBook> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(InvalidBook::MissingName),
        };

        if self.read_page > self.page_count {
            return Err(InvalidBook::ReadPageExceedsPageCount);
        }

        Ok(BookFields {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

impl Book {
    pub fn new(id: String, fields: BookFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            finished: is_finished(fields.read_page, fields.page_count),
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field, keeping `id` and `inserted_at`.
    pub fn apply(&mut self, fields: BookFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.finished = is_finished(fields.read_page, fields.page_count);
        self.reading = fields.reading;
        self.updated_at = now;
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }

    pub fn matches(&self, filter: &BookFilter) -> bool {
        match filter {
            BookFilter::All => true,
            BookFilter::Name(needle) => self.name.to_lowercase().contains(needle.as_str()),
            BookFilter::Reading(reading) => self.reading == *reading,
            BookFilter::Finished(finished) => self.finished == *finished,
        }
    }
}

impl BookQuery {
    /// Build the query from raw key/value pairs. A repeated key keeps its
    /// first non-empty value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut query.name,
                "reading" => &mut query.reading,
                "finished" => &mut query.finished,
                _ => continue,
            };
            if non_empty(slot).is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Resolve the query to one filter: `name`, then `reading`, then `finished`.
    /// Empty values count as absent.
    pub fn filter(&self) -> BookFilter {
        if let Some(name) = non_empty(&self.name) {
            return BookFilter::Name(name.to_lowercase());
        }
        if let Some(reading) = non_empty(&self.reading) {
            return BookFilter::Reading(reading == "1");
        }
        if let Some(finished) = non_empty(&self.finished) {
            return BookFilter::Finished(finished == "1");
        }
        BookFilter::All
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
