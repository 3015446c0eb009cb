//! In-memory book storage

use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::book::{Book, BookFilter, BookPayload, BookSummary, InvalidBook};

/// Length of generated book identifiers
pub const ID_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error(transparent)]
    Invalid(#[from] InvalidBook),

    #[error("Book {0} not found")]
    NotFound(String),

    #[error("Book {0} missing right after insert")]
    InsertNotConfirmed(String),
}

/// Ordered list of books, in insertion order
#[derive(Debug, Default)]
pub struct BookCollection {
    books: Vec<Book>,
}

impl BookCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Validate and append a new book, returning its id
    pub fn create(&mut self, payload: BookPayload) -> Result<String, CollectionError> {
        let fields = payload.validate()?;
        let id = self.fresh_id();

        self.books.push(Book::new(id.clone(), fields, Utc::now()));

        if self.position(&id).is_none() {
            return Err(CollectionError::InsertNotConfirmed(id));
        }
        Ok(id)
    }

    /// Summaries of the books matching `filter`, in collection order
    pub fn summaries<'a>(
        &'a self,
        filter: &'a BookFilter,
    ) -> impl Iterator<Item = BookSummary> + 'a {
        self.books
            .iter()
            .filter(move |book| book.matches(filter))
            .map(Book::summary)
    }

    pub fn get(&self, id: &str) -> Result<&Book, CollectionError> {
        self.books
            .iter()
            .find(|book| book.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    /// Replace the mutable fields of a book. The payload is validated before
    /// the lookup, so bad input is reported even for unknown ids.
    pub fn update(&mut self, id: &str, payload: BookPayload) -> Result<(), CollectionError> {
        let fields = payload.validate()?;
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;

        self.books[index].apply(fields, Utc::now());
        Ok(())
    }

    /// Remove a book, keeping the order of the others
    pub fn delete(&mut self, id: &str) -> Result<Book, CollectionError> {
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;

        Ok(self.books.remove(index))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

/// Random alphanumeric identifier of [`ID_LENGTH`] characters
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Shared handle on the process-wide book collection
#[derive(Clone, Default)]
pub struct BooksRepository {
    collection: Arc<RwLock<BookCollection>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, payload: BookPayload) -> Result<String, CollectionError> {
        self.collection.write().await.create(payload)
    }

    pub async fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.collection.read().await.summaries(filter).collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Book, CollectionError> {
        self.collection.read().await.get(id).cloned()
    }

    pub async fn update(&self, id: &str, payload: BookPayload) -> Result<(), CollectionError> {
        self.collection.write().await.update(id, payload)
    }

    pub async fn delete(&self, id: &str) -> Result<Book, CollectionError> {
        self.collection.write().await.delete(id)
    }

    pub async fn count(&self) -> usize {
        self.collection.read().await.len()
    }
}
