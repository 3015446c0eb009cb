//! Repository layer for book storage

pub mod books;

/// Main repository struct holding the storage handles
#[derive(Clone, Default)]
pub struct Repository {
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a repository around a fresh, empty book collection
    pub fn new() -> Self {
        Self {
            books: books::BooksRepository::new(),
        }
    }
}
