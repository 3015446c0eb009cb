//! Books service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPayload, BookQuery, BookSummary},
    repository::{books::CollectionError, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book, returning its generated id
    pub async fn create(&self, payload: BookPayload) -> AppResult<String> {
        match self.repository.books.create(payload).await {
            Ok(id) => {
                tracing::info!("Book {} added", id);
                Ok(id)
            }
            Err(CollectionError::Invalid(e)) => Err(AppError::Validation(format!(
                "Gagal menambahkan buku. {}",
                e
            ))),
            Err(e) => {
                tracing::error!("Book creation failed: {}", e);
                Err(AppError::Internal("Buku gagal ditambahkan".to_string()))
            }
        }
    }

    /// List book summaries, filtered by at most one query parameter
    pub async fn list(&self, query: &BookQuery) -> Vec<BookSummary> {
        let filter = query.filter();
        let books = self.repository.books.list(&filter).await;
        tracing::debug!("Listed {} books with filter {:?}", books.len(), filter);
        books
    }

    /// Number of books in the catalog
    pub async fn count(&self) -> usize {
        self.repository.books.count().await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await
            .map_err(|_| AppError::NotFound("Buku tidak ditemukan".to_string()))
    }

    pub async fn update(&self, id: &str, payload: BookPayload) -> AppResult<()> {
        match self.repository.books.update(id, payload).await {
            Ok(()) => {
                tracing::info!("Book {} updated", id);
                Ok(())
            }
            Err(CollectionError::Invalid(e)) => Err(AppError::Validation(format!(
                "Gagal memperbarui buku. {}",
                e
            ))),
            Err(CollectionError::NotFound(_)) => Err(AppError::NotFound(
                "Gagal memperbarui buku. Id tidak ditemukan".to_string(),
            )),
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let removed = self
            .repository
            .books
            .delete(id)
            .await
            .map_err(|_| AppError::NotFound("Buku gagal dihapus. Id tidak ditemukan".to_string()))?;
        tracing::info!("Book {} ({}) deleted", removed.id, removed.name);
        Ok(())
    }
}
