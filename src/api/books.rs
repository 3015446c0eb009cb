//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookPayload, BookQuery, BookSummary},
    AppState,
};

use super::AppJson;

const SUCCESS: &str = "success";

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookCreated {
    pub book_id: String,
}

/// Response to a successful create
#[derive(Serialize, ToSchema)]
pub struct BookCreatedResponse {
    pub status: String,
    pub message: String,
    pub data: BookCreated,
}

#[derive(Serialize, ToSchema)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub status: String,
    pub data: BookList,
}

#[derive(Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
}

#[derive(Serialize, ToSchema)]
pub struct BookDetailResponse {
    pub status: String,
    pub data: BookDetail,
}

/// Acknowledgement without payload
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    fn success(message: &str) -> Self {
        Self {
            status: SUCCESS.to_string(),
            message: message.to_string(),
        }
    }
}

/// Add a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book added", body = BookCreatedResponse),
        (status = 400, description = "Missing name or readPage above pageCount", body = crate::error::ErrorResponse),
        (status = 500, description = "Book could not be stored", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookCreatedResponse>)> {
    let book_id = state.services.books.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            status: SUCCESS.to_string(),
            message: "Buku berhasil ditambahkan".to_string(),
            data: BookCreated { book_id },
        }),
    ))
}

/// List books, optionally filtered by one of `name`, `reading` or `finished`
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the book name"),
        ("reading" = Option<String>, Query, description = "1 for books being read, anything else for the others"),
        ("finished" = Option<String>, Query, description = "1 for finished books, anything else for the others")
    ),
    responses(
        (status = 200, description = "Book summaries", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<BookListResponse> {
    let query = BookQuery::from_pairs(pairs);
    let books = state.services.books.list(&query).await;

    Json(BookListResponse {
        status: SUCCESS.to_string(),
        data: BookList { books },
    })
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetailResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<BookDetailResponse>> {
    let book = state.services.books.get_by_id(&book_id).await?;

    Ok(Json(BookDetailResponse {
        status: SUCCESS.to_string(),
        data: BookDetail { book },
    }))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Missing name or readPage above pageCount", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.update(&book_id, payload).await?;
    Ok(Json(MessageResponse::success("Buku berhasil diperbarui")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(&book_id).await?;
    Ok(Json(MessageResponse::success("Buku berhasil dihapus")))
}
