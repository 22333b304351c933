/// Book API routes
use crate::{
    error::{Result, ServerError},
    middleware::CurrentUser,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_core::{
    types::{Book, BookId, BookPage, BookWithOwner},
    validation::BookInput,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: Option<String>,
    pub caption: Option<String>,
    /// Number or numeric string
    pub rating: Option<Value>,
    pub image: Option<String>,
}

impl BookRequest {
    fn input(&self) -> BookInput {
        BookInput {
            title: self.title.clone(),
            caption: self.caption.clone(),
            rating: self.rating.as_ref().and_then(rating_value),
        }
    }
}

/// Read a rating sent as a number or a numeric string. Whole floats such as
/// `5.0` count. Anything else maps to 0 so it fails the range check instead
/// of reading as missing.
fn rating_value(value: &Value) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(n.as_i64().or_else(|| n.as_f64().and_then(whole)).unwrap_or(0)),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => {
            let s = s.trim();
            Some(
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole))
                    .unwrap_or(0),
            )
        }
        _ => Some(0),
    }
}

/// `Some` for finite floats without a fractional part that fit an `i64`
fn whole(value: f64) -> Option<i64> {
    let in_range = value.is_finite() && value.abs() < 9.0e15;
    (in_range && value.fract() == 0.0).then_some(value as i64)
}

#[derive(Debug, Serialize)]
pub struct CreateBookResponse {
    pub success: bool,
    pub message: String,
    pub book: Book,
}

#[derive(Debug, Serialize)]
pub struct BookMessageResponse {
    pub message: String,
    pub book: Book,
}

/// GET /api/books?page&limit
pub async fn list_books(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<BookPage>> {
    let page = app_state
        .books
        .page_request(query.page.as_deref(), query.limit.as_deref());
    let page = app_state.books.list_paged(page).await?;
    Ok(Json(page))
}

/// POST /api/books
pub async fn create_book(
    State(app_state): State<AppState>,
    user: CurrentUser,
    payload: std::result::Result<Json<BookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookResponse>)> {
    let Json(req) = payload?;

    let book = app_state
        .books
        .create(user.user_id(), req.input(), req.image.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookResponse {
            success: true,
            message: "Book recommendation created successfully!".to_string(),
            book,
        }),
    ))
}

/// GET /api/books/user
pub async fn list_user_books(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<BookWithOwner>>> {
    let books = app_state.books.list_by_owner(user.user_id()).await?;
    Ok(Json(books))
}

/// GET /api/books/:id
pub async fn get_book(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookWithOwner>> {
    let book = app_state.books.get(&BookId::new(id)).await?;
    Ok(Json(book))
}

/// PUT /api/books/:id
pub async fn update_book(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: std::result::Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<BookMessageResponse>> {
    let Json(req) = payload?;

    let book = app_state
        .books
        .update(&BookId::new(id), user.user_id(), req.input())
        .await?;

    Ok(Json(BookMessageResponse {
        message: "Book updated successfully".to_string(),
        book,
    }))
}

/// DELETE /api/books/:id
pub async fn delete_book(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<BookMessageResponse>> {
    if id.trim().is_empty() {
        return Err(ServerError::BadRequest("Invalid book ID".to_string()));
    }

    let deleted = app_state
        .books
        .delete(&BookId::new(id), user.user_id())
        .await?;

    tracing::debug!(book_id = %deleted.book.id, cleanup = ?deleted.image_cleanup, "Delete finished");

    Ok(Json(BookMessageResponse {
        message: "Book deleted successfully".to_string(),
        book: deleted.book,
    }))
}
