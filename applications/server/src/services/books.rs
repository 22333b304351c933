//! Book service - ownership-checked CRUD with image side effects.
//!
//! Images are resolved before anything is written: a blank image means the
//! default cover, an `http(s)` URL is kept as-is, anything else is uploaded.
//! Deleting a book removes the row first and only then tries to remove the
//! stored image; the second step never changes the outcome of the first.
//! Only covers the book uploaded itself are ever destroyed, never a URL the
//! client handed in, even one that points into the same store.

use crate::error::Result;
use crate::services::images::{destroy_with_timeout, upload_with_timeout, ImageStore};
use shelf_core::{
    storage::BookStore,
    types::{Book, BookId, BookPage, BookWithOwner, CreateBook, PageRequest, UserId},
    validation::BookInput,
    ShelfError,
};
use std::sync::Arc;
use std::time::Duration;

/// Folder uploaded covers go to
pub const BOOK_IMAGE_FOLDER: &str = "books";

/// What happened to the stored image of a deleted book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCleanup {
    /// The store confirmed removal
    Removed,
    /// The book did not upload its image (default cover, client URL)
    Skipped,
    /// Removal failed or timed out; the book is deleted regardless
    Failed(String),
}

/// Result of a successful delete
#[derive(Debug, Clone)]
pub struct DeletedBook {
    pub book: Book,
    pub image_cleanup: ImageCleanup,
}

pub struct BookService {
    books: Arc<dyn BookStore>,
    images: Arc<dyn ImageStore>,
    default_image: String,
    max_page_size: u32,
    image_timeout: Duration,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BookStore>,
        images: Arc<dyn ImageStore>,
        default_image: impl Into<String>,
        max_page_size: u32,
        image_timeout: Duration,
    ) -> Self {
        Self {
            books,
            images,
            default_image: default_image.into(),
            max_page_size,
            image_timeout,
        }
    }

    /// Turn raw `page`/`limit` query values into a bounded request
    pub fn page_request(&self, page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageRequest::from_query(page, limit, self.max_page_size)
    }

    /// Validate, resolve the image, then insert
    pub async fn create(
        &self,
        owner: &UserId,
        input: BookInput,
        image: Option<&str>,
    ) -> Result<Book> {
        // Invalid input never reaches the image store
        let fields = input.validate()?;

        let image = image.map(str::trim).filter(|s| !s.is_empty());
        let (image_url, uploaded) = match image {
            None => (self.default_image.clone(), None),
            Some(url) if is_hosted_url(url) => (url.to_string(), None),
            Some(payload) => {
                let stored = upload_with_timeout(
                    self.images.as_ref(),
                    payload,
                    BOOK_IMAGE_FOLDER,
                    self.image_timeout,
                )
                .await?;
                (stored.url, Some(stored.reference))
            }
        };

        let created = self
            .books
            .create_book(CreateBook {
                owner: owner.clone(),
                title: fields.title,
                caption: fields.caption,
                rating: fields.rating,
                image: image_url,
                image_ref: uploaded.clone(),
            })
            .await;

        match created {
            Ok(book) => {
                tracing::info!(book_id = %book.id, owner = %owner, "Book created");
                Ok(book)
            }
            Err(e) => {
                if let Some(reference) = uploaded {
                    self.discard(&reference).await;
                }
                Err(e.into())
            }
        }
    }

    /// One page of the global feed, newest first
    pub async fn list_paged(&self, page: PageRequest) -> Result<BookPage> {
        let (books, total) = self.books.list_books(page).await?;
        Ok(BookPage {
            books,
            total_pages: page.total_pages(total),
            current_page: page.page(),
        })
    }

    /// Every book of one owner, newest first
    pub async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<BookWithOwner>> {
        Ok(self.books.list_books_by_owner(owner).await?)
    }

    pub async fn get(&self, id: &BookId) -> Result<BookWithOwner> {
        self.books
            .get_book(id)
            .await?
            .ok_or_else(|| ShelfError::not_found("Book", id.as_str()).into())
    }

    /// Replace title, caption and rating if `caller` owns the book
    pub async fn update(&self, id: &BookId, caller: &UserId, input: BookInput) -> Result<Book> {
        let fields = input.validate()?;
        let book = self.books.update_owned_book(id, caller, fields).await?;
        tracing::info!(book_id = %book.id, "Book updated");
        Ok(book)
    }

    /// Delete if `caller` owns the book, then try to drop its image
    pub async fn delete(&self, id: &BookId, caller: &UserId) -> Result<DeletedBook> {
        let book = self.books.delete_owned_book(id, caller).await?;
        tracing::info!(book_id = %book.id, "Book deleted");

        let image_cleanup = self.cleanup_image(&book).await;
        Ok(DeletedBook {
            book,
            image_cleanup,
        })
    }

    async fn cleanup_image(&self, book: &Book) -> ImageCleanup {
        let Some(reference) = book.image_ref.as_deref() else {
            return ImageCleanup::Skipped;
        };

        match destroy_with_timeout(self.images.as_ref(), reference, self.image_timeout).await {
            Ok(()) => ImageCleanup::Removed,
            Err(e) => {
                tracing::warn!(
                    book_id = %book.id,
                    reference = %reference,
                    "Failed to remove book image: {}",
                    e
                );
                ImageCleanup::Failed(e.to_string())
            }
        }
    }

    async fn discard(&self, reference: &str) {
        if let Err(e) = destroy_with_timeout(self.images.as_ref(), reference, self.image_timeout).await
        {
            tracing::warn!(reference = %reference, "Failed to discard upload: {}", e);
        }
    }
}

fn is_hosted_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}
