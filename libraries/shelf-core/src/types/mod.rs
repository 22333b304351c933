mod book;
mod ids;
mod page;
mod user;

pub use book::{
    Book, BookOwner, BookPage, BookWithOwner, CreateBook, UpdateBook, DEFAULT_BOOK_IMAGE,
};
pub use ids::{BookId, UserId};
pub use page::{PageRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use user::{default_avatar, CreateUser, PublicUser, UpdateProfile, User, AVATAR_BASE_URL};
