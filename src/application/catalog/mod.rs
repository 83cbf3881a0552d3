mod catalog_service;
mod errors;
mod views;

pub use catalog_service::{
    CatalogDependencies, get_book, list_books, list_books_page, register_book, remove_book,
    revise_book, search_books, toggle_availability,
};
pub use errors::{CatalogApplicationError, Result};
pub use views::{BookPage, BookView, PageRequest};
