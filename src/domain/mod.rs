pub mod book;
pub mod commands;
pub mod validation;
pub mod value_objects;

pub use book::{Book, BookCore, BookDraft, NewBook};
pub use validation::{Rule, ValidationError};
pub use value_objects::*;
