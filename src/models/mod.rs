//! Data models for PolyLib entities

pub mod book;
pub mod class;
pub mod user;

pub use book::{AddedBy, Book, BookQuery, CreateBook, UpdateBook};
pub use class::{Class, CreateClass, FilterOptions, FilterQuery, Level, UpdateClass};
pub use user::{Role, User, UserClaims};
