pub mod cache;
pub mod domain;
pub mod error;
pub mod questions;
pub mod text;
