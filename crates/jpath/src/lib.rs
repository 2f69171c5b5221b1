//! A small, JSON-native path language.
//!
//! Paths are dot-separated keys (`customer.name`), with numeric keys or
//! `[n]` for array positions (`orders.0.id`, `orders[0].id`) and `#` for
//! array length or element mapping (`orders.#`, `orders.#.id`).

pub mod ast;
pub mod engine;
pub mod error;
mod parser;

// --- Public API ---
pub use ast::{Path, Segment};
pub use engine::select;
pub use error::JPathError;
pub use parser::parse_path;
