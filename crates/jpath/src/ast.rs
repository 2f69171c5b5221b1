//! Defines the Abstract Syntax Tree (AST) for JPath expressions.

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `.name`. A key made of digits also indexes into arrays (`items.0`).
    Key(String),
    /// `[n]`, which only applies to arrays.
    Index(usize),
    /// `#`: the array length as the last segment, otherwise a map over the
    /// array's elements with the remaining segments.
    Each,
}

/// A parsed path such as `store.book.#.author` or `orders[1].id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub segments: Vec<Segment>,
}
