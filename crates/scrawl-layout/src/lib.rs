// this_file: crates/scrawl-layout/src/lib.rs

//! Page geometry, line wrapping and pagination for scrawl.

pub mod geometry;
pub mod paginate;
pub mod wrap;

pub use geometry::{PageGeometry, TEXT_GUTTER};
pub use paginate::{page_capacity, page_ranges, Line, Page, Pagination, Paginator};
pub use wrap::{split_two_lines, TextLayoutEngine};
