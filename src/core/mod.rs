// Core types and primitives

pub mod pagination;

pub use pagination::{Page, PageQuery, Paginator};
