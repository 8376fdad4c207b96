//! # Price Matrix Extractor
//!
//! Extracts price and color matrices from styled catalog workbooks (`.xlsx`) and
//! writes them as two normalized tables.
//!
//! ## Workbook convention
//!
//! - Each sheet is one product type. Its main matrix is anchored by a `1` in column A
//!   (or an `h/w` label anywhere): widths run right along the header row, heights run
//!   down the header column and prices fill the grid between them.
//! - The fill color of each price cell encodes an attribute of that size.
//! - Further color matrices, labelled `Thk.2`, `3`, `หนา 4` and so on in column A,
//!   repeat the same widths and heights with their own colors.
//!
//! ## Outputs
//!
//! - `Price_<job>.xlsx`: one row per priced (height, width) cell, with one
//!   `<n>_Color` column per matrix index found anywhere in the workbook
//! - `Type_<job>.xlsx`: one row per processed sheet with its size ranges
//!
//! ## Modules
//!
//! - [`spreadsheet`]: xlsx reader keeping both values and fills
//! - [`extractor`]: header discovery, offset inference and record assembly
//! - [`output`]: xlsx writer for the Price and Type tables
//! - [`config`]: settings, job ids and series names
//! - [`cleanup`]: removal of expired files
pub mod cleanup;
pub mod config;
pub mod error;
pub mod extractor;
mod helpers;
pub mod output;
pub mod spreadsheet;

pub use crate::error::PriceMatrixError;
pub use crate::extractor::record::Summary;
pub use crate::extractor::Extractor;
