//! Scrape module: turns site pages into structured records
//!
//! This module contains:
//! - Favorites extraction from the logged-in home page
//! - Line-item classification of a favorite's checkout page
//! - Grouping of line items into a receipt for display

mod checkout;
mod favorites;
mod receipt;

pub use checkout::{
    classify_cell, extract_amount, extract_line_items, CellClass, CheckoutItems, LineItem,
    LineItemKind, UnrecognizedCell,
};
pub use favorites::{extract_favorites, Favorite};
pub use receipt::{Receipt, ReceiptError, ReceiptLine, ReceiptProduct};
