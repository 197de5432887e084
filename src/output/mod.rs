//! Output module for the console front end
//!
//! The library returns plain structured data; this module turns it into the
//! text the binary prints.

mod console;

pub use console::{render_favorites, render_items, render_receipt};
