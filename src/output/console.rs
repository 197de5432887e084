//! Console rendering of favorites and receipts
//!
//! Styling goes through `colored`, so [`colored::control::set_override`]
//! decides whether escape codes are emitted at all.

use crate::scrape::{Favorite, LineItem, Receipt};
use colored::*;
use std::fmt::Write;

/// Indent for options, summary and total labels
const INDENT: &str = "    ";

/// Renders the favorites list, numbered from 1
pub fn render_favorites(favorites: &[Favorite]) -> String {
    let mut out = String::new();

    for (i, favorite) in favorites.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} {}",
            i + 1,
            favorite.id.red().bold(),
            favorite.description.yellow().bold()
        );
        let _ = writeln!(out, "  Location: {}", favorite.location);
        for product in &favorite.products {
            let _ = writeln!(out, "  {}", product);
        }
    }

    out
}

/// Renders a receipt as aligned columns
///
/// Product prices get a `$` prefix; summary and total amounts are printed as
/// the site wrote them. Columns are measured in characters, and labels are
/// padded before they are styled so escape codes never count towards width.
pub fn render_receipt(receipt: &Receipt) -> String {
    let labels = receipt
        .products
        .iter()
        .map(|p| p.name.chars().count())
        .chain(
            receipt
                .summary
                .iter()
                .chain(&receipt.totals)
                .map(|l| INDENT.len() + l.label.chars().count()),
        );
    let width = labels.max().unwrap_or(0);
    let rule = "-".repeat(width + 12);

    let mut out = String::new();

    for product in &receipt.products {
        let name = format!("{:<width$}", product.name);
        let price = format!("${}", product.price);
        let _ = writeln!(out, "{}  {}", name.red().bold(), price.green());
        for option in &product.options {
            let _ = writeln!(out, "{}", format!("{}{}", INDENT, option).green());
        }
    }

    if !receipt.summary.is_empty() {
        let _ = writeln!(out, "{}", rule);
        for line in &receipt.summary {
            let label = format!("{:<width$}", format!("{}{}", INDENT, line.label));
            let _ = writeln!(out, "{}  {}", label.green().bold(), line.amount);
        }
    }

    if !receipt.totals.is_empty() {
        let _ = writeln!(out, "{}", rule.bold());
        for line in &receipt.totals {
            let label = format!("{:<width$}", format!("{}{}", INDENT, line.label));
            let _ = writeln!(out, "{}  {}", label.cyan().bold(), line.amount.cyan().bold());
        }
    }

    out
}

/// Renders classified line items one per line, in page order
///
/// Used when the items cannot be grouped into a receipt.
pub fn render_items(items: &[LineItem]) -> String {
    let width = items
        .iter()
        .map(|item| item.kind.as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for item in items {
        let kind = format!("{:<width$}", item.kind.as_str());
        let _ = writeln!(out, "{}  {}", kind.bold(), item.value);
    }
    out
}
