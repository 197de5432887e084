//! Line items of the checkout page
//!
//! Every cell of the `.CheckoutList` table is classified by its `class`
//! attribute into one of a fixed set of kinds. The resulting sequence keeps
//! page order: each product is followed by its options and its price, then
//! come the summary rows, then the total.

use crate::agent::{parse_selector, Page};
use crate::scrape::favorites::element_text;
use crate::{Result, SubwayError};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Cells of the checkout breakdown table
const CHECKOUT_CELLS: &str = ".CheckoutList td";

/// Kind of a classified checkout cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineItemKind {
    Product,
    ProductMoney,
    Option,
    Summary,
    SummaryMoney,
    Total,
    TotalMoney,
}

impl LineItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::ProductMoney => "product_money",
            Self::Option => "option",
            Self::Summary => "summary",
            Self::SummaryMoney => "summary_money",
            Self::Total => "total",
            Self::TotalMoney => "total_money",
        }
    }
}

impl fmt::Display for LineItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `class` attribute of a checkout cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellClass {
    Product,
    ProductMoney,
    OptionCheck,
    Summary,
    SummaryMoney,
    Total,
    TotalMoney,
    Unrecognized(String),
}

impl CellClass {
    /// Matches the attribute value exactly; anything else is unrecognized
    pub fn parse(class: &str) -> Self {
        match class {
            "product" => Self::Product,
            "product money" => Self::ProductMoney,
            "optioncheck" => Self::OptionCheck,
            "summary" => Self::Summary,
            "summary money" => Self::SummaryMoney,
            "total" => Self::Total,
            "total money" => Self::TotalMoney,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The line item kind this class produces, if any
    pub fn kind(&self) -> Option<LineItemKind> {
        match self {
            Self::Product => Some(LineItemKind::Product),
            Self::ProductMoney => Some(LineItemKind::ProductMoney),
            Self::OptionCheck => Some(LineItemKind::Option),
            Self::Summary => Some(LineItemKind::Summary),
            Self::SummaryMoney => Some(LineItemKind::SummaryMoney),
            Self::Total => Some(LineItemKind::Total),
            Self::TotalMoney => Some(LineItemKind::TotalMoney),
            Self::Unrecognized(_) => None,
        }
    }
}

/// One classified checkout cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub kind: LineItemKind,

    /// The cell's full text with leading and trailing whitespace trimmed
    ///
    /// Inner whitespace is kept. For `ProductMoney` this is only the decimal
    /// amount, e.g. `5.99` for a cell reading `$5.99`.
    pub value: String,
}

impl LineItem {
    pub fn new(kind: LineItemKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A cell whose class is not one of the known kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedCell {
    pub class: String,
    pub text: String,
}

/// Result of scraping a checkout page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutItems {
    /// Classified cells in page order
    pub items: Vec<LineItem>,

    /// Cells that produced no item, in page order
    pub skipped: Vec<UnrecognizedCell>,
}

/// First decimal number in `text`, e.g. `"5.99"` out of `"$5.99"`
pub fn extract_amount(text: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+\.\d+").expect("regex should be valid"));
    re.find(text).map(|m| m.as_str())
}

/// Builds the line item for a cell of a known class
///
/// Returns `None` for unrecognized classes and `Err` with a description when
/// a product price cell holds no decimal number.
pub fn classify_cell(
    class: &CellClass,
    text: &str,
) -> Option<std::result::Result<LineItem, String>> {
    let kind = class.kind()?;

    let value = match kind {
        LineItemKind::ProductMoney => match extract_amount(text) {
            Some(amount) => amount.to_string(),
            None => return Some(Err(format!("product price '{}' has no amount", text))),
        },
        _ => text.to_string(),
    };

    Some(Ok(LineItem::new(kind, value)))
}

/// Classifies every cell of the page's `.CheckoutList` table
///
/// Unrecognized cells are logged and returned in `skipped`. A product price
/// without a decimal number fails the whole extraction.
pub fn extract_line_items(page: &Page) -> Result<CheckoutItems> {
    let cell_selector = parse_selector(CHECKOUT_CELLS)?;
    let document = page.document();
    let mut checkout = CheckoutItems::default();

    for cell in document.select(&cell_selector) {
        let class = CellClass::parse(cell.value().attr("class").unwrap_or_default());
        let text = element_text(cell);

        match classify_cell(&class, &text) {
            Some(Ok(item)) => checkout.items.push(item),
            Some(Err(message)) => return Err(SubwayError::extraction(page.url(), message)),
            None => {
                let CellClass::Unrecognized(class) = class else {
                    continue;
                };
                tracing::warn!(
                    "Unrecognized checkout cell class '{}' ({:?}) on {}",
                    class,
                    text,
                    page.url()
                );
                checkout.skipped.push(UnrecognizedCell { class, text });
            }
        }
    }

    tracing::debug!(
        "Extracted {} line items ({} skipped) from {}",
        checkout.items.len(),
        checkout.skipped.len(),
        page.url()
    );

    Ok(checkout)
}
