//! Grouped view of a checkout breakdown
//!
//! Folds the flat line-item run into products with their options and price,
//! labelled summary amounts and the final total.

use crate::scrape::checkout::{LineItem, LineItemKind};
use thiserror::Error;

/// Errors raised when a line-item run is not in the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("option '{0}' does not follow a product")]
    OrphanOption(String),

    #[error("price '{0}' does not follow a product")]
    OrphanPrice(String),

    #[error("product '{0}' has no price")]
    MissingPrice(String),

    #[error("{kind} '{value}' does not follow a label")]
    OrphanAmount { kind: LineItemKind, value: String },

    #[error("label '{0}' has no amount")]
    MissingAmount(String),
}

/// A product with the options chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptProduct {
    pub name: String,
    pub options: Vec<String>,
    /// Decimal amount without currency symbol
    pub price: String,
}

/// A labelled amount, e.g. `Tax` / `$0.53`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub label: String,
    /// Amount text as shown on the page
    pub amount: String,
}

/// Checkout breakdown grouped for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    pub products: Vec<ReceiptProduct>,
    pub summary: Vec<ReceiptLine>,
    pub totals: Vec<ReceiptLine>,
}

impl Receipt {
    /// Groups a line-item run
    ///
    /// Options belong to the product before them and may come either side of
    /// its price.
    pub fn from_items(items: &[LineItem]) -> Result<Self, ReceiptError> {
        let mut receipt = Receipt::default();
        let mut awaiting_price = false;
        let mut in_products = true;
        let mut label: Option<(LineItemKind, String)> = None;

        for item in items {
            let value = item.value.clone();

            match item.kind {
                LineItemKind::Product => {
                    receipt.ensure_priced(awaiting_price)?;
                    if let Some((_, pending)) = label.take() {
                        return Err(ReceiptError::MissingAmount(pending));
                    }
                    receipt.products.push(ReceiptProduct {
                        name: value,
                        options: Vec::new(),
                        price: String::new(),
                    });
                    awaiting_price = true;
                    in_products = true;
                }
                LineItemKind::Option => match receipt.products.last_mut() {
                    Some(product) if in_products => product.options.push(value),
                    _ => return Err(ReceiptError::OrphanOption(value)),
                },
                LineItemKind::ProductMoney => match receipt.products.last_mut() {
                    Some(product) if awaiting_price => {
                        product.price = value;
                        awaiting_price = false;
                    }
                    _ => return Err(ReceiptError::OrphanPrice(value)),
                },
                LineItemKind::Summary | LineItemKind::Total => {
                    receipt.ensure_priced(awaiting_price)?;
                    if let Some((_, pending)) = label.take() {
                        return Err(ReceiptError::MissingAmount(pending));
                    }
                    label = Some((item.kind, value));
                    in_products = false;
                }
                LineItemKind::SummaryMoney | LineItemKind::TotalMoney => {
                    let expected = if item.kind == LineItemKind::SummaryMoney {
                        LineItemKind::Summary
                    } else {
                        LineItemKind::Total
                    };

                    match label.take() {
                        Some((kind, text)) if kind == expected => {
                            let line = ReceiptLine {
                                label: text,
                                amount: value,
                            };
                            if kind == LineItemKind::Summary {
                                receipt.summary.push(line);
                            } else {
                                receipt.totals.push(line);
                            }
                        }
                        _ => {
                            return Err(ReceiptError::OrphanAmount {
                                kind: item.kind,
                                value,
                            })
                        }
                    }
                }
            }
        }

        receipt.ensure_priced(awaiting_price)?;
        if let Some((_, pending)) = label {
            return Err(ReceiptError::MissingAmount(pending));
        }

        Ok(receipt)
    }

    fn ensure_priced(&self, awaiting_price: bool) -> Result<(), ReceiptError> {
        match self.products.last() {
            Some(product) if awaiting_price => Err(ReceiptError::MissingPrice(product.name.clone())),
            _ => Ok(()),
        }
    }

    /// The last total row, which is what the customer pays
    pub fn grand_total(&self) -> Option<&ReceiptLine> {
        self.totals.last()
    }
}
