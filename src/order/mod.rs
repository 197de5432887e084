//! Order module: the checkout page of one favorite and the final step
//!
//! Beginning an order yields a [`CheckoutSession`] that owns the checkout page.
//! Completing it picks the first pickup time and prepares the checkout form.
//!
//! The prepared checkout form is never transmitted: completing an order
//! reports success without placing anything. Whether real submission should
//! ever be enabled is an open product decision.

use crate::agent::{Form, Page};
use crate::scrape::{CheckoutItems, LineItem, Receipt, UnrecognizedCell};
use crate::{Result, SubwayError};

/// Form holding the pickup-time radio buttons
pub const PICKUP_FORM: &str = "aspnetForm";

/// Form that places the order
pub const CHECKOUT_FORM: &str = "frmCheckout";

/// The checkout page of one favorite and the line items scraped from it
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    favorite_id: String,
    page: Page,
    checkout: CheckoutItems,
}

impl CheckoutSession {
    pub fn new(favorite_id: impl Into<String>, page: Page, checkout: CheckoutItems) -> Self {
        Self {
            favorite_id: favorite_id.into(),
            page,
            checkout,
        }
    }

    pub fn favorite_id(&self) -> &str {
        &self.favorite_id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Classified checkout cells in page order
    pub fn items(&self) -> &[LineItem] {
        &self.checkout.items
    }

    /// Checkout cells whose class was not recognized
    pub fn skipped(&self) -> &[UnrecognizedCell] {
        &self.checkout.skipped
    }

    /// Line items grouped for display
    pub fn receipt(&self) -> Result<Receipt> {
        Receipt::from_items(self.items())
            .map_err(|e| SubwayError::extraction(self.page.url(), e.to_string()))
    }
}

/// The forms of a checkout page, ready to be sent
#[derive(Debug, Clone)]
pub struct PreparedOrder {
    /// Pickup form with its first time slot checked
    pub pickup: Form,

    /// Final checkout form
    pub checkout: Form,

    /// Pairs the checkout form would send with its last button
    pub payload: Vec<(String, String)>,
}

/// Selects the first pickup time and prepares the checkout form
pub fn prepare_order(session: &CheckoutSession) -> Result<PreparedOrder> {
    let page = session.page();
    let find = |name: &str| {
        page.form_named(name).cloned().ok_or_else(|| {
            SubwayError::extraction(page.url(), format!("checkout page has no '{}' form", name))
        })
    };

    let mut pickup = find(PICKUP_FORM)?;
    pickup
        .check_radio(0)
        .map_err(|e| SubwayError::extraction(page.url(), e.to_string()))?;

    let checkout = find(CHECKOUT_FORM)?;
    let payload = checkout.submission(checkout.buttons().last());

    Ok(PreparedOrder {
        pickup,
        checkout,
        payload,
    })
}

/// Finishes the order flow for `session`
///
/// Always returns `Ok(true)` once the forms are prepared. Nothing is sent to
/// the site.
pub fn complete_order(session: CheckoutSession) -> Result<bool> {
    let prepared = prepare_order(&session)?;

    tracing::debug!(
        "Prepared {} submission to {} with {} fields",
        CHECKOUT_FORM,
        prepared.checkout.action(),
        prepared.payload.len()
    );
    tracing::warn!(
        "Order for favorite {} was not transmitted; final submission is disabled",
        session.favorite_id()
    );

    Ok(true)
}
