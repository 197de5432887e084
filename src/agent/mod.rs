//! Agent module: the HTTP/DOM client the site scraper is written against
//!
//! This module contains:
//! - An HTTP agent with a cookie-backed session
//! - Pages with their links and forms extracted
//! - A form model that can be edited and serialized for submission

mod client;
mod form;
mod page;

pub use client::{build_http_client, Agent};
pub use form::{Button, ButtonKind, Field, FieldKind, Form, Method};
pub use page::{parse_selector, Link, LinkIndex, Page};
