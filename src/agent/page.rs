//! Fetched pages and the link handles found on them

use crate::agent::form::Form;
use crate::{Result, SubwayError};
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

/// A hyperlink found on a page
///
/// The handle remembers the page it came from so following it carries the
/// same Referer a browser would send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    href: String,
    text: String,
    url: Url,
    referer: Url,
}

impl Link {
    /// The `href` attribute exactly as written in the markup
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Link text with surrounding whitespace removed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Absolute target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Page this link was found on
    pub fn referer(&self) -> &Url {
        &self.referer
    }
}

/// Lookup from raw `href` to the first link on the page carrying it
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    by_href: HashMap<String, Link>,
}

impl LinkIndex {
    pub fn build(links: &[Link]) -> Self {
        let mut by_href = HashMap::with_capacity(links.len());
        for link in links {
            by_href
                .entry(link.href.clone())
                .or_insert_with(|| link.clone());
        }
        Self { by_href }
    }

    pub fn get(&self, href: &str) -> Option<&Link> {
        self.by_href.get(href)
    }

    pub fn len(&self) -> usize {
        self.by_href.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_href.is_empty()
    }
}

/// A fetched HTML page
///
/// Links and forms are extracted once when the page is built. The document
/// itself is re-parsed on demand because `scraper::Html` cannot be held
/// across an await point.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    body: String,
    forms: Vec<Form>,
    links: Vec<Link>,
}

impl Page {
    /// Builds a page from the final URL of a response and its body
    pub fn parse(url: Url, body: String) -> Self {
        let document = Html::parse_document(&body);
        let links = extract_links(&document, &url);
        let forms = extract_forms(&document, &url);

        Self {
            url,
            body,
            forms,
            links,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Parses the page body into a queryable document
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// All forms in document order
    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    /// First form whose `name` (or, failing that, `id`) attribute is `name`
    pub fn form_named(&self, name: &str) -> Option<&Form> {
        self.forms
            .iter()
            .find(|f| f.name() == Some(name))
            .or_else(|| self.forms.iter().find(|f| f.id() == Some(name)))
    }

    /// All followable links in document order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_index(&self) -> LinkIndex {
        LinkIndex::build(&self.links)
    }
}

/// Parses a CSS selector, reporting bad syntax as a navigation error
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| SubwayError::Navigation(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Extracts every `<a href>` that resolves against the page URL
fn extract_links(document: &Html, page_url: &Url) -> Vec<Link> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            match page_url.join(href.trim()) {
                Ok(url) => links.push(Link {
                    href: href.to_string(),
                    text: element.text().collect::<String>().trim().to_string(),
                    url,
                    referer: page_url.clone(),
                }),
                Err(e) => tracing::debug!(href, error = %e, "Skipping unresolvable link"),
            }
        }
    }

    links
}

fn extract_forms(document: &Html, page_url: &Url) -> Vec<Form> {
    match Selector::parse("form") {
        Ok(form_selector) => document
            .select(&form_selector)
            .map(|element| Form::from_element(element, page_url))
            .collect(),
        Err(_) => Vec::new(),
    }
}
