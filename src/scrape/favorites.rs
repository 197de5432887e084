//! Favorites table on the logged-in home page

use crate::agent::{parse_selector, Link, Page};
use crate::{Result, SubwayError};
use scraper::ElementRef;

/// Rows of the favorites table
const FAVORITE_ROWS: &str = "#HomeFaves table tr";

/// A saved order on the user's account
///
/// Text fields hold the element's full text with leading and trailing
/// whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    /// Identifier shown by the site
    pub id: String,

    /// Human-readable name of the saved order
    pub description: String,

    /// `href` of the favorite's order link, exactly as written in the markup
    pub href: String,

    /// Store the order is placed with
    pub location: String,

    /// Product names in display order
    pub products: Vec<String>,

    /// Live link handle that opens the favorite's checkout page
    pub link: Link,
}

/// Parses every row of the favorites table, in table order
///
/// A row that does not have the expected shape fails the whole extraction;
/// rows are never skipped.
pub fn extract_favorites(page: &Page) -> Result<Vec<Favorite>> {
    let row_selector = parse_selector(FAVORITE_ROWS)?;
    let cell_selector = parse_selector("td")?;
    let name_selector = parse_selector(".FaveName a")?;
    let vendor_selector = parse_selector(".VendorName")?;
    let product_selector = parse_selector(".FaveProducts li")?;

    let document = page.document();
    let links = page.link_index();
    let mut favorites = Vec::new();

    for (row_index, row) in document.select(&row_selector).enumerate() {
        let missing = |what: &str| {
            SubwayError::extraction(
                page.url(),
                format!("favorite row {} has no {}", row_index, what),
            )
        };

        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        let id_cell = cells.get(1).ok_or_else(|| missing("id cell"))?;
        let info_cell = cells.get(2).ok_or_else(|| missing("info cell"))?;

        let name_link = info_cell
            .select(&name_selector)
            .next()
            .ok_or_else(|| missing("name link"))?;
        let href = name_link
            .value()
            .attr("href")
            .ok_or_else(|| missing("href on its name link"))?
            .to_string();

        let location = info_cell
            .select(&vendor_selector)
            .next()
            .map(element_text)
            .ok_or_else(|| missing("vendor name"))?;

        let products = info_cell
            .select(&product_selector)
            .map(element_text)
            .collect();

        let link = links.get(&href).cloned().ok_or_else(|| {
            SubwayError::extraction(
                page.url(),
                format!("no link on the page matches favorite href '{}'", href),
            )
        })?;

        favorites.push(Favorite {
            id: element_text(*id_cell),
            description: element_text(name_link),
            href,
            location,
            products,
            link,
        });
    }

    tracing::debug!("Extracted {} favorites from {}", favorites.len(), page.url());

    Ok(favorites)
}

/// Full text of an element with surrounding whitespace removed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
