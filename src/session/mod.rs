//! Session module: the logged-in client
//!
//! [`Subway`] owns the cookie-backed agent for the lifetime of the process.
//! Logging in also scrapes the favorites so they are available straight away.

mod login;

pub use login::{authenticate, PASSWORD_FIELD, USER_FIELD};

use crate::agent::{Agent, Page};
use crate::config::{Config, Credentials, UserAgentConfig};
use crate::order::{self, CheckoutSession};
use crate::scrape::{extract_favorites, extract_line_items, Favorite};
use crate::{Result, SubwayError};
use url::Url;

/// An authenticated session with the site
#[derive(Debug)]
pub struct Subway {
    agent: Agent,
    home_page: Page,
    favorites: Vec<Favorite>,
}

impl Subway {
    /// Logs in at `base_url` and scrapes the favorites from the home page
    pub async fn login(
        credentials: Credentials,
        user_agent: &UserAgentConfig,
        base_url: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let agent = Agent::new(user_agent)?;

        let home_page = authenticate(&agent, &credentials, &base_url).await?;
        let favorites = extract_favorites(&home_page)?;
        tracing::info!("Found {} favorites", favorites.len());

        Ok(Self {
            agent,
            home_page,
            favorites,
        })
    }

    /// Logs in with the account, site and user agent from `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::login(config.credentials(), &config.user_agent, &config.site.base_url).await
    }

    /// Home page reached after login
    pub fn home_page(&self) -> &Page {
        &self.home_page
    }

    /// Favorites in the order the site lists them
    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn favorite(&self, index: usize) -> Option<&Favorite> {
        self.favorites.get(index)
    }

    /// Opens the checkout page of `favorite` and classifies its line items
    pub async fn begin_order(&self, favorite: &Favorite) -> Result<CheckoutSession> {
        tracing::info!(
            "Beginning order for favorite {} ({})",
            favorite.id,
            favorite.description
        );

        let page = self.agent.click(&favorite.link).await?;
        let checkout = extract_line_items(&page)?;

        Ok(CheckoutSession::new(favorite.id.clone(), page, checkout))
    }

    /// Like [`Subway::begin_order`], by position in [`Subway::favorites`]
    pub async fn begin_order_at(&self, index: usize) -> Result<CheckoutSession> {
        let favorite = self.favorite(index).ok_or_else(|| {
            SubwayError::Navigation(format!(
                "no favorite at index {} ({} available)",
                index,
                self.favorites.len()
            ))
        })?;
        self.begin_order(favorite).await
    }

    /// Picks the first pickup time and prepares the checkout
    ///
    /// The order is not transmitted; see [`crate::order`].
    pub fn complete_order(&self, session: CheckoutSession) -> Result<bool> {
        order::complete_order(session)
    }
}
