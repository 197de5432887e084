use crate::agent::{Agent, Page};
use crate::config::Credentials;
use crate::{Result, SubwayError};
use url::Url;

/// Login form field holding the e-mail address
pub const USER_FIELD: &str = "User";

/// Login form field holding the password
pub const PASSWORD_FIELD: &str = "password";

/// Logs in and returns the authenticated home page
///
/// # Login Flow
///
/// 1. GET the site root
/// 2. Fill the first form on it with the credentials
/// 3. Submit it with its first button
/// 4. Follow the first link of the page that comes back
///
/// A single attempt is made. Missing markup at any step, or a response that
/// re-serves the login form, fails with `SubwayError::Authentication`.
pub async fn authenticate(agent: &Agent, credentials: &Credentials, base_url: &Url) -> Result<Page> {
    tracing::info!("Opening {}", base_url);
    let root = agent.get(base_url).await?;

    let mut form = root.forms().first().cloned().ok_or_else(|| {
        SubwayError::Authentication(format!("no login form on {}", root.url()))
    })?;

    let unexpected_form = |e: SubwayError| SubwayError::Authentication(e.to_string());
    form.set_field(USER_FIELD, credentials.username())
        .map_err(unexpected_form)?;
    form.set_field(PASSWORD_FIELD, credentials.password())
        .map_err(unexpected_form)?;

    let button = form.buttons().first().ok_or_else(|| {
        SubwayError::Authentication(format!("login form on {} has no button", root.url()))
    })?;

    tracing::info!("Logging in as {}", credentials.username());
    let redirect = agent.submit(&form, Some(button)).await?;

    if shows_login_form(&redirect) {
        return Err(SubwayError::Authentication(format!(
            "credentials for {} were rejected",
            credentials.username()
        )));
    }

    let link = redirect.links().first().ok_or_else(|| {
        SubwayError::Authentication(format!(
            "no link to follow after login on {}",
            redirect.url()
        ))
    })?;

    let home = agent.click(link).await?;
    tracing::info!("Logged in, home page is {}", home.url());

    Ok(home)
}

/// True when the first form on the page is the login form again
///
/// Other forms with a password input, such as a change-password box on the
/// landing page, do not count.
fn shows_login_form(page: &Page) -> bool {
    page.forms().first().map_or(false, |form| {
        form.field_value(USER_FIELD).is_some() && form.field_value(PASSWORD_FIELD).is_some()
    })
}
