//! Integration tests for the login, favorites and order flow
//!
//! These tests use wiremock to stand in for the ordering site and drive the
//! whole session end-to-end.

use subway_now::config::{Credentials, UserAgentConfig};
use subway_now::{LineItem, LineItemKind, Subway, SubwayError};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_COOKIE: &str = "ASP.NET_SessionId=abc123";

const LOGIN_PAGE: &str = r#"<html><head><title>Subway Now</title></head><body>
    <form name="frmLogin" method="post" action="/Login.aspx">
        <input type="hidden" name="__VIEWSTATE" value="dDwtMTA4">
        <input type="text" name="User">
        <input type="password" name="password">
        <input type="submit" name="btnLogin" value="Log In">
    </form>
</body></html>"#;

const REDIRECT_PAGE: &str = r#"<html><head><title>Object moved</title></head><body>
    <h2>Object moved to <a href="/Home.aspx">here</a>.</h2>
</body></html>"#;

const HOME_PAGE: &str = r#"<html><body>
    <div id="HomeFaves">
        <table>
            <tr>
                <td><img src="fave.png"></td>
                <td>101</td>
                <td>
                    <div class="FaveName"><a href="Order.aspx?fav=101">Lunch Special</a></div>
                    <div class="VendorName">Subway #1234 - Main St</div>
                    <ul class="FaveProducts"><li>Turkey Sub</li></ul>
                </td>
            </tr>
            <tr>
                <td><img src="fave.png"></td>
                <td>102</td>
                <td>
                    <div class="FaveName"><a href="Order.aspx?fav=102">Veggie Night</a></div>
                    <div class="VendorName">Subway #99 - Elm St</div>
                    <ul class="FaveProducts"><li>Veggie Delite</li><li>Cookie</li></ul>
                </td>
            </tr>
        </table>
    </div>
    <a href="/Account/Logout.aspx">Log out</a>
</body></html>"#;

const CHECKOUT_PAGE_101: &str = r#"<html><body>
    <form name="aspnetForm" method="post" action="Order.aspx?fav=101">
        <input type="radio" name="PickupTime" value="1200">
        <input type="radio" name="PickupTime" value="1215">
    </form>
    <table class="CheckoutList">
        <tr><td class="product">Turkey Sub</td><td class="product money">$5.99</td></tr>
        <tr><td class="total">Total</td><td class="total money">$5.99</td></tr>
    </table>
    <form name="frmCheckout" method="post" action="/Checkout.aspx">
        <input type="hidden" name="OrderId" value="555">
        <input type="submit" name="btnOrder" value="Place Order">
    </form>
</body></html>"#;

const CHECKOUT_PAGE_102: &str = r#"<html><body>
    <form name="aspnetForm" method="post" action="Order.aspx?fav=102">
        <input type="radio" name="PickupTime" value="1800">
    </form>
    <table class="CheckoutList">
        <tr><td class="product">Veggie Delite</td><td class="product money">$4.50</td></tr>
        <tr><td class="optioncheck">Toasted</td></tr>
        <tr><td class="product">Cookie</td><td class="product money">$0.75</td></tr>
        <tr><td class="summary">Tax</td><td class="summary money">$0.36</td></tr>
        <tr><td class="total">Total</td><td class="total money">$5.61</td></tr>
    </table>
    <form name="frmCheckout" method="post" action="/Checkout.aspx">
        <input type="submit" name="btnOrder" value="Place Order">
    </form>
</body></html>"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn test_agent() -> UserAgentConfig {
    UserAgentConfig {
        name: "TestAgent".to_string(),
        version: "1.0".to_string(),
    }
}

fn credentials() -> Credentials {
    Credentials::new("alice@example.com", "secret")
}

/// Mounts the login page and the accepted-credentials login response
async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(LOGIN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Login.aspx"))
        .and(body_string_contains("User=alice%40example.com"))
        .and(body_string_contains("password=secret"))
        .and(body_string_contains("btnLogin=Log+In"))
        .and(body_string_contains("__VIEWSTATE=dDwtMTA4"))
        .respond_with(
            html(REDIRECT_PAGE).insert_header("set-cookie", format!("{}; path=/", SESSION_COOKIE).as_str()),
        )
        .mount(server)
        .await;
}

/// Mounts the full site: login, home page and both checkout pages
async fn mount_site(server: &MockServer) {
    mount_login(server).await;

    // The home page is only served to a logged-in session
    Mock::given(method("GET"))
        .and(path("/Home.aspx"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(html(HOME_PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Order.aspx"))
        .and(query_param("fav", "101"))
        .and(header("cookie", SESSION_COOKIE))
        .and(header("referer", format!("{}/Home.aspx", server.uri()).as_str()))
        .respond_with(html(CHECKOUT_PAGE_101))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Order.aspx"))
        .and(query_param("fav", "102"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(html(CHECKOUT_PAGE_102))
        .mount(server)
        .await;
}

async fn login(server: &MockServer) -> Result<Subway, SubwayError> {
    Subway::login(credentials(), &test_agent(), &format!("{}/", server.uri())).await
}

#[tokio::test]
async fn test_login_and_extract_favorites() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let subway = login(&mock_server).await.expect("Login failed");

    assert!(subway.home_page().url().as_str().ends_with("/Home.aspx"));

    let favorites = subway.favorites();
    assert_eq!(favorites.len(), 2);

    assert_eq!(favorites[0].id, "101");
    assert_eq!(favorites[0].description, "Lunch Special");
    assert_eq!(favorites[0].location, "Subway #1234 - Main St");
    assert_eq!(favorites[0].products, vec!["Turkey Sub"]);
    assert_eq!(favorites[0].link.href(), favorites[0].href);

    assert_eq!(favorites[1].id, "102");
    assert_eq!(favorites[1].description, "Veggie Night");
    assert_eq!(favorites[1].products, vec!["Veggie Delite", "Cookie"]);
    assert_eq!(favorites[1].link.href(), "Order.aspx?fav=102");
}

#[tokio::test]
async fn test_begin_order_follows_selected_favorite() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let subway = login(&mock_server).await.expect("Login failed");
    let session = subway.begin_order_at(0).await.expect("Begin order failed");

    assert_eq!(session.favorite_id(), "101");
    assert_eq!(
        session.items(),
        &[
            LineItem::new(LineItemKind::Product, "Turkey Sub"),
            LineItem::new(LineItemKind::ProductMoney, "5.99"),
            LineItem::new(LineItemKind::Total, "Total"),
            LineItem::new(LineItemKind::TotalMoney, "$5.99"),
        ]
    );
    assert!(session.skipped().is_empty());

    let requests = mock_server.received_requests().await.expect("Recording disabled");
    let order_requests: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/Order.aspx")
        .collect();
    assert_eq!(order_requests.len(), 1);
    assert_eq!(order_requests[0].url.query(), Some("fav=101"));
}

#[tokio::test]
async fn test_complete_order_never_submits_checkout_form() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    // Neither the pickup form nor the checkout form may be posted
    Mock::given(method("POST"))
        .and(path("/Checkout.aspx"))
        .respond_with(html("<html><body>Thank you</body></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Order.aspx"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let subway = login(&mock_server).await.expect("Login failed");
    let session = subway.begin_order_at(0).await.expect("Begin order failed");

    let completed = subway.complete_order(session).expect("Complete order failed");
    assert!(completed);

    // Wiremock verifies the expect(0) mocks when mock_server drops
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let subway = login(&mock_server).await.expect("Login failed");
    let first = subway.begin_order_at(0).await.expect("Begin order failed");
    let second = subway.begin_order_at(1).await.expect("Begin order failed");

    // Starting the second order leaves the first one usable
    assert_eq!(first.items().len(), 4);
    assert!(subway.complete_order(first).expect("Complete order failed"));

    let receipt = second.receipt().expect("Receipt failed");
    assert_eq!(receipt.products.len(), 2);
    assert_eq!(receipt.products[0].options, vec!["Toasted"]);
    assert_eq!(receipt.products[1].price, "0.75");
    assert_eq!(receipt.summary[0].amount, "$0.36");
    assert_eq!(receipt.grand_total().unwrap().amount, "$5.61");
}

#[tokio::test]
async fn test_invalid_credentials_fail_authentication() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(LOGIN_PAGE))
        .mount(&mock_server)
        .await;

    // A rejected login re-serves the login form
    Mock::given(method("POST"))
        .and(path("/Login.aspx"))
        .respond_with(html(LOGIN_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Home.aspx"))
        .respond_with(html(HOME_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = Subway::login(
        Credentials::new("alice@example.com", "wrong"),
        &test_agent(),
        &mock_server.uri(),
    )
    .await;

    assert!(matches!(result, Err(SubwayError::Authentication(_))));
}

#[tokio::test]
async fn test_root_without_form_fails_authentication() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body>Down for maintenance</body></html>"))
        .mount(&mock_server)
        .await;

    let result = login(&mock_server).await;
    match result {
        Err(SubwayError::Authentication(message)) => {
            assert!(message.contains("no login form"), "got: {}", message)
        }
        other => panic!("Expected authentication error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_redirect_without_link_fails_authentication() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(LOGIN_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Login.aspx"))
        .respond_with(html("<html><body>Please wait...</body></html>"))
        .mount(&mock_server)
        .await;

    let result = login(&mock_server).await;
    assert!(matches!(result, Err(SubwayError::Authentication(_))));
}

#[tokio::test]
async fn test_password_box_after_login_is_not_a_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(LOGIN_PAGE))
        .mount(&mock_server)
        .await;

    // Landing page wrapped in the master form, with a change-password box
    Mock::given(method("POST"))
        .and(path("/Login.aspx"))
        .respond_with(
            html(
                r#"<html><body>
                <form name="aspnetForm" method="post" action="/Account/Password.aspx">
                    <input type="password" name="password">
                    <input type="submit" name="btnChange" value="Change">
                </form>
                <a href="/Home.aspx">continue</a>
            </body></html>"#,
            )
            .insert_header("set-cookie", format!("{}; path=/", SESSION_COOKIE).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Home.aspx"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(html(HOME_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let subway = login(&mock_server).await.expect("Login failed");
    assert_eq!(subway.favorites().len(), 2);
}

#[tokio::test]
async fn test_server_error_is_reported_with_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let result = login(&mock_server).await;
    assert!(matches!(
        result,
        Err(SubwayError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_begin_order_out_of_range() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let subway = login(&mock_server).await.expect("Login failed");
    let result = subway.begin_order_at(5).await;
    assert!(matches!(result, Err(SubwayError::Navigation(_))));
}
