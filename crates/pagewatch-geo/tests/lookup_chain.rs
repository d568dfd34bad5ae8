//! Integration tests for `GeoLookupClient::resolve` using wiremock HTTP mocks.
//!
//! Each test stands up one mock server per provider so call counts can be
//! asserted independently.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pagewatch_geo::{GeoLookupClient, GeoProvider, LookupSource, PLACEHOLDER_TOKEN};

fn chain(ipapi: &MockServer, ipify: &MockServer) -> GeoLookupClient {
    GeoLookupClient::with_providers(
        5,
        "pagewatch-test/0.1",
        vec![
            GeoProvider::ipapi_at(&ipapi.uri()).expect("ipapi provider"),
            GeoProvider::ipify_at(&ipify.uri()).expect("ipify provider"),
        ],
    )
    .expect("client construction should not fail")
}

async fn mount_ipapi(server: &MockServer, template: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(template)
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_ipify(server: &MockServer, template: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("format", "json"))
        .respond_with(template)
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn primary_success_skips_fallback() {
    let ipapi = MockServer::start().await;
    let ipify = MockServer::start().await;
    mount_ipapi(
        &ipapi,
        ResponseTemplate::new(200).set_body_json(json!({
            "ip": "203.0.113.9",
            "city": "Porto",
            "region": "Porto",
            "country_name": "Portugal"
        })),
        1,
    )
    .await;
    mount_ipify(&ipify, ResponseTemplate::new(200), 0).await;

    let info = chain(&ipapi, &ipify).resolve().await;

    assert_eq!(info.ip, "203.0.113.9");
    assert_eq!(info.source, LookupSource::Ipapi);
    assert_eq!(info.location.city.as_deref(), Some("Porto"));
    assert_eq!(info.country(), "Portugal");
}

#[tokio::test]
async fn primary_missing_fields_are_filled_with_placeholder() {
    let ipapi = MockServer::start().await;
    let ipify = MockServer::start().await;
    mount_ipapi(
        &ipapi,
        ResponseTemplate::new(200).set_body_json(json!({"ip": "203.0.113.10"})),
        1,
    )
    .await;

    let info = chain(&ipapi, &ipify).resolve().await;

    assert_eq!(info.ip, "203.0.113.10");
    assert_eq!(info.location.region.as_deref(), Some(PLACEHOLDER_TOKEN));
    assert_eq!(info.country(), PLACEHOLDER_TOKEN);
}

#[tokio::test]
async fn primary_server_error_falls_back_to_ip_only_lookup() {
    let ipapi = MockServer::start().await;
    let ipify = MockServer::start().await;
    mount_ipapi(&ipapi, ResponseTemplate::new(503), 1).await;
    mount_ipify(
        &ipify,
        ResponseTemplate::new(200).set_body_json(json!({"ip": "198.51.100.23"})),
        1,
    )
    .await;

    let info = chain(&ipapi, &ipify).resolve().await;

    assert_eq!(info.ip, "198.51.100.23");
    assert_eq!(info.source, LookupSource::Ipify);
    assert_eq!(info.country(), PLACEHOLDER_TOKEN);
}

#[tokio::test]
async fn primary_error_flag_in_ok_body_falls_back() {
    let ipapi = MockServer::start().await;
    let ipify = MockServer::start().await;
    mount_ipapi(
        &ipapi,
        ResponseTemplate::new(200)
            .set_body_json(json!({"error": true, "reason": "RateLimited"})),
        1,
    )
    .await;
    mount_ipify(
        &ipify,
        ResponseTemplate::new(200).set_body_json(json!({"ip": "198.51.100.24"})),
        1,
    )
    .await;

    let info = chain(&ipapi, &ipify).resolve().await;

    assert_eq!(info.source, LookupSource::Ipify);
}

#[tokio::test]
async fn malformed_primary_body_falls_back() {
    let ipapi = MockServer::start().await;
    let ipify = MockServer::start().await;
    mount_ipapi(
        &ipapi,
        ResponseTemplate::new(200).set_body_string("<html>nope</html>"),
        1,
    )
    .await;
    mount_ipify(
        &ipify,
        ResponseTemplate::new(200).set_body_json(json!({"ip": "198.51.100.25"})),
        1,
    )
    .await;

    let info = chain(&ipapi, &ipify).resolve().await;

    assert_eq!(info.ip, "198.51.100.25");
}

#[tokio::test]
async fn exhausted_chain_returns_four_octet_placeholder() {
    let ipapi = MockServer::start().await;
    let ipify = MockServer::start().await;
    mount_ipapi(&ipapi, ResponseTemplate::new(500), 1).await;
    mount_ipify(
        &ipify,
        ResponseTemplate::new(200).set_body_json(json!({"ip": ""})),
        1,
    )
    .await;

    let info = chain(&ipapi, &ipify).resolve().await;

    assert_eq!(info.source, LookupSource::Placeholder);
    let ip: std::net::Ipv4Addr = info.ip.parse().expect("placeholder parses as IPv4");
    assert_eq!(ip.octets().len(), 4);
    assert_eq!(info.country(), PLACEHOLDER_TOKEN);
}

#[tokio::test]
async fn unreachable_providers_still_resolve() {
    // Port 9 (discard) on localhost is not listening in test environments.
    let client = GeoLookupClient::with_providers(
        1,
        "pagewatch-test/0.1",
        vec![
            GeoProvider::ipapi_at("http://127.0.0.1:9").expect("ipapi provider"),
            GeoProvider::ipify_at("http://127.0.0.1:9").expect("ipify provider"),
        ],
    )
    .expect("client");

    let info = client.resolve().await;

    assert_eq!(info.source, LookupSource::Placeholder);
    assert_eq!(info.ip.split('.').count(), 4);
}
