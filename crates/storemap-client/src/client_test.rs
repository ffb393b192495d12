use super::*;

fn test_client(base_url: &str) -> DataClient {
    DataClient::with_base_url(base_url, ClientOptions::default())
        .expect("client construction should not fail")
}

#[test]
fn base_url_gains_trailing_slash() {
    let client = test_client("http://backend.test/v2");
    assert_eq!(client.base_url().as_str(), "http://backend.test/v2/");
    assert_eq!(
        join(client.base_url(), "api/cities").unwrap().as_str(),
        "http://backend.test/v2/api/cities"
    );
}

#[test]
fn boundaries_default_under_base() {
    let client = test_client("http://backend.test/");
    assert_eq!(
        client.boundaries_url().as_str(),
        "http://backend.test/static/boundaries.geojson"
    );
}

#[test]
fn boundaries_url_can_be_overridden() {
    let client = test_client("http://backend.test")
        .with_boundaries_url("https://cdn.test/kosovo.geojson")
        .unwrap();
    assert_eq!(client.boundaries_url().host_str(), Some("cdn.test"));
}

#[test]
fn rejects_non_http_base_url() {
    let err = DataClient::with_base_url("ftp://backend.test", ClientOptions::default()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    let err = DataClient::with_base_url("not a url", ClientOptions::default()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
}

#[test]
fn envelope_is_unwrapped() {
    let wrapped = serde_json::json!({ "data": [1, 2], "meta": {} });
    assert_eq!(unwrap_envelope(wrapped), serde_json::json!([1, 2]));
    let bare = serde_json::json!([3]);
    assert_eq!(unwrap_envelope(bare.clone()), bare);
    let odd = serde_json::json!({ "data": "nope" });
    assert_eq!(unwrap_envelope(odd.clone()), odd);
}

#[test]
fn parse_collection_names_context_on_failure() {
    let err = parse_collection::<storemap_core::CityRecord>("{oops", "cities.json").unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { ref context, .. } if context == "cities.json"));

    let cities: Vec<storemap_core::CityRecord> =
        parse_collection(r#"{ "data": [{ "code": "1", "name": "Peja" }] }"#, "cities.json").unwrap();
    assert_eq!(cities.len(), 1);
}
