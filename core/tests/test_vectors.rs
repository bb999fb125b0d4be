//! Verify encoding, media normalization and signup handling against JSON
//! test vectors stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences in request bodies.

use cms_core::{
    encode, normalize, Config, HttpMethod, HttpResponse, MediaItem, MediaResolver, ParamValue,
    SignupForm, SignupForwarder, SignupOutcome, SignupRequest,
};

const BASE_URL: &str = "http://localhost:1337/api";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Query encoding
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let params = match ParamValue::from(case["params"].clone()) {
            ParamValue::Map(map) => map,
            other => panic!("{name}: params must be an object, got {other:?}"),
        };
        assert_eq!(encode(&params), case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[test]
fn media_test_vectors() {
    let raw = include_str!("../../test-vectors/media.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let config = Config::new(BASE_URL).with_assets_base(vectors["assets_base"].as_str().unwrap());
    let resolver = MediaResolver::new(&config);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let field = &case["field"];

        let expected_items: Vec<MediaItem> = case["expected_items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| MediaItem {
                url: item["url"].as_str().unwrap().to_string(),
                alt_text: item["alt_text"].as_str().unwrap().to_string(),
            })
            .collect();
        assert_eq!(normalize(field), expected_items, "{name}: items");

        let expected_urls: Vec<String> =
            serde_json::from_value(case["expected_urls"].clone()).unwrap();
        assert_eq!(resolver.urls_from(field), expected_urls, "{name}: urls");
        assert_eq!(
            resolver.first_url_from(field),
            expected_urls.first().cloned().unwrap_or_default(),
            "{name}: first url"
        );
    }
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[test]
fn signup_test_vectors() {
    let raw = include_str!("../../test-vectors/signup.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let forwarder = SignupForwarder::with_transport(Config::new(BASE_URL), ());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let form: SignupForm = serde_json::from_value(case["form"].clone()).unwrap();

        let outcome = match SignupRequest::from_form(form) {
            Err(error) => {
                assert!(case.get("expected_request").is_none(), "{name}: expected a request");
                SignupOutcome::Rejected(error)
            }
            Ok(request) => {
                // Verify build
                let expected_req = &case["expected_request"];
                let req = forwarder.build_submit(&request);
                assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
                assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
                let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");

                // Verify parse
                let sim = &case["simulated_response"];
                forwarder.parse_submit(HttpResponse {
                    status: sim["status"].as_u64().unwrap() as u16,
                    headers: Vec::new(),
                    body: sim["body"].as_str().unwrap().to_string(),
                })
            }
        };

        assert_eq!(u64::from(outcome.status()), case["expected_status"].as_u64().unwrap(), "{name}: status");
        assert_eq!(outcome.to_json(), case["expected_body"], "{name}: body");
    }
}
