#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;
    use regex::Regex;
    use reqwest::{blocking::Client, header::CONTENT_TYPE, Method, StatusCode};
    use serde_json::{json, Value};
    use shadow_destinations::{
        deterministic_destination_test, fault_destination_test, DestinationConfiguration,
        ScriptedRandom, TestDestination, CORS_HEADERS,
    };
    use std::{sync::Arc, thread};

    lazy_static! {
        static ref TRACE_ID_REGEX: Regex = Regex::new(r"^trace-[0-9a-z]{9}$").unwrap();
    }

    const CATALOG_STATUSES: [u16; 10] = [400, 401, 403, 404, 409, 422, 429, 500, 502, 503];

    fn assert_cors_headers(response: &reqwest::blocking::Response) {
        for (name, value) in CORS_HEADERS.iter() {
            assert_eq!(response.headers()[*name], *value, "header {}", name);
        }
    }

    fn script_every_scenario_then_success(configuration: &mut DestinationConfiguration) {
        let mut units = vec![0.0; 10];
        units.push(0.95);
        configuration.set_random_source(Arc::new(ScriptedRandom::new(units, 0..10)));
    }

    fn always_succeed(configuration: &mut DestinationConfiguration) {
        configuration.set_random_source(Arc::new(ScriptedRandom::new(vec![0.99], vec![])));
    }

    #[deterministic_destination_test]
    fn get_echoes_the_request(destination: &TestDestination) {
        let response = Client::new()
            .get(destination.url("/api/items?page=2&sort=asc&page=3"))
            .header("X-Request-ID", "req-1001")
            .header("X-Client-Version", "2.0.1")
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors_headers(&response);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body: Value = response.json().unwrap();
        assert_eq!(body["app"], "test-destination-app1");
        assert_eq!(body["port"], destination.port());
        assert_eq!(body["message"], "GET request successfully processed by App1");
        assert_eq!(body["received"]["method"], "GET");
        assert_eq!(body["received"]["url"], "/api/items?page=2&sort=asc&page=3");
        assert_eq!(body["received"]["path"], "/api/items");
        assert_eq!(
            body["received"]["query"],
            json!({ "page": ["2", "3"], "sort": "asc" })
        );
        assert_eq!(body["received"]["headers"]["x-request-id"], "req-1001");
        assert_eq!(body["received"]["headers"]["x-client-version"], "2.0.1");
        assert_eq!(body["received"]["body"], json!({}));
    }

    #[deterministic_destination_test]
    fn post_round_trips_the_json_body(destination: &TestDestination) {
        let sent = json!({
            "user": { "name": "Grace", "languages": ["COBOL", "FLOW-MATIC"] },
            "active": true,
            "score": 99.5
        });

        let response = Client::new()
            .post(destination.url("/users"))
            .json(&sent)
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().unwrap();
        assert_eq!(body["received"]["body"], sent);
        assert_eq!(body["message"], "Resource created successfully by App1");
    }

    #[deterministic_destination_test]
    fn form_bodies_are_parsed(destination: &TestDestination) {
        let response = Client::new()
            .put(destination.url("/profile"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("name=Grace+Hopper&rank=Rear+Admiral")
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().unwrap();
        assert_eq!(
            body["received"]["body"],
            json!({ "name": "Grace Hopper", "rank": "Rear Admiral" })
        );
    }

    #[deterministic_destination_test]
    fn malformed_json_is_not_rejected(destination: &TestDestination) {
        let response = Client::new()
            .post(destination.url("/users"))
            .header(CONTENT_TYPE, "application/json")
            .body("{\"name\": ")
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().unwrap();
        assert_eq!(body["received"]["body"], json!({}));
    }

    #[deterministic_destination_test]
    fn oversized_body_still_gets_a_response(destination: &TestDestination) {
        let items = vec!["0123456789abcdef"; 512 * 1024];
        let payload = serde_json::to_vec(&json!({ "items": items })).unwrap();
        assert!(payload.len() > 8 * 1024 * 1024);

        let response = Client::new()
            .post(destination.url("/bulk/import"))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_cors_headers(&response);
        let body: Value = response.json().unwrap();
        assert_eq!(body["received"]["body"], json!({}));
        assert_eq!(body["received"]["path"], "/bulk/import");
    }

    #[deterministic_destination_test]
    fn repeated_cookies_are_echoed_joined(destination: &TestDestination) {
        let body: Value = Client::new()
            .get(destination.url("/session"))
            .header("Cookie", "session=a1")
            .header("Cookie", "theme=dark")
            .send()
            .unwrap()
            .json()
            .unwrap();

        assert_eq!(body["received"]["headers"]["cookie"], "session=a1; theme=dark");
    }

    #[deterministic_destination_test]
    fn delete_is_no_content(destination: &TestDestination) {
        let response = Client::new()
            .delete(destination.url("/users/12"))
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors_headers(&response);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(response.bytes().unwrap().is_empty());
    }

    #[deterministic_destination_test]
    fn other_methods_are_ok(destination: &TestDestination) {
        let client = Client::new();
        let purge = Method::from_bytes(b"PURGE").unwrap();

        for method in [Method::PUT, Method::PATCH, purge].iter() {
            let response = client
                .request(method.clone(), destination.url("/cache/entry"))
                .send()
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "method {}", method);
            let body: Value = response.json().unwrap();
            assert_eq!(body["received"]["method"], method.as_str());
            assert_eq!(
                body["message"],
                format!("{} request successfully processed by App1", method)
            );
        }

        let head = client.head(destination.url("/cache/entry")).send().unwrap();
        assert_eq!(head.status(), StatusCode::OK);
        assert!(head.bytes().unwrap().is_empty());
    }

    #[deterministic_destination_test]
    fn options_is_a_bare_ok(destination: &TestDestination) {
        let response = Client::new()
            .request(Method::OPTIONS, destination.url("/anything/at/all?x=1"))
            .header(CONTENT_TYPE, "application/json")
            .body("{\"ignored\": true}")
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors_headers(&response);
        assert!(response.bytes().unwrap().is_empty());
    }

    #[deterministic_destination_test]
    fn replays_differ_only_in_timestamp(destination: &TestDestination) {
        let client = Client::new();
        let send = || -> Value {
            let mut body: Value = client
                .patch(destination.url("/settings?theme=dark"))
                .header("X-API-Key", "k-123")
                .json(&json!({ "notifications": false }))
                .send()
                .unwrap()
                .json()
                .unwrap();
            assert!(body["timestamp"].is_string());
            body.as_object_mut().unwrap().remove("timestamp");
            body
        };

        let first = send();
        assert_eq!(first, send());
        assert_eq!(first, send());
    }

    #[deterministic_destination_test]
    fn concurrent_requests_are_independent(destination: &TestDestination) {
        let base_url = destination.base_url();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let base_url = base_url.clone();
                thread::spawn(move || {
                    let client = Client::new();
                    for j in 0..10 {
                        let request_id = format!("req-{}-{}", i, j);
                        let body: Value = client
                            .get(format!("{}/worker/{}", base_url, i))
                            .header("X-Request-ID", request_id.as_str())
                            .send()
                            .unwrap()
                            .json()
                            .unwrap();
                        assert_eq!(body["received"]["headers"]["x-request-id"], request_id);
                        assert_eq!(body["received"]["path"], format!("/worker/{}", i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[fault_destination_test(script_every_scenario_then_success)]
    fn walks_every_scenario_then_succeeds(destination: &TestDestination) {
        let client = Client::new();
        let mut statuses = Vec::new();

        for _ in 0..11 {
            let response = client
                .get(destination.url("/orders/77?expand=items"))
                .send()
                .unwrap();
            assert_cors_headers(&response);
            assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

            let status = response.status().as_u16();
            let body: Value = response.json().unwrap();
            statuses.push(status);

            match status {
                404 => assert_eq!(body["requestedPath"], "/orders/77?expand=items"),
                500 => {
                    let trace_id = body["traceId"].as_str().unwrap();
                    assert!(TRACE_ID_REGEX.is_match(trace_id), "trace id {}", trace_id);
                }
                200 => {
                    assert_eq!(body["lucky"], "You got a success response! (30% chance)");
                    assert_eq!(body["received"]["path"], "/orders/77");
                }
                _ => {}
            }

            if status != 200 {
                assert_eq!(body["path"], "/orders/77?expand=items");
                assert_eq!(body["method"], "GET");
                assert_eq!(body["app"], "test-destination-app3-error-simulator");
                assert_eq!(body["port"], destination.port());
                assert!(body["error"].is_string());
                assert!(body["code"].is_string());
            }
        }

        let mut expected = CATALOG_STATUSES.to_vec();
        expected.push(200);
        assert_eq!(statuses, expected);
    }

    #[fault_destination_test(always_succeed)]
    fn lucky_delete_is_no_content(destination: &TestDestination) {
        let response = Client::new()
            .delete(destination.url("/orders/77"))
            .send()
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.bytes().unwrap().is_empty());
    }

    #[fault_destination_test]
    fn options_bypasses_fault_injection(destination: &TestDestination) {
        let client = Client::new();

        for _ in 0..20 {
            let response = client
                .request(Method::OPTIONS, destination.url("/orders"))
                .send()
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_cors_headers(&response);
            assert!(response.bytes().unwrap().is_empty());
        }
    }

    #[fault_destination_test]
    fn live_randomness_only_yields_known_statuses(destination: &TestDestination) {
        let client = Client::new();

        for _ in 0..200 {
            let status = client
                .post(destination.url("/payments"))
                .json(&json!({ "amount": 10 }))
                .send()
                .unwrap()
                .status()
                .as_u16();

            assert!(
                status == 201 || CATALOG_STATUSES.contains(&status),
                "unexpected status {}",
                status
            );
        }
    }
}
