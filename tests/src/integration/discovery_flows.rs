//! # Discovery Flows
//!
//! Public reads under `/content/*` pass through with status and body intact
//! and only whitelisted headers.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;

    #[tokio::test]
    async fn test_discovery_filters_headers_and_keeps_query() {
        let upstream = MockUpstream::start().await;
        let relay = RelayHarness::start(&upstream.base_url, serde_json::json!([]), |_| {}).await;

        let response = reqwest::get(relay.url("/content/available-content?cid=bafy1&cid=bafy2"))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let headers = response.headers().clone();
        assert_eq!(headers["content-type"], "application/json");
        assert!(headers.get("access-control-allow-origin").is_some());
        assert!(headers.get("set-cookie").is_none());
        assert!(headers.get("x-powered-by").is_none());
        assert_eq!(
            response.text().await.unwrap(),
            r#"[{"cid":"bafy1","available":true}]"#
        );

        assert_eq!(
            upstream.state.discovery_paths.lock()[0],
            "/content/available-content?cid=bafy1&cid=bafy2"
        );

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_discovery_passes_upstream_errors_through() {
        let upstream = MockUpstream::start().await;
        let relay = RelayHarness::start(&upstream.base_url, serde_json::json!([]), |_| {}).await;

        let response = reqwest::get(relay.url("/content/contents/bafymissing")).await.unwrap();
        assert_eq!(response.status(), 404);

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_discovery_never_leaves_content_prefix() {
        let upstream = MockUpstream::start().await;
        let relay = RelayHarness::start(&upstream.base_url, serde_json::json!([]), |_| {}).await;

        for target in [
            "/content/../lambdas/secret",
            "/content/%2e%2e/admin/x",
            "/content/x/..%2F..%2Fadmin",
        ] {
            let status_line = raw_get(&relay, target).await;
            assert!(status_line.starts_with("HTTP/1.1 404"), "{target}: {status_line}");
        }
        assert!(upstream.state.discovery_paths.lock().is_empty());

        let status_line = raw_get(&relay, "/content/contents/bafymissing").await;
        assert!(status_line.starts_with("HTTP/1.1 404"));
        assert_eq!(
            upstream.state.discovery_paths.lock().as_slice(),
            ["/content/contents/bafymissing".to_string()]
        );

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_discovery_unreachable_upstream_is_bad_gateway() {
        let relay = RelayHarness::start(&closed_port_url().await, serde_json::json!([]), |_| {}).await;

        let response = reqwest::get(relay.url("/content/available-content")).await.unwrap();
        assert_eq!(response.status(), 502);

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_health_and_about() {
        let relay = RelayHarness::start(&closed_port_url().await, serde_json::json!([]), |config| {
            config.about.realm_name = "IntegrationRealm".into();
        })
        .await;

        for (path, expected) in [
            ("/health/ready", "ready"),
            ("/health/startup", "[server] ok"),
            ("/health/live", "alive"),
        ] {
            let body = reqwest::get(relay.url(path)).await.unwrap().text().await.unwrap();
            assert_eq!(body, expected);
        }

        let about: serde_json::Value = reqwest::get(relay.url("/about"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(about["configurations"]["realmName"], "IntegrationRealm");
        let content_url = about["content"]["publicUrl"].as_str().unwrap();
        assert!(content_url.ends_with("/content"));
        assert!(content_url.starts_with("127.0.0.1:"));

        relay.stop().await;
    }
}
