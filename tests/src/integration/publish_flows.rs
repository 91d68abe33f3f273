//! # Publish Flows
//!
//! Gated publish through the whole stack.
//!
//! 1. **Authorized**: the upstream receives the files under the relay's chain
//! 2. **Unauthorized parcel**: 403 naming the parcel, nothing forwarded
//! 3. **Upstream timeout**: 400, permission table untouched
//! 4. **Broken chains**: 403 with the specific reason

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use pr_01_permissions::PermissionApi;
    use pr_02_auth_chain::AuthChainCodec;
    use pr_03_upload_relay::ResponsePolicy;
    use shared_types::EntityId;
    use std::time::Duration;

    // =========================================================================
    // AUTHORIZED PUBLISH
    // =========================================================================

    #[tokio::test]
    async fn test_authorized_publish_is_relayed_under_relay_identity() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10", "10,11"]),
            |_| {},
        )
        .await;

        // Declared SIGNER differs in case from the lower-case table entry.
        let declared = user.address().to_checksum();
        let upload = Upload::signed(&user, &["10,10", "10,11"], Some(&declared));
        let response = publish(&relay, &upload).await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["x-extend-cf-timeout"], "10");
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["creationTimestamp"], 1700000000000u64);
        assert_eq!(body["deployedBy"], "mock");

        let uploads = upstream.uploads();
        assert_eq!(uploads.len(), 1);
        let parts = &uploads[0];
        assert_eq!(upstream.state.origins.lock()[0].as_deref(), Some("dcl_linker"));

        // entityId, three fields per relay link, then the files.
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "entityId",
                "authChain[0][type]",
                "authChain[0][payload]",
                "authChain[0][signature]",
                "authChain[1][type]",
                "authChain[1][payload]",
                "authChain[1][signature]",
                ENTITY_ID,
                "bafymodel",
            ]
        );
        assert_eq!(parts[0].text(), ENTITY_ID);
        assert_eq!(parts[2].text(), wallet(RELAY_KEY).address().to_checksum());
        assert_eq!(parts[8].data, b"glTF-binary");
        assert_eq!(parts[8].file_name.as_deref(), Some("bafymodel"));

        // The forwarded chain verifies to the relay, not the user.
        let fields: Vec<(String, String)> = parts[..7]
            .iter()
            .map(|p| (p.name.clone(), p.text()))
            .collect();
        let codec = AuthChainCodec::new();
        let chain = codec.decode_form_fields(&fields).unwrap();
        let verified = codec.verify(&chain, &EntityId::new(ENTITY_ID)).unwrap();
        assert_eq!(verified.address, wallet(RELAY_KEY).address());
        assert_ne!(verified.address, user.address());

        assert!(relay.stop().await);
    }

    #[tokio::test]
    async fn test_creation_timestamp_policy_narrows_response() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |config| config.upstream.response_policy = ResponsePolicy::CreationTimestamp,
        )
        .await;

        let response = publish(&relay, &Upload::signed(&user, &["10,10"], None)).await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"creationTimestamp": 1700000000000u64}));

        relay.stop().await;
    }

    // =========================================================================
    // DENIALS
    // =========================================================================

    #[tokio::test]
    async fn test_unauthorized_parcel_is_forbidden_and_not_forwarded() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        let response = publish(&relay, &Upload::signed(&user, &["10,10", "11,11"], None)).await;
        assert_eq!(response.status(), 403);
        let body = response.text().await.unwrap();
        assert!(body.contains("11,11"), "unexpected body: {body}");
        assert!(upstream.uploads().is_empty());

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_signer_is_forbidden() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        let stranger = wallet(STRANGER_KEY);
        let response = publish(&relay, &Upload::signed(&stranger, &["10,10"], None)).await;
        assert_eq!(response.status(), 403);
        assert_eq!(response.text().await.unwrap(), "Address not found");
        assert!(upstream.uploads().is_empty());

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_missing_signer_is_forbidden() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        let upload = Upload::signed(&user, &["10,10"], None).without_fields("authChain");
        let response = publish(&relay, &upload).await;
        assert_eq!(response.status(), 403);
        assert_eq!(response.text().await.unwrap(), "No AuthChain SIGNER");
        assert!(upstream.uploads().is_empty());

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_claiming_someone_elses_address_is_forbidden() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let stranger = wallet(STRANGER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        // The stranger signs but declares the authorized user's address.
        let upload = Upload::signed(&stranger, &["10,10"], Some(&user.address().to_string()));
        let response = publish(&relay, &upload).await;
        assert_eq!(response.status(), 403);
        assert_eq!(response.text().await.unwrap(), "Address doesn't match");
        assert!(upstream.uploads().is_empty());

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_missing_entity_file_is_bad_request() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        let mut upload = Upload::signed(&user, &["10,10"], None);
        upload.files.retain(|(name, _)| name != ENTITY_ID);
        let response = publish(&relay, &upload).await;
        assert_eq!(response.status(), 400);
        assert!(upstream.uploads().is_empty());

        relay.stop().await;
    }

    // =========================================================================
    // UPSTREAM FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_upstream_timeout_is_bad_request_and_keeps_snapshot() {
        let upstream = MockUpstream::start().await;
        *upstream.state.delay.lock() = Some(Duration::from_secs(3));
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |config| config.upstream.upload_timeout = Duration::from_millis(300),
        )
        .await;
        let generation = relay.permissions.snapshot().generation();

        let response = publish(&relay, &Upload::signed(&user, &["10,10"], None)).await;
        assert_eq!(response.status(), 400);
        assert_eq!(response.headers()["x-extend-cf-timeout"], "10");
        assert!(response.text().await.unwrap().contains("timed out"));

        assert_eq!(relay.permissions.snapshot().generation(), generation);
        assert!(relay
            .permissions
            .snapshot()
            .contains_identity(&user.address().to_string()));

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_bad_request_with_message() {
        let upstream = MockUpstream::start().await;
        *upstream.state.reject.lock() = Some((
            axum::http::StatusCode::BAD_REQUEST,
            "The entity is older than the current one".to_string(),
        ));
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &upstream.base_url,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        let response = publish(&relay, &Upload::signed(&user, &["10,10"], None)).await;
        assert_eq!(response.status(), 400);
        let body = response.text().await.unwrap();
        assert!(body.contains("older than the current one"), "unexpected body: {body}");

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_request() {
        let user = wallet(USER_KEY);
        let relay = RelayHarness::start(
            &closed_port_url().await,
            grant(&user.address().to_string(), &["10,10"]),
            |_| {},
        )
        .await;

        let response = publish(&relay, &Upload::signed(&user, &["10,10"], None)).await;
        assert_eq!(response.status(), 400);
        assert!(response.text().await.unwrap().starts_with("Upstream unavailable"));

        relay.stop().await;
    }
}
