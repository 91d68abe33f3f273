//! # Permission Refresh Flows
//!
//! A refresh replaces the whole table at once; a failed refresh changes
//! nothing.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use pr_01_permissions::PermissionApi;

    #[tokio::test]
    async fn test_refresh_grants_new_parcels() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let address = user.address().to_string();
        let relay = RelayHarness::start(&upstream.base_url, grant(&address, &["10,10"]), |_| {}).await;

        let response = publish(&relay, &Upload::signed(&user, &["20,20"], None)).await;
        assert_eq!(response.status(), 403);

        relay.write_authorizations(&grant(&address, &["10,10", "20,20"]).to_string());
        let report = relay.permissions.refresh().await.unwrap();
        assert_eq!(report.identities, 1);

        let response = publish(&relay, &Upload::signed(&user, &["20,20"], None)).await;
        assert_eq!(response.status(), 200);
        assert_eq!(upstream.uploads().len(), 1);

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_table() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let address = user.address().to_string();
        let relay = RelayHarness::start(&upstream.base_url, grant(&address, &["10,10"]), |_| {}).await;
        let before = relay.permissions.snapshot().generation();

        relay.write_authorizations("{ not json");
        assert!(relay.permissions.refresh().await.is_err());
        assert_eq!(relay.permissions.snapshot().generation(), before);

        let response = publish(&relay, &Upload::signed(&user, &["10,10"], None)).await;
        assert_eq!(response.status(), 200);

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_expired_grant_is_ignored() {
        let upstream = MockUpstream::start().await;
        let user = wallet(USER_KEY);
        let expired = serde_json::json!([{
            "name": "old",
            "desc": "",
            "startDate": 1500000000000i64,
            "endDate": 1600000000000i64,
            "addresses": [user.address().to_string()],
            "plots": ["10,10"],
        }]);
        let relay = RelayHarness::start(&upstream.base_url, expired, |_| {}).await;

        let response = publish(&relay, &Upload::signed(&user, &["10,10"], None)).await;
        assert_eq!(response.status(), 403);
        assert_eq!(response.text().await.unwrap(), "Address not found");

        relay.stop().await;
    }
}
