#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeDelta, Utc};
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::Value;
    use tracing_test::traced_test;

    use crate::api_tokens::manager::ApiTokenManager;
    use crate::api_tokens::storage::InMemoryTokenStorage;
    use crate::client::{Client, ClientAuth, StatsQuery, Subcampaigns};
    use crate::config::ClientConfig;
    use crate::errors::{ApiError, TokenError};
    use crate::schema::{
        CountConvention, DeviceType, StatsGroupBy, StatsMetric, SubcampaignsFilter, UserSegment,
    };
    use crate::tests::common::{count_lines, json, token_expiring_in, FakeIssuer, FixedClock};

    fn client(server: &MockServer, auth: ClientAuth) -> Client {
        Client::new(auth, &ClientConfig::new(server.base_url())).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 9, d).unwrap()
    }

    fn conversion(id: &str) -> Value {
        json!({
            "conversionIdentifier": id,
            "conversionHash": format!("hash-{}", id),
            "conversionClass": null,
            "conversionValue": 24.0,
            "commissionValue": 2.4,
            "cookieHash": "cookie",
            "conversionTime": "2020-09-01T12:00:00Z",
            "lastClickTime": "2020-09-01T11:00:00Z",
            "lastImpressionTime": null
        })
    }

    #[test]
    fn user_info_with_static_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/user/info")
                .header("authorization", "Token abc");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {
                    "hashId": "hash",
                    "login": "john",
                    "email": "john@example.com",
                    "isClientUser": true,
                    "permissions": ["read"]
                }
            }));
        });

        let info = client(&server, ClientAuth::token("abc")).get_user_info().unwrap();

        mock.assert();
        assert_eq!(info.login, "john");
        assert!(info.is_client_user);
    }

    #[test]
    fn basic_auth_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers")
                .header("authorization", "Basic dXNlcjpwYXNz");
            then.status(200).json_body(json!({"status": "ok", "data": []}));
        });

        let advertisers = client(&server, ClientAuth::basic("user", "pass"))
            .get_advertisers()
            .unwrap();

        mock.assert();
        assert!(advertisers.is_empty());
    }

    #[test]
    fn managed_token_is_sent_as_bearer() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/offer-categories")
                .header("authorization", "Bearer abc");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": [{"categoryId": "1", "identifier": "shoes", "name": "Shoes", "activeOffersNumber": 3}]
            }));
        });

        let now = Utc::now();
        let manager = ApiTokenManager::new(
            InMemoryTokenStorage::new(Some(token_expiring_in(now, TimeDelta::days(10)))),
            FakeIssuer::new(now, false, false),
        )
        .with_clock(Arc::new(FixedClock::new(now)));

        let categories = client(&server, ClientAuth::managed(Arc::new(manager)))
            .get_offer_categories("adv")
            .unwrap();

        mock.assert();
        assert_eq!(categories[0].active_offers_number, 3);
    }

    #[test]
    fn expired_managed_token_stops_before_sending() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/user/info");
            then.status(200);
        });

        let now = Utc::now();
        let manager = ApiTokenManager::new(
            InMemoryTokenStorage::new(Some(token_expiring_in(now, -TimeDelta::days(1)))),
            FakeIssuer::new(now, false, false),
        );

        let err = client(&server, ClientAuth::managed(Arc::new(manager)))
            .get_user_info()
            .unwrap_err();

        assert!(matches!(err, ApiError::Token(ref inner) if matches!(**inner, TokenError::Expired)));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn gone_is_version_mismatch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/user/info");
            then.status(410).header("X-Current-Api-Version", "v6");
        });

        let err = client(&server, ClientAuth::token("abc")).get_user_info().unwrap_err();

        match err {
            ApiError::VersionMismatch { used, newest } => {
                assert_eq!(used, "v5");
                assert_eq!(newest.as_deref(), Some("v6"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn too_many_requests_is_rate_limit() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/advertisers");
            then.status(429)
                .header(
                    "X-Resource-Usage",
                    "WORKER_TIME-3600=11.78/10000000;DB_QUERY_TIME-86400=17.995/5000",
                )
                .json_body(json!({"appCode": "TOO_MANY_REQUESTS", "message": "Limit reached"}));
        });

        let err = client(&server, ClientAuth::token("abc")).get_advertisers().unwrap_err();

        assert!(err.is_request_error());
        assert_eq!(err.to_string(), "Resource usage limits reached");
        match err {
            ApiError::RateLimitExceeded { limits, details } => {
                assert_eq!(limits["DB_QUERY_TIME"]["86400"]["5000"], 17.995);
                assert_eq!(details.unwrap().message.as_deref(), Some("Limit reached"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn not_found_carries_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/advertisers/missing");
            then.status(404).json_body(json!({"message": "Advertiser not found"}));
        });

        let err = client(&server, ClientAuth::token("abc"))
            .get_advertiser("missing")
            .unwrap_err();

        assert_eq!(err.to_string(), "Advertiser not found");
    }

    #[test]
    #[traced_test]
    fn newer_server_version_warns() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/advertisers");
            then.status(200)
                .header("X-Current-Api-Version", "v6")
                .json_body(json!({"status": "ok", "data": []}));
        });

        client(&server, ClientAuth::token("abc")).get_advertisers().unwrap();

        logs_assert(|lines: &[&str]| {
            match count_lines(lines, "Used api version (v5) is outdated, use newest version (v6)") {
                1 => Ok(()),
                n => Err(format!("expected one version warning, got {}", n)),
            }
        });
    }

    #[test]
    fn invoicing_data_is_unwrapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/advertisers/adv/client");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {"invoicing": {
                    "vat_number": "123",
                    "company_name": "Ltd",
                    "street1": "Main 1",
                    "postal_code": "00-001",
                    "city": "Warsaw",
                    "country": "PL",
                    "email": "billing@example.com"
                }}
            }));
        });

        let invoice = client(&server, ClientAuth::token("abc"))
            .get_invoicing_data("adv")
            .unwrap();

        assert_eq!(invoice.vat_number, "123");
    }

    #[test]
    fn billing_and_creatives_encode_params() {
        let server = MockServer::start();
        let billing = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/billing")
                .query_param("dayFrom", "2020-09-01")
                .query_param("dayTo", "2020-09-30");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {"initialBalance": 100.0, "bills": [{
                    "day": "2020-09-02", "operation": "Cost of campaign", "position": 1,
                    "credit": 0.0, "debit": 10.0, "balance": 90.0, "recordNumber": 1
                }]}
            }));
        });
        let creatives = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/rtb-creatives")
                .query_param("subcampaigns", "ACTIVE")
                .query_param("activeOnly", "true");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": [{"hash": "cr", "previews": [
                    {"width": 300, "height": 250, "offersNumber": 1, "previewUrl": "https://x"}
                ]}]
            }));
        });

        let client = client(&server, ClientAuth::token("abc"));
        let bills = client.get_billing("adv", day(1), day(30)).unwrap();
        let selection = Subcampaigns::from(SubcampaignsFilter::Active);
        let creatives_rows = client.get_rtb_creatives("adv", Some(&selection), Some(true)).unwrap();

        billing.assert();
        creatives.assert();
        assert_eq!(bills.bills[0].balance, 90.0);
        assert_eq!(creatives_rows[0].previews[0].preview_url, "https://x");
    }

    #[test]
    fn stats_encode_params() {
        let server = MockServer::start();
        let rtb = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/rtb-stats")
                .query_param("dayFrom", "2020-09-01")
                .query_param("dayTo", "2020-09-01")
                .query_param("groupBy", "advertiser-day")
                .query_param("metrics", "campaignCost-cr")
                .query_param("countConvention", "ATTRIBUTED")
                .query_param("subcampaigns", "hash1-hash2")
                .query_param("userSegments", "BUYERS-NEW")
                .query_param("deviceTypes", "PC-MOBILE");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": [{"advertiser": "adv", "day": "2020-09-01", "campaignCost": 51.0, "cr": 8.9}]
            }));
        });
        let summary = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/summary-stats")
                .query_param("groupBy", "advertiser-day")
                .query_param_missing("userSegments")
                .query_param_missing("deviceTypes");
            then.status(200).json_body(json!({"status": "ok", "data": []}));
        });

        let query = StatsQuery::new(
            day(1),
            day(1),
            vec![StatsGroupBy::Advertiser, StatsGroupBy::Day],
            vec![StatsMetric::CampaignCost, StatsMetric::Cr],
        )
        .count_convention(CountConvention::AttributedPostClick)
        .subcampaigns(vec!["hash1".to_owned(), "hash2".to_owned()])
        .user_segments(vec![UserSegment::Buyers, UserSegment::New])
        .device_types(vec![DeviceType::Pc, DeviceType::Mobile]);

        let client = client(&server, ClientAuth::token("abc"));
        let stats = client.get_rtb_stats("adv", &query).unwrap();
        client.get_summary_stats("adv", &query).unwrap();

        rtb.assert();
        summary.assert();
        assert_eq!(stats[0].campaign_cost, Some(51.0));
        assert_eq!(stats[0].day, Some(day(1)));
    }

    #[test]
    fn conversions_follow_cursor() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/conversions")
                .query_param("limit", "10000")
                .query_param("countConvention", "ATTRIBUTED")
                .query_param_missing("nextCursor");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {"rows": [conversion("1"), conversion("2")], "nextCursor": "123"}
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/conversions")
                .query_param("limit", "10000")
                .query_param("nextCursor", "123");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {"rows": [conversion("3")], "nextCursor": null}
            }));
        });

        let client = client(&server, ClientAuth::token("abc"));
        let ids: Vec<String> = client
            .get_rtb_conversions("adv", day(1), day(30), CountConvention::default())
            .map(|row| row.unwrap().conversion_identifier)
            .collect();

        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[test]
    fn conversion_errors_end_iteration() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/conversions")
                .query_param_missing("nextCursor");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {"rows": [conversion("1")], "nextCursor": "123"}
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/advertisers/adv/conversions")
                .query_param("nextCursor", "123");
            then.status(500);
        });

        let client = client(&server, ClientAuth::token("abc"));
        let mut rows =
            client.get_rtb_conversions("adv", day(1), day(30), CountConvention::AllConversions);

        assert!(rows.next().unwrap().is_ok());
        let err = rows.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Unexpected error");
        assert!(rows.next().is_none());
    }
}
