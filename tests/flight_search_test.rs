use chrono::NaiveDate;
use httpmock::prelude::*;
use trip_planner::config::EndpointConfig;
use trip_planner::domain::model::FlightQuery;
use trip_planner::{FixedClock, FlightSearch, ResultEnvelope, TravelConfig};

fn today() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
}

fn config_for(server: &MockServer) -> TravelConfig {
    TravelConfig::default()
        .with_endpoints(EndpointConfig::with_base_url(&server.base_url()))
        .with_search_api_key("serp-test-key")
}

fn query(departure: &str, return_date: Option<&str>) -> FlightQuery {
    FlightQuery {
        origin: "JFK".to_string(),
        destination: "LHR".to_string(),
        departure_date: departure.to_string(),
        return_date: return_date.map(str::to_string),
        party_size: 2,
    }
}

fn flight_options(count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| serde_json::json!({"price": 400 + i, "flights": [{"airline": "Oneworld"}]}))
        .collect()
}

#[tokio::test]
async fn test_past_departure_date_is_advanced_before_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/search.json")
            .query_param("engine", "google_flights")
            .query_param("departure_id", "JFK")
            .query_param("arrival_id", "LHR")
            .query_param("outbound_date", "2027-01-01")
            .query_param("adults", "2")
            .query_param("currency", "USD")
            .query_param("hl", "en")
            .query_param("api_key", "serp-test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"best_flights": flight_options(2)}));
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search.find_flights(&query("2020-01-01", None)).await;

    api_mock.assert();
    assert!(envelope.is_success());
    assert_eq!(envelope.items().len(), 2);
    assert_eq!(envelope.warnings().len(), 1);
    assert!(envelope.warnings()[0].contains("2020-01-01"));
    assert!(envelope.warnings()[0].contains("2027-01-01"));

    let json = envelope.to_json();
    assert_eq!(json["searchParams"]["departureDate"], "2027-01-01");
    assert_eq!(json["searchParams"]["origin"], "JFK");
    assert!(json["searchParams"]["returnDate"].is_null());
}

#[tokio::test]
async fn test_results_truncated_to_five() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search.json");
        then.status(200)
            .json_body(serde_json::json!({"best_flights": flight_options(9)}));
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search.find_flights(&query("2026-12-01", None)).await;

    assert_eq!(envelope.items().len(), 5);
    assert_eq!(envelope.items()[0]["price"], 400);
    assert!(envelope.warnings().is_empty());
}

#[tokio::test]
async fn test_return_date_is_normalized_and_sent() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/search.json")
            .query_param("outbound_date", "2026-12-20")
            .query_param("return_date", "2027-01-03");
        then.status(200)
            .json_body(serde_json::json!({"best_flights": flight_options(1)}));
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search
        .find_flights(&query("2026-12-20", Some("2025-01-03")))
        .await;

    api_mock.assert();
    assert_eq!(envelope.warnings().len(), 1);
    assert_eq!(envelope.to_json()["searchParams"]["returnDate"], "2027-01-03");
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(serde_json::json!({}));
    });

    let config = TravelConfig::default()
        .with_endpoints(EndpointConfig::with_base_url(&server.base_url()));
    let search = FlightSearch::with_clock(config, today());
    let envelope = search.find_flights(&query("2020-01-01", None)).await;

    assert_eq!(api_mock.hits(), 0);
    assert!(envelope.is_error());
    assert!(!envelope.instructions().unwrap().is_empty());
    // 失敗信封不帶頂層 warnings，日期調整放在 details
    let json = envelope.to_json();
    assert!(json.get("warnings").is_none());
    assert_eq!(json["details"]["warnings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_http_failure_becomes_error_envelope() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/search.json");
        then.status(500).body("upstream exploded");
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search.find_flights(&query("2020-06-01", None)).await;

    api_mock.assert();
    let error = envelope.error().unwrap();
    assert!(error.starts_with("Failed to fetch flight data:"));
    assert!(error.contains("500"));
    assert_eq!(
        envelope.to_json()["details"]["warnings"][0],
        "Date 2020-06-01 is in the past; adjusted to 2027-06-01."
    );
}

#[tokio::test]
async fn test_bad_return_date_keeps_departure_warning() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(serde_json::json!({}));
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search
        .find_flights(&query("2020-01-01", Some("2027-1-5")))
        .await;

    assert_eq!(api_mock.hits(), 0);
    assert!(envelope.error().unwrap().contains("2027-1-5"));
    assert_eq!(
        envelope.to_json()["details"]["warnings"][0],
        "Date 2020-01-01 is in the past; adjusted to 2027-01-01."
    );
}

#[tokio::test]
async fn test_missing_best_flights_is_not_an_error() {
    let server = MockServer::start();
    let raw = serde_json::json!({"search_metadata": {"status": "Success"}, "other_flights": []});
    server.mock(|when, then| {
        when.method(GET).path("/search.json");
        then.status(200).json_body(raw.clone());
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search.find_flights(&query("2026-11-11", None)).await;

    match envelope {
        ResultEnvelope::Success(results) => {
            assert!(results.items.is_empty());
            assert_eq!(results.message.as_deref(), Some("No flights found"));
            assert_eq!(results.raw_response, Some(raw));
        }
        ResultEnvelope::Failure(failure) => panic!("unexpected failure: {}", failure.error),
    }
}

#[tokio::test]
async fn test_malformed_date_rejected_without_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(serde_json::json!({}));
    });

    let search = FlightSearch::with_clock(config_for(&server), today());
    let envelope = search.find_flights(&query("next friday", None)).await;

    assert_eq!(api_mock.hits(), 0);
    assert!(envelope.error().unwrap().contains("next friday"));
    assert!(envelope.instructions().is_some());
}
