mod common;

use common::*;
use skycast::forecast::extract::ExtractError;
use skycast::forecast::{
    Error, ForecastConfig, ForecastQueue, ForecastSnapshot, Forecaster, Metric,
};
use skycast::network::error::Error as NetworkError;

// 2024-06-01T13:30:00Z
const NOW: u64 = 1_717_248_600;

fn fetch_with(network: MockNetwork, queue: &ForecastQueue) -> Result<ForecastSnapshot, Error> {
    let mut forecaster = Forecaster::new(network, MockClock::at(NOW), queue);
    forecaster.fetch("api.open-meteo.com", "/v1/forecast?latitude=47.38&longitude=8.54")
}

#[test]
fn test_fetch_publishes_snapshot() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&http_response("200 OK", &forecast_document()), 100);
    let tap = network.tap.clone();

    let snapshot = fetch_with(network, &queue).unwrap();

    assert_eq!(snapshot.hour, 13);
    assert_eq!((snapshot.temperature.min, snapshot.temperature.max), (12.0, 23.5));
    assert_eq!(snapshot.temperature.current, 21.5);
    assert_eq!(snapshot.humidity.current, 48.0);
    assert_eq!(snapshot.wind_speed.current, 3.0 + 0.25 * 13.0);
    assert_eq!(snapshot.uv_index.current, 6.5);
    assert_eq!((snapshot.uv_index.min, snapshot.uv_index.max), (0.0, 11.5));

    assert_eq!(queue.try_receive(), Some(snapshot));
    assert_eq!(tap.connects.get(), 1);
    assert_eq!(tap.closes.get(), 1);
    assert_eq!(tap.remote.borrow().as_str(), "api.open-meteo.com:80");
    assert_eq!(tap.timeout_ms.get(), Some(5_000));
}

#[test]
fn test_request_on_the_wire() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&http_response("200 OK", &forecast_document()), 512);
    let tap = network.tap.clone();

    fetch_with(network, &queue).unwrap();

    let written = String::from_utf8(tap.written.borrow().clone()).unwrap();
    assert!(written.starts_with("GET /v1/forecast?latitude=47.38&longitude=8.54 HTTP/1.1\r\n"));
    assert!(written.contains("\r\nHost: api.open-meteo.com\r\n"));
    assert!(written.contains("\r\nConnection: close\r\n"));
    assert!(written.ends_with("\r\n\r\n"));
}

#[test]
fn test_chunked_body_is_decoded() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&chunked_response(&forecast_document(), 97), 61);

    let snapshot = fetch_with(network, &queue).unwrap();
    assert_eq!(snapshot.temperature.max, 23.5);
}

#[test]
fn test_body_until_close_is_read_to_end() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&until_close_response(&forecast_document()), 333);
    let tap = network.tap.clone();

    let snapshot = fetch_with(network, &queue).unwrap();
    assert_eq!(snapshot.humidity.min, 44.0);
    assert_eq!(queue.peek(), Some(snapshot));
    assert_eq!(tap.closes.get(), 1);
}

#[test]
fn test_slow_server_exceeds_exchange_timeout() {
    let queue = ForecastQueue::new();
    let clock = MockClock::at(NOW);
    // Every piece arrives 400 ms after the previous one; 1 s allows three.
    let network = MockNetwork::serving(&http_response("200 OK", &forecast_document()), 100)
        .advancing(&clock, 400);
    let tap = network.tap.clone();

    let mut forecaster = Forecaster::new(network, clock, &queue).with_config(ForecastConfig {
        port: 80,
        timeout_ms: 1_000,
    });

    assert_eq!(
        forecaster.fetch("api.open-meteo.com", "/v1/forecast"),
        Err(Error::Transport(NetworkError::Timeout))
    );
    // Each read only gets what is left of the budget.
    assert_eq!(tap.timeout_ms.get(), Some(200));
    assert_eq!(tap.closes.get(), 1);
    assert!(queue.is_empty());
}

#[test]
fn test_unreadable_clock_fails_fetch_before_connecting() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&http_response("200 OK", &forecast_document()), 512);
    let tap = network.tap.clone();
    let clock = MockClock {
        broken: true,
        ..MockClock::at(NOW)
    };

    let mut forecaster = Forecaster::new(network, clock, &queue);
    assert_eq!(forecaster.fetch("api.open-meteo.com", "/"), Err(Error::Clock));
    assert_eq!(tap.connects.get(), 0);
}

#[test]
fn test_body_is_taken_from_first_brace() {
    let queue = ForecastQueue::new();
    let body = format!("\n)]}}'\n{}", forecast_document());
    let network = MockNetwork::serving(&http_response("200 OK", &body), 256);

    assert!(fetch_with(network, &queue).is_ok());
}

#[test]
fn test_custom_port_and_timeout() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&http_response("200 OK", &forecast_document()), 512);
    let tap = network.tap.clone();

    let mut forecaster = Forecaster::new(network, MockClock::at(NOW), &queue).with_config(
        ForecastConfig {
            port: 8080,
            timeout_ms: 750,
        },
    );
    forecaster.fetch("10.0.0.2", "/forecast").unwrap();

    assert_eq!(tap.remote.borrow().as_str(), "10.0.0.2:8080");
    assert_eq!(tap.timeout_ms.get(), Some(750));
}

#[test]
fn test_connect_failures_are_distinguished() {
    let cases = [
        (NetworkError::InvalidAddress, Error::Resolution),
        (NetworkError::SocketError, Error::Socket),
        (NetworkError::ConnectionRefused, Error::Connect),
        (NetworkError::Timeout, Error::Connect),
    ];
    for (cause, expected) in cases {
        let queue = ForecastQueue::new();
        let network = MockNetwork::refusing(cause);
        let tap = network.tap.clone();

        assert_eq!(fetch_with(network, &queue), Err(expected));
        assert!(queue.is_empty());
        // Nothing was opened, so nothing to close.
        assert_eq!(tap.closes.get(), 0);
    }
}

#[test]
fn test_transport_failure_closes_connection() {
    let queue = ForecastQueue::new();
    let mut network = MockNetwork::serving(b"HTTP/1.1 200 OK\r\n", 64);
    network.reads.push(Err(NetworkError::Timeout));
    let tap = network.tap.clone();

    assert_eq!(
        fetch_with(network, &queue),
        Err(Error::Transport(NetworkError::Timeout))
    );
    assert_eq!(tap.closes.get(), 1);
    assert!(queue.is_empty());
}

#[test]
fn test_empty_response_is_transport_error() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(b"", 1);
    let tap = network.tap.clone();

    assert_eq!(
        fetch_with(network, &queue),
        Err(Error::Transport(NetworkError::ConnectionClosed))
    );
    assert_eq!(tap.closes.get(), 1);
}

#[test]
fn test_truncated_body_is_transport_error() {
    let queue = ForecastQueue::new();
    let mut response = http_response("200 OK", &forecast_document());
    response.truncate(response.len() - 10);
    let network = MockNetwork::serving(&response, 128);

    assert_eq!(
        fetch_with(network, &queue),
        Err(Error::Transport(NetworkError::ConnectionClosed))
    );
}

#[test]
fn test_oversized_response_is_rejected() {
    let queue = ForecastQueue::new();
    let padding = " ".repeat(4096);
    let body = format!("{}{}", forecast_document(), padding);
    let network = MockNetwork::serving(&http_response("200 OK", &body), 512);
    let tap = network.tap.clone();

    assert_eq!(fetch_with(network, &queue), Err(Error::ResponseTooLarge));
    assert_eq!(tap.closes.get(), 1);
}

#[test]
fn test_error_status_is_not_parsed() {
    let queue = ForecastQueue::new();
    let body = r#"{"error":true,"reason":"Latitude must be in range of -90 to 90°."}"#;
    let network = MockNetwork::serving(&http_response("400 Bad Request", body), 512);

    assert_eq!(fetch_with(network, &queue), Err(Error::Status(400)));
    assert!(queue.is_empty());
}

#[test]
fn test_body_without_json_is_parse_error() {
    let queue = ForecastQueue::new();
    let network = MockNetwork::serving(&http_response("200 OK", "service unavailable"), 512);

    assert_eq!(fetch_with(network, &queue), Err(Error::Parse));
    assert!(queue.is_empty());
}

#[test]
fn test_invalid_document_does_not_publish() {
    let queue = ForecastQueue::new();
    let forecaster = Forecaster::new(MockNetwork::refusing(NetworkError::NotOpen), MockClock::at(NOW), &queue);

    assert_eq!(forecaster.parse("{\"current\": {\"temperature_2m\": 1"), Err(Error::Parse));
    assert!(queue.is_empty());
}

#[test]
fn test_broken_series_does_not_publish() {
    let queue = ForecastQueue::new();
    let forecaster = Forecaster::new(MockNetwork::refusing(NetworkError::NotOpen), MockClock::at(NOW), &queue);
    let document = forecast_document().replace(r#""uv_index":["#, r#""uv_index":"n/a","x":["#);

    assert_eq!(
        forecaster.parse(&document),
        Err(Error::Extract(Metric::UvIndex, ExtractError::NotAnArray))
    );
    assert!(queue.is_empty());
}

#[test]
fn test_parse_uses_clock_hour() {
    let queue = ForecastQueue::new();
    // 2024-06-01T23:59:59Z
    let clock = MockClock::at(1_717_286_399);
    let forecaster = Forecaster::new(MockNetwork::refusing(NetworkError::NotOpen), clock, &queue);

    let snapshot = forecaster.parse(&forecast_document()).unwrap();
    assert_eq!(snapshot.hour, 23);
    assert_eq!(snapshot.wind_speed.current, 3.0 + 0.25 * 23.0);
}

#[test]
fn test_unreadable_clock_fails_parse() {
    let queue = ForecastQueue::new();
    let clock = MockClock {
        broken: true,
        ..MockClock::at(NOW)
    };
    let forecaster = Forecaster::new(MockNetwork::refusing(NetworkError::NotOpen), clock, &queue);

    assert_eq!(forecaster.parse(&forecast_document()), Err(Error::Clock));
    assert!(queue.is_empty());
}

#[test]
fn test_newer_fetch_replaces_unconsumed_snapshot() {
    let queue = ForecastQueue::new();

    let first = fetch_with(
        MockNetwork::serving(&http_response("200 OK", &forecast_document()), 512),
        &queue,
    )
    .unwrap();

    let warmer = forecast_document().replace(r#""temperature_2m":21.5"#, r#""temperature_2m":30.5"#);
    let second = fetch_with(
        MockNetwork::serving(&http_response("200 OK", &warmer), 512),
        &queue,
    )
    .unwrap();

    assert_ne!(first, second);
    assert_eq!(queue.try_receive(), Some(second));
    assert_eq!(queue.try_receive(), None);
}
