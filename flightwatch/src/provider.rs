//! Live flight data sources.
//!
//! The FlightRadar24 zone feed returns one JSON object per query: a few
//! bookkeeping keys (`full_count`, `version`, `stats`) plus one array per
//! flight, keyed by the feed's flight id.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use flightwatch_core::{ObservedFlight, Region, Result, WatchError};

/// Source of the current flights inside a region.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    async fn query_flights(&self, region: &Region) -> Result<Vec<ObservedFlight>>;
}

const FEED_URL: &str = "https://data-cloud.flightradar24.com/zones/fcgi/feed.js";

/// Whole-request limit; a stalled feed becomes a skipped cycle.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// Positions within a flight array
const IDX_LAT: usize = 1;
const IDX_LON: usize = 2;
const IDX_SQUAWK: usize = 6;
const IDX_CALLSIGN: usize = 16;

/// Feed filter flags sent with every query.
const FEED_FLAGS: &[(&str, &str)] = &[
    ("faa", "1"),
    ("satellite", "1"),
    ("mlat", "1"),
    ("flarm", "1"),
    ("adsb", "1"),
    ("gnd", "1"),
    ("air", "1"),
    ("vehicles", "1"),
    ("estimated", "1"),
    ("maxage", "14400"),
    ("gliders", "1"),
    ("stats", "1"),
    ("limit", "5000"),
];

/// FlightRadar24 zone feed client.
#[derive(Clone)]
pub struct FlightRadarProvider {
    url: String,
    client: reqwest::Client,
}

impl FlightRadarProvider {
    pub fn new() -> Result<Self> {
        Self::with_url(FEED_URL, REQUEST_TIMEOUT)
    }

    pub fn with_url(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) flightwatch")
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| WatchError::Provider(format!("could not build HTTP client: {e}")))?;

        Ok(FlightRadarProvider {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl FlightProvider for FlightRadarProvider {
    async fn query_flights(&self, region: &Region) -> Result<Vec<ObservedFlight>> {
        let bounds = region.bounds().to_query();

        let response = self
            .client
            .get(&self.url)
            .query(&[("bounds", bounds.as_str())])
            .query(FEED_FLAGS)
            .send()
            .await
            .map_err(|e| WatchError::Provider(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Provider(format!("feed returned HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WatchError::Provider(format!("invalid feed body: {e}")))?;

        parse_feed(&body)
    }
}

/// Extract flights from a zone feed body.
///
/// Any flight array with a missing or mistyped field fails the whole
/// snapshot so a bad payload never reads as "nobody in the region".
pub fn parse_feed(body: &Value) -> Result<Vec<ObservedFlight>> {
    let obj = body
        .as_object()
        .ok_or_else(|| WatchError::Provider("feed body is not an object".into()))?;

    let mut flights = Vec::new();
    for (id, entry) in obj {
        let Some(fields) = entry.as_array() else {
            continue;
        };
        flights.push(parse_flight(id, fields)?);
    }
    Ok(flights)
}

fn parse_flight(id: &str, fields: &[Value]) -> Result<ObservedFlight> {
    let number = |idx: usize, name: &str| {
        fields
            .get(idx)
            .and_then(Value::as_f64)
            .ok_or_else(|| WatchError::Provider(format!("flight {id}: bad {name}")))
    };
    let text = |idx: usize, name: &str| {
        fields
            .get(idx)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| WatchError::Provider(format!("flight {id}: bad {name}")))
    };

    Ok(ObservedFlight {
        latitude: number(IDX_LAT, "latitude")?,
        longitude: number(IDX_LON, "longitude")?,
        transponder_code: text(IDX_SQUAWK, "squawk")?,
        callsign: text(IDX_CALLSIGN, "callsign")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flight_array(lat: f64, lon: f64, squawk: &str, callsign: &str) -> Value {
        json!([
            "AE1234", lat, lon, 270, 55000, 340, squawk, "F-LGKR1", "GLF4",
            "11-9998", 1700000000, "", "", "", 0, 0, callsign, "", ""
        ])
    }

    #[test]
    fn test_parse_feed() {
        let body = json!({
            "full_count": 12000,
            "version": 4,
            "3284a1b2": flight_array(43.1, 33.7, "7700", "FORTE10"),
            "3284a1c9": flight_array(44.0, 34.0, "", "THY4KZ"),
            "stats": { "total": { "ads-b": 10 } },
        });

        let flights = parse_feed(&body).unwrap();
        assert_eq!(flights.len(), 2);

        let forte = flights.iter().find(|f| f.callsign == "FORTE10").unwrap();
        assert_eq!(forte.latitude, 43.1);
        assert_eq!(forte.longitude, 33.7);
        assert_eq!(forte.transponder_code, "7700");

        let thy = flights.iter().find(|f| f.callsign == "THY4KZ").unwrap();
        assert_eq!(thy.transponder_code, "");
    }

    #[test]
    fn test_parse_feed_empty_region() {
        let body = json!({ "full_count": 0, "version": 4 });
        assert!(parse_feed(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_not_object() {
        assert!(matches!(
            parse_feed(&json!([1, 2, 3])),
            Err(WatchError::Provider(_))
        ));
    }

    #[test]
    fn test_parse_feed_truncated_flight() {
        let body = json!({ "3284a1b2": ["AE1234", 43.1, 33.7] });
        assert!(matches!(parse_feed(&body), Err(WatchError::Provider(_))));
    }

    #[test]
    fn test_parse_feed_mistyped_latitude() {
        let mut entry = flight_array(43.1, 33.7, "7700", "FORTE10");
        entry[1] = json!("north");
        let body = json!({ "3284a1b2": entry });
        assert!(parse_feed(&body).is_err());
    }

    #[test]
    fn test_callsign_trimmed() {
        let body = json!({ "a": flight_array(1.0, 2.0, "1200", "FORTE10 ") });
        assert_eq!(parse_feed(&body).unwrap()[0].callsign, "FORTE10");
    }

    #[test]
    fn test_parse_feed_keeps_feed_order() {
        // Keys deliberately out of lexical order
        let body: Value = serde_json::from_str(&format!(
            r#"{{"zz1": {}, "aa2": {}}}"#,
            flight_array(1.0, 2.0, "1200", "FORTE10"),
            flight_array(3.0, 4.0, "7700", "FORTE10"),
        ))
        .unwrap();

        let flights = parse_feed(&body).unwrap();
        assert_eq!(flights[0].transponder_code, "1200");
        assert_eq!(flights[1].transponder_code, "7700");

        let first = flightwatch_core::reconcile::find_flight("FORTE10", &flights).unwrap();
        assert_eq!(first.transponder_code, "1200");
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_provider_error() {
        let provider =
            FlightRadarProvider::with_url("http://127.0.0.1:1/feed.js", REQUEST_TIMEOUT).unwrap();
        let result = provider
            .query_flights(&Region::new(43.5, 33.2, 100_000.0))
            .await;
        assert!(matches!(result, Err(WatchError::Provider(_))));
    }

    #[tokio::test]
    async fn test_stalled_feed_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let provider = FlightRadarProvider::with_url(
            &format!("http://{addr}/feed.js"),
            Duration::from_millis(300),
        )
        .unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            provider.query_flights(&Region::new(43.5, 33.2, 100_000.0)),
        )
        .await
        .expect("query should give up on its own");

        assert!(matches!(result, Err(WatchError::Provider(_))));
    }
}
