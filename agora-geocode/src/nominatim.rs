//! Nominatim search client.
//!
//! Every call goes through a [`RequestThrottle`] first: the public instance
//! allows one request per second per application and blocks clients that
//! exceed it or omit a `User-Agent`.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use agora_core::constants::NOMINATIM_SEARCH_PATH;
use agora_core::error::{AgoraError, Result};
use agora_core::traits::Geocoder;
use agora_core::types::Location;

use crate::config::GeocodeConfig;
use crate::throttle::RequestThrottle;

/// One search result as returned by Nominatim.
///
/// The live service encodes coordinates as strings; plain numbers are
/// accepted too. Every other field is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NominatimPlace {
    /// Latitude
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    /// Longitude
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
    /// Full display name
    pub display_name: String,
}

fn coordinate<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl From<NominatimPlace> for Location {
    fn from(place: NominatimPlace) -> Self {
        Location::new(place.lat, place.lon, place.display_name)
    }
}

impl From<&Location> for NominatimPlace {
    fn from(location: &Location) -> Self {
        Self {
            lat: location.latitude,
            lon: location.longitude,
            display_name: location.name.clone(),
        }
    }
}

/// Decodes a search response body.
///
/// A body that is empty (or only whitespace) is an error, not an empty list.
pub fn parse_places(body: &[u8]) -> Result<Vec<NominatimPlace>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AgoraError::EmptyResponse);
    }
    serde_json::from_slice(body).map_err(|e| AgoraError::MalformedResponse(e.to_string()))
}

/// Rate-limited client for the Nominatim search endpoint.
///
/// Each instance owns its own throttle; two clients never delay each other.
pub struct NominatimClient {
    config: GeocodeConfig,
    http_client: reqwest::Client,
    search_url: Url,
    throttle: RequestThrottle,
}

impl NominatimClient {
    /// Creates a client for the public instance with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(GeocodeConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: GeocodeConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            return Err(AgoraError::ConfigError("User-Agent must not be empty".into()));
        }

        let search_url = Url::parse(&format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            NOMINATIM_SEARCH_PATH
        ))
        .map_err(|e| AgoraError::ConfigError(format!("Invalid base URL {:?}: {}", config.base_url, e)))?;

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| AgoraError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            throttle: RequestThrottle::new(config.min_interval()),
            config,
            http_client,
            search_url,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GeocodeConfig {
        &self.config
    }

    /// Searches for locations matching `query`.
    ///
    /// Waits for the throttle, then issues
    /// `GET {base_url}/search?format=json&q={query}`. A non-success status,
    /// an empty body, or an undecodable body fails the whole call; nothing is
    /// retried.
    ///
    /// Dropping the returned future cancels the wait or the in-flight request.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Location>> {
        self.throttle.acquire().await;

        let url = self.request_url(query);
        debug!(%url, "Sending search request");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Search request failed");
            return Err(AgoraError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let locations: Vec<Location> = parse_places(&body)?
            .into_iter()
            .map(Location::from)
            .collect();

        info!(results = locations.len(), "Search complete");
        Ok(locations)
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query);
        url
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        NominatimClient::search(self, query).await
    }
}

fn transport_error(e: reqwest::Error) -> AgoraError {
    if e.is_timeout() {
        AgoraError::ConnectionTimeout(e.to_string())
    } else {
        AgoraError::HttpError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GeocodeConfig {
        GeocodeConfig::new(server.uri())
            .with_user_agent("agora-test/1.0")
            .with_min_interval(Duration::from_millis(200))
    }

    fn epfl_body() -> serde_json::Value {
        serde_json::json!([
            {
                "place_id": 101,
                "lat": "46.5191",
                "lon": "6.5668",
                "display_name": "EPFL, Lausanne, Vaud, Switzerland",
                "importance": 0.62
            },
            {
                "lat": 46.52,
                "lon": 6.57,
                "display_name": "Rolex Learning Center"
            }
        ])
    }

    #[test]
    fn test_place_roundtrip() {
        let location = Location::new(-1.0, 1.0, "some location");
        let json = serde_json::to_string(&NominatimPlace::from(&location)).unwrap();
        let parsed: NominatimPlace = serde_json::from_str(&json).unwrap();
        assert_eq!(Location::from(parsed), location);
    }

    #[test]
    fn test_parse_string_coordinates() {
        let places = parse_places(br#"[{"lat":"-1.5","lon":" 2.25 ","display_name":"x","osm_type":"node"}]"#).unwrap();
        assert_eq!(places[0].lat, -1.5);
        assert_eq!(places[0].lon, 2.25);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_places(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(matches!(parse_places(b""), Err(AgoraError::EmptyResponse)));
        assert!(matches!(parse_places(b" \n"), Err(AgoraError::EmptyResponse)));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_places(br#"[{"lat":"north","lon":"1","display_name":"x"}]"#).unwrap_err();
        assert!(matches!(err, AgoraError::MalformedResponse(_)));

        let err = parse_places(b"<html>busy</html>").unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_request_url_encodes_query() {
        let client = NominatimClient::with_config(GeocodeConfig::new("https://geo.example.org/")).unwrap();
        let url = client.request_url("Place de la Gare & 1");
        assert_eq!(
            url.as_str(),
            "https://geo.example.org/search?format=json&q=Place+de+la+Gare+%26+1"
        );
    }

    #[test]
    fn test_rejects_empty_user_agent() {
        let config = GeocodeConfig::default().with_user_agent("  ");
        assert!(matches!(
            NominatimClient::with_config(config),
            Err(AgoraError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = GeocodeConfig::new("not a url");
        assert!(matches!(
            NominatimClient::with_config(config),
            Err(AgoraError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_search_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(query_param("q", "EPFL"))
            .and(header("user-agent", "agora-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(epfl_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = NominatimClient::with_config(config_for(&server)).unwrap();
        let found = client.search("EPFL").await.unwrap();

        assert_eq!(
            found,
            vec![
                Location::new(46.5191, 6.5668, "EPFL, Lausanne, Vaud, Switzerland"),
                Location::new(46.52, 6.57, "Rolex Learning Center"),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_error_status_is_io_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = NominatimClient::with_config(config_for(&server)).unwrap();
        let err = client.search("EPFL").await.unwrap_err();

        assert!(err.is_io_error());
        assert!(matches!(err, AgoraError::HttpStatus { status: 503, ref body } if body == "overloaded"));
    }

    #[tokio::test]
    async fn test_search_empty_body_is_io_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = NominatimClient::with_config(config_for(&server)).unwrap();
        let err = client.search("EPFL").await.unwrap_err();

        assert!(matches!(err, AgoraError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_search_unreachable_is_io_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = GeocodeConfig::new(format!("http://127.0.0.1:{}", port));
        let client = NominatimClient::with_config(config).unwrap();
        let err = client.search("EPFL").await.unwrap_err();

        assert!(err.is_io_error());
    }

    #[tokio::test]
    async fn test_consecutive_searches_are_spaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(epfl_body()))
            .expect(2)
            .mount(&server)
            .await;

        let config = config_for(&server).with_min_interval(Duration::from_millis(1000));
        let client = NominatimClient::with_config(config).unwrap();

        let start = Instant::now();
        client.search("EPFL").await.unwrap();
        client.search("EPFL").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_fresh_clients_do_not_share_throttle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(epfl_body()))
            .mount(&server)
            .await;

        let config = config_for(&server).with_min_interval(Duration::from_secs(5));
        let a = NominatimClient::with_config(config.clone()).unwrap();
        let b = NominatimClient::with_config(config).unwrap();

        let start = Instant::now();
        a.search("EPFL").await.unwrap();
        b.search("EPFL").await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancelled_search_leaves_client_usable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(epfl_body())
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "fast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(epfl_body()))
            .mount(&server)
            .await;

        let client = NominatimClient::with_config(config_for(&server)).unwrap();

        let cancelled = tokio::time::timeout(Duration::from_millis(300), client.search("slow")).await;
        assert!(cancelled.is_err());

        let found = tokio::time::timeout(Duration::from_secs(5), client.search("fast"))
            .await
            .expect("search after cancellation should not hang")
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_usable_as_geocoder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let geocoder: Box<dyn Geocoder> =
            Box::new(NominatimClient::with_config(config_for(&server)).unwrap());
        assert!(geocoder.search("nowhere").await.unwrap().is_empty());
    }
}
