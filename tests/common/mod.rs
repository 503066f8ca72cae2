//! Helpers shared by the integration test suites: a minimal announce client
//! and bencode response assertions.
use std::sync::Arc;

use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use ttorrent::core::Tracker;
use ttorrent::servers::http::server::{HttpServer, Launcher, RunningHttpServer};
use ttorrent_bencode::{BDecodeOpt, BRefAccess, BencodeRef};
use ttorrent_primitives::info_hash::InfoHash;

/// A tracker with a running HTTP server on an ephemeral port.
pub struct TestTracker {
    pub tracker: Arc<Tracker>,
    pub server: RunningHttpServer,
}

pub async fn started_test_tracker() -> TestTracker {
    let configuration = ttorrent_test_helpers::configuration::ephemeral();
    let tracker = Arc::new(Tracker::new(&configuration));

    let server = HttpServer::new(Launcher::new(configuration.http_tracker.bind_address))
        .start(tracker.clone())
        .await
        .expect("it should start the http tracker");

    TestTracker { tracker, server }
}

/// Query params of an announce request; the builder methods mirror the wire
/// params.
pub struct AnnounceQuery {
    pub info_hash: InfoHash,
    pub peer_id: &'static [u8; 20],
    pub port: u16,
    pub left: u64,
    pub event: Option<&'static str>,
    pub compact: Option<&'static str>,
}

impl AnnounceQuery {
    pub fn new(info_hash: InfoHash, peer_id: &'static [u8; 20], port: u16) -> Self {
        Self {
            info_hash,
            peer_id,
            port,
            left: 0,
            event: None,
            compact: None,
        }
    }

    #[must_use]
    pub fn with_left(mut self, left: u64) -> Self {
        self.left = left;
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: &'static str) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn with_compact(mut self, compact: &'static str) -> Self {
        self.compact = Some(compact);
        self
    }

    pub fn to_query_string(&self) -> String {
        let mut query = format!(
            "info_hash={}&peer_id={}&port={}&uploaded=0&downloaded=0&left={}",
            percent_encode(&self.info_hash.0, NON_ALPHANUMERIC),
            percent_encode(self.peer_id, NON_ALPHANUMERIC),
            self.port,
            self.left,
        );
        if let Some(event) = self.event {
            query.push_str(&format!("&event={event}"));
        }
        if let Some(compact) = self.compact {
            query.push_str(&format!("&compact={compact}"));
        }
        query
    }
}

pub async fn announce(server: &RunningHttpServer, query: &AnnounceQuery) -> reqwest::Response {
    let url = format!("http://{}/announce?{}", server.state.binding, query.to_query_string());

    reqwest::get(url).await.expect("it should get an announce response")
}

/// Looks up an integer field in a bencoded response body.
pub fn int_field(body: &[u8], field: &str) -> i64 {
    let bencode = BencodeRef::decode(body, BDecodeOpt::default()).expect("the response body should be bencoded");
    bencode
        .dict()
        .expect("the response should be a dictionary")
        .lookup(field.as_bytes())
        .unwrap_or_else(|| panic!("the response should have a '{field}' field"))
        .int()
        .unwrap_or_else(|| panic!("the '{field}' field should be an integer"))
}

/// The `peers` list of a dictionary-form response, as `(ip, port)` pairs.
pub fn peer_list(body: &[u8]) -> Vec<(String, i64)> {
    let bencode = BencodeRef::decode(body, BDecodeOpt::default()).expect("the response body should be bencoded");
    let dict = bencode.dict().expect("the response should be a dictionary");
    let peers = dict
        .lookup(b"peers")
        .expect("the response should have a 'peers' field")
        .list()
        .expect("the 'peers' field should be a list");

    let mut result = Vec::new();
    for peer in peers {
        let peer = peer.dict().expect("every peer should be a dictionary");
        let ip = peer
            .lookup(b"ip")
            .and_then(BRefAccess::str)
            .expect("every peer should have an 'ip' string")
            .to_owned();
        let port = peer
            .lookup(b"port")
            .and_then(BRefAccess::int)
            .expect("every peer should have a 'port' integer");
        result.push((ip, port));
    }
    result
}

/// The `failure reason` of a bencoded error response.
pub fn failure_reason(body: &[u8]) -> String {
    let bencode = BencodeRef::decode(body, BDecodeOpt::default()).expect("the response body should be bencoded");
    bencode
        .dict()
        .expect("the response should be a dictionary")
        .lookup(b"failure reason")
        .expect("the response should have a 'failure reason' field")
        .str()
        .expect("the 'failure reason' should be a string")
        .to_owned()
}
