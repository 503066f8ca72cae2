//! End-to-end announce protocol scenarios against a live HTTP tracker.
mod common;

use std::sync::Arc;

use common::{announce, failure_reason, int_field, peer_list, started_test_tracker, AnnounceQuery};
use ttorrent::core::Tracker;
use ttorrent::metainfo::fixture::sample_torrent_bytes;
use ttorrent::metainfo::Torrent;
use ttorrent_primitives::info_hash::InfoHash;

fn admitted_torrent(tracker: &Arc<Tracker>) -> InfoHash {
    let torrent = Torrent::parse(&sample_torrent_bytes(), true).expect("the fixture torrent should parse");
    tracker.announce_torrent(torrent).info_hash()
}

#[tokio::test]
async fn a_seed_announce_for_an_admitted_torrent_should_be_accepted() {
    let test_tracker = started_test_tracker().await;
    let info_hash = admitted_torrent(&test_tracker.tracker);

    let response = announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 6881)
            .with_event("completed")
            .with_left(0),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/plain");

    let body = response.bytes().await.unwrap();

    assert!(int_field(&body, "interval") > 0);
    assert_eq!(int_field(&body, "complete"), 1);
    assert_eq!(int_field(&body, "incomplete"), 0);
    assert!(peer_list(&body).is_empty());

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn a_leecher_should_discover_a_previously_announced_seeder() {
    let test_tracker = started_test_tracker().await;
    let info_hash = admitted_torrent(&test_tracker.tracker);

    announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 7001).with_left(0),
    )
    .await;

    let response = announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000002", 7002)
            .with_event("started")
            .with_left(1000),
    )
    .await;

    let body = response.bytes().await.unwrap();

    assert_eq!(int_field(&body, "complete"), 1);
    assert_eq!(int_field(&body, "incomplete"), 1);

    let peers = peer_list(&body);
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].1, 7001);

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn a_stopped_announce_should_remove_the_peer() {
    let test_tracker = started_test_tracker().await;
    let info_hash = admitted_torrent(&test_tracker.tracker);

    announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 7001).with_left(0),
    )
    .await;
    announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000002", 7002).with_left(1000),
    )
    .await;

    assert_eq!(test_tracker.tracker.get_torrent_peers(&info_hash).len(), 2);

    announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 7001).with_event("stopped"),
    )
    .await;

    assert_eq!(test_tracker.tracker.get_torrent_peers(&info_hash).len(), 1);

    // The stopped peer is no longer advertised to others.
    let response = announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000003", 7003).with_left(500),
    )
    .await;
    let body = response.bytes().await.unwrap();

    let peers = peer_list(&body);
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].1, 7002);

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn an_announce_for_an_unknown_info_hash_should_fail_with_http_200() {
    let test_tracker = started_test_tracker().await;

    let response = announce(
        &test_tracker.server,
        &AnnounceQuery::new(InfoHash([0xee; 20]), b"-qB00000000000000001", 6881),
    )
    .await;

    assert_eq!(response.status(), 200);

    let body = response.bytes().await.unwrap();
    assert!(failure_reason(&body).contains("unknown torrent"));

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn a_compact_announce_should_return_packed_peers() {
    let test_tracker = started_test_tracker().await;
    let info_hash = admitted_torrent(&test_tracker.tracker);

    announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 0x1B39).with_left(0),
    )
    .await;

    let response = announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000002", 7002)
            .with_left(1000)
            .with_compact("1"),
    )
    .await;

    let body = response.bytes().await.unwrap();

    // The seeder announced from 127.0.0.1 on port 0x1B39 (6969); the packed
    // entry is 4 address bytes plus 2 port bytes.
    let packed = [127, 0, 0, 1, 0x1B, 0x39];
    assert!(
        body.windows(packed.len()).any(|window| window == packed),
        "the compact response should contain the packed seeder entry"
    );

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn protocol_errors_should_come_back_as_failure_reasons_with_http_200() {
    let test_tracker = started_test_tracker().await;
    let binding = test_tracker.server.state.binding;
    let info_hash = admitted_torrent(&test_tracker.tracker);

    // No query params at all.
    let response = reqwest::get(format!("http://{binding}/announce")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(failure_reason(&response.bytes().await.unwrap()).contains("missing query params"));

    // An invalid event.
    let response = announce(
        &test_tracker.server,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 6881).with_event("paused"),
    )
    .await;
    assert_eq!(response.status(), 200);
    assert!(failure_reason(&response.bytes().await.unwrap()).contains("invalid event"));

    // A port outside 1..=65535.
    let query = AnnounceQuery::new(info_hash, b"-qB00000000000000001", 0).to_query_string();
    let response = reqwest::get(format!("http://{binding}/announce?{query}")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(failure_reason(&response.bytes().await.unwrap()).contains("invalid peer"));

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn every_response_should_carry_the_server_banner() {
    let test_tracker = started_test_tracker().await;
    let binding = test_tracker.server.state.binding;

    let response = reqwest::get(format!("http://{binding}/health_check")).await.unwrap();

    let banner = response.headers()["server"].to_str().unwrap().to_owned();
    assert!(banner.starts_with("BitTorrent Tracker ("), "unexpected banner: {banner}");

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn an_unknown_path_should_get_a_404() {
    let test_tracker = started_test_tracker().await;
    let binding = test_tracker.server.state.binding;

    let response = reqwest::get(format!("http://{binding}/scrape")).await.unwrap();

    assert_eq!(response.status(), 404);

    test_tracker.server.stop().await.unwrap();
}

#[tokio::test]
async fn the_peer_collector_should_evict_peers_that_stop_announcing() {
    // Full application wiring: HTTP tracker plus the peer collector, with a
    // 2 second freshness window and 1 second sweeps.
    let configuration = ttorrent_test_helpers::configuration::ephemeral();
    let tracker = Arc::new(Tracker::new(&configuration));
    let info_hash = admitted_torrent(&tracker);

    let jobs = ttorrent::app::start(&configuration, tracker.clone())
        .await
        .expect("the application should start");

    announce(
        &jobs.http_tracker,
        &AnnounceQuery::new(info_hash, b"-qB00000000000000001", 7001).with_left(1000),
    )
    .await;
    assert_eq!(tracker.get_torrent_peers(&info_hash).len(), 1);

    // Freshness window (2s) plus a sweep period (1s) plus slack.
    tokio::time::sleep(std::time::Duration::from_secs(4)).await;

    assert_eq!(tracker.get_torrent_peers(&info_hash).len(), 0);

    jobs.stop().await;
}
