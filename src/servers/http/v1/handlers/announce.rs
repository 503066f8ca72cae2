//! The `GET /announce` handler.
//!
//! It builds a [`peer::Peer`] from the parsed request and the connection
//! info, hands it to the core tracker and encodes the result in the form the
//! client asked for. Core rejections (this is a closed tracker) become
//! bencoded `failure reason` responses.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::debug;
use ttorrent_clock::clock::Time;
use ttorrent_primitives::announce_event::AnnounceEvent;
use ttorrent_primitives::peer;

use crate::core::{AnnounceData, Tracker};
use crate::servers::http::v1::extractors::announce_request::ExtractRequest;
use crate::servers::http::v1::extractors::client_ip::Extract as ExtractClientIp;
use crate::servers::http::v1::requests::announce::{Announce, Compact, Event};
use crate::servers::http::v1::responses::{self, announce};
use crate::CurrentClock;

#[allow(clippy::unused_async)]
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    ExtractRequest(announce_request): ExtractRequest,
    ExtractClientIp(client_ip): ExtractClientIp,
) -> Response {
    debug!("http announce request: {announce_request:?}");

    let announce_data = match handle_announce(&tracker, &announce_request, client_ip) {
        Ok(announce_data) => announce_data,
        Err(error) => return error.into_response(),
    };

    build_response(&announce_request, announce_data)
}

fn handle_announce(
    tracker: &Arc<Tracker>,
    announce_request: &Announce,
    client_ip: IpAddr,
) -> Result<AnnounceData, responses::error::Error> {
    let peer = peer_from_request(announce_request, client_ip);
    let numwant = announce_request.numwant.map(|numwant| usize::try_from(numwant).unwrap_or(usize::MAX));

    tracker
        .announce(&announce_request.info_hash, &peer, numwant)
        .map_err(responses::error::Error::from)
}

fn build_response(announce_request: &Announce, announce_data: AnnounceData) -> Response {
    match &announce_request.compact {
        Some(Compact::Accepted) => announce::Compact::from(announce_data).into_response(),
        // The dictionary form is the default.
        Some(Compact::NotAccepted) | None => announce::Normal::from(announce_data).into_response(),
    }
}

/// The peer as the tracker will store it. The address is the `ip` request
/// param when present, else the request's source address.
#[must_use]
fn peer_from_request(announce_request: &Announce, client_ip: IpAddr) -> peer::Peer {
    let peer_ip = announce_request.ip.unwrap_or(client_ip);

    peer::Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(peer_ip, announce_request.port),
        updated: CurrentClock::now(),
        uploaded: announce_request.uploaded,
        downloaded: announce_request.downloaded,
        left: announce_request.left,
        event: map_announce_event(announce_request.event),
    }
}

fn map_announce_event(event: Option<Event>) -> AnnounceEvent {
    match event {
        Some(Event::Started) => AnnounceEvent::Started,
        Some(Event::Stopped) => AnnounceEvent::Stopped,
        Some(Event::Completed) => AnnounceEvent::Completed,
        None => AnnounceEvent::None,
    }
}
