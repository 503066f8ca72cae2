//! Delivery layers exposing the tracker core to the network.
pub mod http;
