//! Google Ads module - REST collaborators for metrics, campaigns and accounts

pub mod client;
pub mod messages;
pub mod rest;

pub use client::AdsApiClient;
pub use rest::AdsRestClient;
