mod client;

pub use client::{AppbaseClient, ClientOptions, HttpConnector};
