pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod html_table;
pub mod http_client;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod roster;
pub mod season;
pub mod store;
pub mod team_identity;
