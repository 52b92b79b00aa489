//! HTTP API handlers for watchq-server

pub mod health;
pub mod items;
pub mod tags;

pub use health::health_routes;
pub use items::item_routes;
pub use tags::tag_routes;
