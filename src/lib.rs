pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod resources;
