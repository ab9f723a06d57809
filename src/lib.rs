pub mod api;
pub mod codec;
pub mod db;
pub mod error;
pub mod models;
