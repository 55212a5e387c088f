pub mod auth;
pub mod health;
pub mod setlist;
pub mod song;
pub mod upload;
pub mod user;
