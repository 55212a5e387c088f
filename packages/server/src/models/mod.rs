pub mod auth;
pub mod setlist;
pub mod shared;
pub mod song;
pub mod upload;
pub mod user;
