pub mod role;
pub mod setlist;
pub mod setlist_song;
pub mod song;
pub mod user;
