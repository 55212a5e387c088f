mod auth;
mod setlists;
mod upload;
