pub(crate) mod health;
pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod holdings;
pub(crate) mod watchlist;
pub(crate) mod sentiment;
pub(crate) mod market;
pub(crate) mod jobs;
