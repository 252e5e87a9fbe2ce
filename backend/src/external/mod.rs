pub mod market_data;
pub mod finnhub;
pub mod mock;
pub mod fallback;
pub mod sectors;
