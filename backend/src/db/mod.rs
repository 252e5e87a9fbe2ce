pub mod user_queries;
pub mod holding_queries;
pub mod watchlist_queries;
pub mod sentiment_history_queries;
pub mod job_run_queries;
