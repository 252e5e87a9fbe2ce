pub mod ttl_cache;
pub mod sentiment_classifier;
pub mod sentiment_service;
pub mod alert_service;
pub mod impact_service;
pub mod sentiment_history;
pub mod dashboard_service;
pub mod notification_service;
pub mod auth_service;
pub mod holding_service;
pub mod watchlist_service;
pub mod market_service;
pub mod job_scheduler_service;
