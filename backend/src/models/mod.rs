mod sentiment;
mod holding;
mod watchlist_item;
mod user;
mod news;
mod market;
mod dashboard;
mod job_run;
pub mod alert;

pub use sentiment::{SentimentClass, SentimentSnapshot, NewSentimentSnapshot, SentimentHistoryRow, SentimentHistoryParams};
pub use holding::{Holding, CreateHolding, UpdateHolding};
pub use watchlist_item::{WatchlistItem, AddWatchlistItem};
pub use user::{User, LoginRequest, LoginResponse};
pub use news::{NewsArticle, ScoredArticle, SectorArticle};
pub use market::{Quote, CompanyProfile, StockSummary, HistoryPoint, HistoryParams, HomePage};
pub use dashboard::{Dashboard, DashboardRow, ImpactLevel, PortfolioSummary, SentimentCounts};
pub use job_run::JobRun;
pub use alert::{AlertDecision, AlertSeverity, SentimentAlert, SentimentAlertKind};
