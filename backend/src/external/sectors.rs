/// Popular symbols shown on the home page ticker.
pub const POPULAR_SYMBOLS: &[&str] = &[
    "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NVDA", "NFLX", "JPM", "JNJ",
];

/// Symbols listed on the home page with a known name and sector.
pub const FEATURED_STOCKS: &[(&str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "Technology"),
    ("GOOGL", "Alphabet Inc.", "Technology"),
    ("AMZN", "Amazon.com Inc.", "Consumer Discretionary"),
    ("TSLA", "Tesla Inc.", "Automotive"),
];

// Sector -> representative symbols, used instead of scanning the exchange.
const SECTOR_SYMBOLS: &[(&str, &[&str])] = &[
    ("Technology", &["AAPL", "GOOGL", "MSFT", "NVDA", "META"]),
    ("Consumer Discretionary", &["AMZN", "TSLA", "NFLX", "HD", "MCD"]),
    ("Healthcare", &["JNJ", "PFE", "UNH", "ABBV", "MRK"]),
    ("Financial Services", &["JPM", "BAC", "WFC", "GS", "MS"]),
    ("Communication Services", &["GOOGL", "META", "NFLX", "DIS", "CMCSA"]),
    ("Industrial", &["BA", "CAT", "GE", "MMM", "HON"]),
    ("Energy", &["XOM", "CVX", "COP", "EOG", "SLB"]),
    ("Consumer Staples", &["PG", "KO", "WMT", "COST", "PEP"]),
    ("Real Estate", &["SPG", "PLD", "EQIX", "AMT", "CCI"]),
    ("Materials", &["LIN", "APD", "FCX", "NEM", "DOW"]),
    ("Utilities", &["NEE", "DUK", "SO", "D", "AEP"]),
];

/// Up to `max` representative symbols for a sector, empty for unknown sectors.
pub fn symbols_for_sector(sector: &str, max: usize) -> Vec<&'static str> {
    SECTOR_SYMBOLS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sector))
        .map(|(_, symbols)| symbols.iter().take(max).copied().collect())
        .unwrap_or_default()
}
