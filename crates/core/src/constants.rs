/// Tickers processed when neither the caller nor an identifier source supplies any
pub const DEFAULT_TICKERS: [&str; 5] = [
    "PETR4.SA",
    "VALE3.SA",
    "MXRF11.SA",
    "ITSA4.SA",
    "WEGE3.SA",
];

/// Sector label used when the provider reports none
pub const UNKNOWN_SECTOR: &str = "unknown";

/// Decimal precision for money values (current price, dividend aggregate, closes)
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision for individual dividend amounts
pub const DIVIDEND_DECIMAL_PRECISION: u32 = 6;

/// Lookback for the trailing dividend aggregate
pub const DEFAULT_DIVIDEND_LOOKBACK_DAYS: i64 = 365;

/// Lookback for the dividend history detail
pub const DEFAULT_DIVIDEND_HISTORY_DAYS: i64 = 730;

/// Span of the price history
pub const DEFAULT_PRICE_HISTORY_MONTHS: u32 = 24;
