//! Canonical panel column names.

/// Asset identifier.
pub const ASSET: &str = "asset";
/// Observation timestamp.
pub const TIMESTAMP: &str = "timestamp";
/// Opening price.
pub const OPEN: &str = "open";
/// High price.
pub const HIGH: &str = "high";
/// Low price.
pub const LOW: &str = "low";
/// Closing price.
pub const CLOSE: &str = "close";
/// Traded volume.
pub const VOLUME: &str = "volume";
/// Turnover (traded value or turnover rate, depending on the source).
pub const TURNOVER: &str = "turnover";
/// Traded amount in currency.
pub const AMOUNT: &str = "amount";
/// Categorical grouping key used by neutralization.
pub const SECTOR: &str = "sector";

/// Columns every panel must carry.
pub const REQUIRED: [&str; 3] = [ASSET, TIMESTAMP, CLOSE];

/// Price columns, which must never be zero.
pub const PRICES: [&str; 4] = [OPEN, HIGH, LOW, CLOSE];

/// Activity columns, repaired alongside prices.
pub const ACTIVITY: [&str; 3] = [VOLUME, TURNOVER, AMOUNT];
