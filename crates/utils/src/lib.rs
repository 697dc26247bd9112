mod logger;
pub mod time_utils;
pub mod units;

pub use logger::{LoggerManager, OPPORTUNITY_TARGET};
pub use time_utils::{now_utc, now_utc_hms, utc_hms};
pub use units::{checked_decimals, from_smallest_unit, to_smallest_unit, ConversionError, MAX_DECIMALS};
