mod pair_evaluator;
mod profit_calculator;
mod report;
mod round_trip_scanner;

#[cfg(test)]
mod test_support;

pub use pair_evaluator::{EvaluationError, PairEvaluator, PairReport};
pub use profit_calculator::*;
pub use report::{format_fixed, format_signed, render_batch, render_report, render_result};
pub use round_trip_scanner::RoundTripScanner;
