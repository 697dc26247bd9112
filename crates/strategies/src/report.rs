//! 控制台报告渲染
//!
//! 每个交易对渲染为标题行 + 一行结果。显示前统一做银行家舍入 (half-even)。

use models::EvaluationResult;
use rust_decimal::{Decimal, RoundingStrategy};
use utils::utc_hms;

use crate::pair_evaluator::PairReport;

/// 超过阈值: 亮绿
pub const HIGHLIGHT: &str = "\x1b[1;38;5;46m";
/// 未超过阈值: 灰
pub const DIM: &str = "\x1b[38;5;240m";
pub const RESET: &str = "\x1b[0m";

pub const AMOUNT_DP: u32 = 6;
pub const PERCENT_DP: u32 = 3;

fn round_half_even(value: Decimal, dp: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    // 避免输出 "-0.000000"
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// 固定小数位输出
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    let rounded = round_half_even(value, dp);
    format!("{:.*}", dp as usize, rounded)
}

/// 带符号的固定小数位输出，非负数前缀 `+`
pub fn format_signed(value: Decimal, dp: u32) -> String {
    let rounded = round_half_even(value, dp);
    if rounded.is_sign_negative() {
        format!("{:.*}", dp as usize, rounded)
    } else {
        format!("+{:.*}", dp as usize, rounded)
    }
}

/// 成功结果行 (含颜色)
pub fn render_result(result: &EvaluationResult) -> String {
    let marker = if result.is_gain() { "▲" } else { "▼" };
    let line = format!(
        "[{}] {} {} {} → {} {} ({}) → {} {} ({}) | PROFIT: {} {} ({}%)",
        utc_hms(result.checked_at),
        marker,
        result.base_amount,
        result.base_symbol,
        format_fixed(result.intermediate_amount, AMOUNT_DP),
        result.intermediate_symbol,
        result.outbound_bridge,
        format_fixed(result.return_amount, AMOUNT_DP),
        result.base_symbol,
        result.return_bridge,
        format_signed(result.profit, AMOUNT_DP),
        result.base_symbol,
        format_signed(result.profit_percent, PERCENT_DP),
    );

    let color = if result.crosses_threshold { HIGHLIGHT } else { DIM };
    format!("{}{}{}", color, line, RESET)
}

/// 单个交易对: 标题行 + 结果行或错误行
pub fn render_report(report: &PairReport) -> String {
    let body = match &report.outcome {
        Ok(result) => render_result(result),
        Err(e) => format!("[{}] ERROR: {}", utc_hms(report.checked_at), e),
    };
    format!("-------- {} --------\n{}", report.pair_name, body)
}

/// 一批报告，按给定顺序
pub fn render_batch(reports: &[PairReport]) -> String {
    reports.iter().map(render_report).collect::<Vec<_>>().join("\n")
}
