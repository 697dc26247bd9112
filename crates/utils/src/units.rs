//! 定点数转换模块
//!
//! 代币金额在两种表示之间转换:
//! - 人类可读的十进制金额 (`Decimal`, 如 2.0 ETH)
//! - 链上最小单位整数 (`U256`, 如 2000000000000000000 wei)
//!
//! 取整规则: `to_smallest_unit` 一律向零截断，不做四舍五入。

use ethers::types::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// `Decimal` 可精确表示的最大小数位数
pub const MAX_DECIMALS: u32 = 28;

/// 10^77 是 U256 能容纳的最大 10 的幂
const MAX_U256_EXP10: u32 = 77;

/// 金额转换错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("negative token decimals: {0}")]
    NegativeDecimals(i64),

    #[error("unsupported token decimals: {0}")]
    UnsupportedDecimals(i64),

    #[error("negative amount: {0}")]
    NegativeAmount(String),

    #[error("malformed amount {raw:?}: {reason}")]
    Malformed { raw: String, reason: String },

    #[error("amount overflow: {0}")]
    Overflow(String),
}

/// 校验 API 返回的精度字段
pub fn checked_decimals(decimals: i64) -> Result<u32, ConversionError> {
    if decimals < 0 {
        return Err(ConversionError::NegativeDecimals(decimals));
    }
    if decimals > MAX_DECIMALS as i64 {
        return Err(ConversionError::UnsupportedDecimals(decimals));
    }
    Ok(decimals as u32)
}

/// 十进制金额 -> 最小单位整数 (向零截断)
///
/// `to_smallest_unit(dec!(2.0), 18)` 得到 `2000000000000000000`。
/// 截断丢弃的部分严格小于一个最小单位。
pub fn to_smallest_unit(amount: Decimal, decimals: u32) -> Result<U256, ConversionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ConversionError::NegativeAmount(amount.to_string()));
    }

    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();

    if decimals >= scale {
        let factor = pow10(decimals - scale)
            .ok_or_else(|| ConversionError::Overflow(format!("{} * 10^{}", amount, decimals)))?;
        mantissa
            .checked_mul(factor)
            .ok_or_else(|| ConversionError::Overflow(format!("{} * 10^{}", amount, decimals)))
    } else {
        // scale <= 28，这里的幂一定在范围内
        let divisor = pow10(scale - decimals)
            .ok_or_else(|| ConversionError::Overflow(amount.to_string()))?;
        Ok(mantissa / divisor)
    }
}

/// 最小单位字符串 -> 十进制金额
///
/// 整数字符串按 `U256` 解析，任意大小都可以换算；带小数点的十进制字符串
/// (API 偶尔返回) 按 `Decimal` 解析。结果超过 28 位有效数字时
/// 舍入到 `Decimal` 能表示的精度，整数部分放不下时返回 `Overflow`。
pub fn from_smallest_unit(raw: &str, decimals: u32) -> Result<Decimal, ConversionError> {
    if decimals > MAX_DECIMALS {
        return Err(ConversionError::UnsupportedDecimals(decimals as i64));
    }

    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if !is_plain_number(digits) {
        return Err(ConversionError::Malformed {
            raw: raw.to_string(),
            reason: "not a non-negative decimal number".to_string(),
        });
    }
    if negative && digits.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        return Err(ConversionError::NegativeAmount(trimmed.to_string()));
    }

    let overflow = || ConversionError::Overflow(format!("{} / 10^{}", digits, decimals));

    if digits.contains('.') {
        let value = Decimal::from_str_exact(digits).map_err(|_| overflow())?;
        return value.checked_mul(Decimal::new(1, decimals)).ok_or_else(overflow);
    }

    let value = U256::from_dec_str(digits).map_err(|_| overflow())?;
    let divisor = pow10(decimals).ok_or_else(overflow)?;

    // 拆成整数部分和小数部分，小数部分 < 10^28，一定能放进 Decimal
    let integral = Decimal::from_str_exact(&(value / divisor).to_string()).map_err(|_| overflow())?;
    let fraction = Decimal::from_i128_with_scale((value % divisor).as_u128() as i128, decimals);

    integral.checked_add(fraction).ok_or_else(overflow)
}

/// 只含数字和至多一个小数点，且至少有一位数字
fn is_plain_number(s: &str) -> bool {
    let mut dots = 0;
    let mut has_digit = false;
    for b in s.bytes() {
        match b {
            b'0'..=b'9' => has_digit = true,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    has_digit && dots <= 1
}

fn pow10(exp: u32) -> Option<U256> {
    if exp > MAX_U256_EXP10 {
        return None;
    }
    Some(U256::exp10(exp as usize))
}
