use config_crate::ScannerConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use utils::ConversionError;

/// 利润计算器配置
#[derive(Debug, Clone)]
pub struct ProfitCalculatorConfig {
    /// 每轮投入的出发资产数量
    pub base_amount: Decimal,
    /// 默认利润阈值
    pub profit_threshold: Decimal,
    /// 任一腿走高手续费桥时的利润阈值
    pub high_fee_profit_threshold: Decimal,
    /// 高手续费桥标记 (小写)
    pub high_fee_bridges: Vec<String>,
}

impl Default for ProfitCalculatorConfig {
    fn default() -> Self {
        Self {
            base_amount: dec!(2.0),
            profit_threshold: dec!(0.003),
            high_fee_profit_threshold: dec!(0.005),
            high_fee_bridges: vec!["mayan".to_string()],
        }
    }
}

impl From<&ScannerConfig> for ProfitCalculatorConfig {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            base_amount: config.base_amount,
            profit_threshold: config.profit_threshold,
            high_fee_profit_threshold: config.high_fee_profit_threshold,
            high_fee_bridges: config.high_fee_bridges.clone(),
        }
    }
}

/// 往返利润分析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitAnalysis {
    /// 回程输出 - 投入
    pub profit: Decimal,
    /// 利润百分比
    pub profit_percent: Decimal,
    /// 适用的阈值
    pub threshold: Decimal,
    /// 利润是否严格大于阈值
    pub crosses_threshold: bool,
}

/// 利润计算器
#[derive(Debug, Clone)]
pub struct ProfitCalculator {
    config: ProfitCalculatorConfig,
}

impl ProfitCalculator {
    pub fn new(config: ProfitCalculatorConfig) -> Self {
        Self { config }
    }

    pub fn base_amount(&self) -> Decimal {
        self.config.base_amount
    }

    /// 计算往返利润
    ///
    /// `bridges` 为两条腿使用的桥，任一命中高手续费标记时使用较高阈值。
    /// 百分比超出 `Decimal` 范围时返回 `Overflow`。
    pub fn analyze(&self, return_amount: Decimal, bridges: &[&str]) -> Result<ProfitAnalysis, ConversionError> {
        let base = self.config.base_amount;
        let overflow = || ConversionError::Overflow(format!("profit of {} over base {}", return_amount, base));

        let profit = return_amount.checked_sub(base).ok_or_else(overflow)?;

        let profit_percent = if base > Decimal::ZERO {
            profit
                .checked_div(base)
                .and_then(|ratio| ratio.checked_mul(dec!(100)))
                .ok_or_else(overflow)?
        } else {
            Decimal::ZERO
        };

        let threshold = self.threshold_for(bridges);

        Ok(ProfitAnalysis {
            profit,
            profit_percent,
            threshold,
            crosses_threshold: profit > threshold,
        })
    }

    /// 根据使用的桥选择利润阈值
    pub fn threshold_for(&self, bridges: &[&str]) -> Decimal {
        if bridges.iter().any(|bridge| self.is_high_fee_bridge(bridge)) {
            self.config.high_fee_profit_threshold
        } else {
            self.config.profit_threshold
        }
    }

    pub fn is_high_fee_bridge(&self, bridge: &str) -> bool {
        let bridge = bridge.to_lowercase();
        self.config
            .high_fee_bridges
            .iter()
            .any(|marker| !marker.is_empty() && bridge.contains(marker.as_str()))
    }
}

impl Default for ProfitCalculator {
    fn default() -> Self {
        Self::new(ProfitCalculatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_above_threshold() {
        let calculator = ProfitCalculator::default();

        let analysis = calculator.analyze(dec!(2.0031), &["relay", "relay"]).unwrap();

        assert_eq!(analysis.profit, dec!(0.0031));
        assert_eq!(analysis.profit_percent, dec!(0.155));
        assert_eq!(analysis.threshold, dec!(0.003));
        assert!(analysis.crosses_threshold);
    }

    #[test]
    fn test_loss() {
        let calculator = ProfitCalculator::default();

        let analysis = calculator.analyze(dec!(1.998), &["across", "relay"]).unwrap();

        assert_eq!(analysis.profit, dec!(-0.002));
        assert_eq!(analysis.profit_percent, dec!(-0.1));
        assert!(!analysis.crosses_threshold);
    }

    #[test]
    fn test_threshold_is_strict() {
        let calculator = ProfitCalculator::default();
        let analysis = calculator.analyze(dec!(2.003), &["relay"]).unwrap();
        assert!(!analysis.crosses_threshold);
    }

    #[test]
    fn test_high_fee_bridge_uses_higher_threshold() {
        let calculator = ProfitCalculator::default();

        assert!(calculator.is_high_fee_bridge("mayanSwift"));
        assert!(!calculator.is_high_fee_bridge("relay"));

        let analysis = calculator.analyze(dec!(2.0031), &["relay", "MayanWH"]).unwrap();
        assert_eq!(analysis.threshold, dec!(0.005));
        assert!(!analysis.crosses_threshold);

        let analysis = calculator.analyze(dec!(2.006), &["mayan", "relay"]).unwrap();
        assert!(analysis.crosses_threshold);
    }

    #[test]
    fn test_zero_base_amount_has_zero_percent() {
        let calculator = ProfitCalculator::new(ProfitCalculatorConfig {
            base_amount: Decimal::ZERO,
            ..Default::default()
        });
        let analysis = calculator.analyze(dec!(1), &[]).unwrap();
        assert_eq!(analysis.profit_percent, Decimal::ZERO);
    }

    #[test]
    fn test_tiny_base_amount_overflow_is_error() {
        let calculator = ProfitCalculator::new(ProfitCalculatorConfig {
            base_amount: Decimal::new(1, 28),
            ..Default::default()
        });

        let err = calculator.analyze(dec!(1), &["relay"]).unwrap_err();
        assert!(matches!(err, ConversionError::Overflow(_)));
    }
}
