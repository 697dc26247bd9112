use anyhow::{bail, Context, Result};
use ethers::types::Address;
use models::PairConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// EVM 链原生资产的占位地址
pub const EVM_NATIVE: &str = "0x0000000000000000000000000000000000000000";
/// Solana 原生 SOL 的占位地址
pub const SOL_NATIVE: &str = "11111111111111111111111111111111";

/// 路由报价接口
pub const DEFAULT_ROUTES_API_URL: &str = "https://api.jumper.exchange/p/lifi/advanced/routes";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub home_chain: SupportedChain,
    pub wallet: WalletConfig,
    pub scanner: ScannerConfig,
    pub routing: RoutingApiConfig,
    /// 按配置顺序排列的往返交易对
    pub pairs: Vec<PairConfig>,
    pub log: LogConfig,
}

/// 支持的区块链 (路由 API 的链 ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedChain {
    Ethereum,
    Base,
    Solana,
    Arbitrum,
    Polygon,
    Optimism,
}

impl SupportedChain {
    pub const ALL: [SupportedChain; 6] = [
        SupportedChain::Ethereum,
        SupportedChain::Base,
        SupportedChain::Solana,
        SupportedChain::Arbitrum,
        SupportedChain::Polygon,
        SupportedChain::Optimism,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            SupportedChain::Ethereum => 1,
            SupportedChain::Base => 8453,
            SupportedChain::Solana => 1151111081099710,
            SupportedChain::Arbitrum => 42161,
            SupportedChain::Polygon => 137,
            SupportedChain::Optimism => 10,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|chain| chain.chain_id() == chain_id)
    }

    /// 从配置键解析，如 "base"、"ETH"、"sol"
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Some(SupportedChain::Ethereum),
            "base" => Some(SupportedChain::Base),
            "solana" | "sol" => Some(SupportedChain::Solana),
            "arbitrum" | "arb" => Some(SupportedChain::Arbitrum),
            "polygon" | "pol" | "matic" => Some(SupportedChain::Polygon),
            "optimism" | "op" => Some(SupportedChain::Optimism),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SupportedChain::Ethereum => "Ethereum",
            SupportedChain::Base => "Base",
            SupportedChain::Solana => "Solana",
            SupportedChain::Arbitrum => "Arbitrum",
            SupportedChain::Polygon => "Polygon",
            SupportedChain::Optimism => "Optimism",
        }
    }

    pub fn native_token(&self) -> &'static str {
        match self {
            SupportedChain::Ethereum => "ETH",
            SupportedChain::Base => "ETH",
            SupportedChain::Solana => "SOL",
            SupportedChain::Arbitrum => "ETH",
            SupportedChain::Polygon => "POL",
            SupportedChain::Optimism => "ETH",
        }
    }

    pub fn native_decimals(&self) -> u32 {
        if self.is_evm() {
            18
        } else {
            9
        }
    }

    /// Solana 使用 base58 地址，其余均为 EVM
    pub fn is_evm(&self) -> bool {
        !matches!(self, SupportedChain::Solana)
    }

    /// 原生资产在路由 API 中的代币地址
    pub fn native_token_address(&self) -> &'static str {
        if self.is_evm() {
            EVM_NATIVE
        } else {
            SOL_NATIVE
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// EVM 链地址 (BASE_WALLET)
    pub evm_wallet: String,
    /// Solana 地址 (SOLANA_WALLET)
    pub solana_wallet: String,
}

impl WalletConfig {
    /// 该链上使用的钱包地址
    pub fn address_for(&self, chain: SupportedChain) -> &str {
        if chain.is_evm() {
            &self.evm_wallet
        } else {
            &self.solana_wallet
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// 每轮投入的出发资产数量
    pub base_amount: Decimal,
    pub base_decimals: u32,
    pub base_symbol: String,
    /// 默认利润阈值
    pub profit_threshold: Decimal,
    /// 任一腿走高手续费桥时的利润阈值
    pub high_fee_profit_threshold: Decimal,
    /// 高手续费桥标记 (小写，子串匹配)
    pub high_fee_bridges: Vec<String>,
    /// 选路时跳过的桥标记 (小写，子串匹配)
    pub excluded_bridges: Vec<String>,
    pub poll_interval: Duration,
    pub min_poll_delay: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingApiConfig {
    pub url: String,
    pub integrator: String,
    pub sdk_version: String,
    pub widget_version: String,
    pub order: String,
    pub max_price_impact: f64,
    pub allow_switch_chain: bool,
    /// 单次请求超时
    pub request_timeout: Duration,
}

impl Default for RoutingApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ROUTES_API_URL.to_string(),
            integrator: "jumper.exchange".to_string(),
            sdk_version: "3.12.11".to_string(),
            widget_version: "3.32.2".to_string(),
            order: "CHEAPEST".to_string(),
            max_price_impact: 0.4,
            allow_switch_chain: true,
            request_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 滚动日志目录，未设置时只输出到控制台
    pub dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // 加载 .env 文件
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置 (进程环境或测试用的 map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        // 钱包配置
        let evm_wallet = var("BASE_WALLET").context("BASE_WALLET not set")?;
        validate_evm_address(&evm_wallet).context("Invalid BASE_WALLET")?;
        let solana_wallet = var("SOLANA_WALLET").context("SOLANA_WALLET not set")?;
        validate_solana_address(&solana_wallet).context("Invalid SOLANA_WALLET")?;
        let wallet = WalletConfig {
            evm_wallet: evm_wallet.trim().to_string(),
            solana_wallet: solana_wallet.trim().to_string(),
        };

        // 出发链
        let home_key = var("HOME_CHAIN").unwrap_or_else(|| "base".to_string());
        let home_chain = SupportedChain::from_key(&home_key)
            .with_context(|| format!("Unknown HOME_CHAIN: {}", home_key))?;

        // 扫描配置
        let base_amount: Decimal = parse_var(&var, "BASE_AMOUNT", "2.0")?;
        if base_amount <= Decimal::ZERO {
            bail!("BASE_AMOUNT must be positive, got {}", base_amount);
        }

        let scanner = ScannerConfig {
            base_amount,
            base_decimals: parse_var(&var, "BASE_TOKEN_DECIMALS", &home_chain.native_decimals().to_string())?,
            base_symbol: var("BASE_TOKEN_SYMBOL")
                .unwrap_or_else(|| home_chain.native_token().to_string()),
            profit_threshold: parse_var(&var, "PROFIT_THRESHOLD", "0.003")?,
            high_fee_profit_threshold: parse_var(&var, "HIGH_FEE_PROFIT_THRESHOLD", "0.005")?,
            // 标记列表: 显式设为空值表示不使用任何标记
            high_fee_bridges: parse_markers(lookup("HIGH_FEE_BRIDGES").as_deref().unwrap_or("mayan")),
            excluded_bridges: parse_markers(lookup("EXCLUDED_BRIDGES").as_deref().unwrap_or("mayanmctp")),
            poll_interval: Duration::from_secs(parse_var(&var, "POLL_INTERVAL_SECS", "30")?),
            min_poll_delay: Duration::from_millis(parse_var(&var, "MIN_POLL_DELAY_MS", "100")?),
        };

        // 路由 API 配置
        let defaults = RoutingApiConfig::default();
        let routing = RoutingApiConfig {
            url: var("ROUTES_API_URL").unwrap_or(defaults.url),
            request_timeout: Duration::from_secs(parse_var(&var, "REQUEST_TIMEOUT_SECS", "20")?),
            ..defaults
        };

        // 交易对 (逗号分隔的中间链, 例如: "solana,arbitrum")
        let intermediate_keys = var("INTERMEDIATE_CHAINS")
            .unwrap_or_else(|| "solana,arbitrum,polygon,optimism".to_string());
        let mut pairs = Vec::new();
        for key in intermediate_keys.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let chain = SupportedChain::from_key(key)
                .with_context(|| format!("Unknown chain in INTERMEDIATE_CHAINS: {}", key))?;
            if chain == home_chain {
                bail!("INTERMEDIATE_CHAINS must not contain HOME_CHAIN ({})", key);
            }
            pairs.push(build_pair(home_chain, chain, &wallet));
        }
        if pairs.is_empty() {
            bail!("INTERMEDIATE_CHAINS is empty");
        }

        let log = LogConfig {
            dir: var("LOG_DIR").map(|dir| dir.trim().to_string()),
        };

        Ok(Self {
            home_chain,
            wallet,
            scanner,
            routing,
            pairs,
            log,
        })
    }
}

/// 构建 home -> intermediate -> home 交易对
pub fn build_pair(
    home: SupportedChain,
    intermediate: SupportedChain,
    wallet: &WalletConfig,
) -> PairConfig {
    PairConfig::round_trip(
        format!("{}↔{}", home.name(), intermediate.name()),
        home.chain_id(),
        intermediate.chain_id(),
        home.native_token_address(),
        intermediate.native_token_address(),
        wallet.address_for(home),
        wallet.address_for(intermediate),
        intermediate.native_token(),
    )
}

fn parse_var<T, F>(var: &F, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", key, raw, e))
}

fn parse_markers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn validate_evm_address(address: &str) -> Result<()> {
    let trimmed = address.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        bail!("expected 0x-prefixed 20-byte hex address, got {:?}", trimmed);
    }
    Address::from_str(trimmed).map_err(|e| anyhow::anyhow!("{}: {:?}", e, trimmed))?;
    Ok(())
}

fn validate_solana_address(address: &str) -> Result<()> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .with_context(|| format!("not base58: {:?}", address))?;
    if bytes.len() != 32 {
        bail!("expected 32-byte public key, got {} bytes", bytes.len());
    }
    Ok(())
}
