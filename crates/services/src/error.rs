use thiserror::Error;
use utils::ConversionError;

/// 路由报价错误
///
/// `NoRoute` / `NoValidRoute` 表示当前无流动性，属于正常结果；
/// 其余为服务或数据故障。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Routing API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("No routes found ({from_chain}->{to_chain})")]
    NoRoute { from_chain: u64, to_chain: u64 },

    #[error("No valid route found ({candidates} candidates skipped)")]
    NoValidRoute { candidates: usize },

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Evaluation cancelled")]
    Cancelled,
}

impl RouteError {
    /// 是否为 "没有可用流动性" 类的预期结果
    pub fn is_no_liquidity(&self) -> bool {
        matches!(self, RouteError::NoRoute { .. } | RouteError::NoValidRoute { .. })
    }

    /// 日志用的简短类别
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::Transport(_) => "transport",
            RouteError::HttpStatus { .. } => "http_status",
            RouteError::NoRoute { .. } => "no_route",
            RouteError::NoValidRoute { .. } => "no_valid_route",
            RouteError::Conversion(_) => "conversion",
            RouteError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RouteError::Transport(format!("request timed out: {}", e))
        } else {
            RouteError::Transport(e.to_string())
        }
    }
}
