//! 路由报价请求/响应类型
//!
//! 响应字段来自聚合器的 advanced routes 接口，字段缺失时按空处理，
//! 由路由选择器决定候选是否可用。

use serde::{Deserialize, Deserializer, Serialize};

/// 单腿报价请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub from_address: String,
    pub to_address: String,
    pub from_chain: u64,
    pub to_chain: u64,
    pub from_token: String,
    pub to_token: String,
    /// 最小单位的非负整数字符串
    pub from_amount: String,
}

/// 报价响应: 按 API 返回顺序排列的候选路由
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// 缺失或为 null 时按空列表处理
    #[serde(default, deserialize_with = "null_as_empty")]
    pub routes: Vec<RouteCandidate>,
}

impl QuoteResponse {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// 候选路由
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
    #[serde(default)]
    pub to_amount: Option<String>,
    #[serde(default)]
    pub to_amount_min: Option<String>,
    #[serde(default)]
    pub to_token: Option<RouteToken>,
}

impl RouteCandidate {
    /// 第一步使用的桥/工具名称
    pub fn first_tool(&self) -> Option<&str> {
        self.steps.first().map(|step| step.tool.as_str())
    }

    /// 输出金额原始值: 优先 toAmount，缺失或为空时退回 toAmountMin
    pub fn output_amount_raw(&self) -> Option<&str> {
        non_empty(self.to_amount.as_deref()).or_else(|| non_empty(self.to_amount_min.as_deref()))
    }

    pub fn output_decimals(&self) -> Option<&DecimalsField> {
        self.to_token.as_ref().and_then(|token| token.decimals.as_ref())
    }
}

/// 路由中的一步
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    #[serde(default)]
    pub tool: String,
}

/// 输出代币元数据
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteToken {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<DecimalsField>,
}

/// 精度字段，API 可能返回数字或字符串
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DecimalsField {
    Number(i64),
    Text(String),
}

impl DecimalsField {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DecimalsField::Number(n) => Some(*n),
            DecimalsField::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for DecimalsField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecimalsField::Number(n) => write!(f, "{}", n),
            DecimalsField::Text(s) => write!(f, "{}", s),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_response() {
        let body = r#"{
            "routes": [
                {
                    "steps": [{"tool": "relay", "type": "lifi"}],
                    "toAmount": "31000000",
                    "toAmountMin": "30900000",
                    "toToken": {"symbol": "SOL", "decimals": 9, "chainId": 1151111081099710}
                },
                {
                    "steps": [{"tool": "across"}],
                    "toAmountMin": "30000000",
                    "toToken": {"decimals": "9"}
                }
            ],
            "unavailableRoutes": {"filteredOut": [], "failed": []}
        }"#;

        let response: QuoteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.routes.len(), 2);

        let first = &response.routes[0];
        assert_eq!(first.first_tool(), Some("relay"));
        assert_eq!(first.output_amount_raw(), Some("31000000"));
        assert_eq!(first.output_decimals().and_then(|d| d.as_i64()), Some(9));

        let second = &response.routes[1];
        assert_eq!(second.output_amount_raw(), Some("30000000"));
        assert_eq!(second.output_decimals().and_then(|d| d.as_i64()), Some(9));
    }

    #[test]
    fn test_missing_routes_is_empty() {
        let response: QuoteResponse = serde_json::from_str(r#"{"message": "no routes"}"#).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_null_routes_is_empty() {
        let response: QuoteResponse = serde_json::from_str(r#"{"routes": null}"#).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_empty_to_amount_falls_back_to_min() {
        let candidate = RouteCandidate {
            to_amount: Some(String::new()),
            to_amount_min: Some("5".to_string()),
            ..Default::default()
        };
        assert_eq!(candidate.output_amount_raw(), Some("5"));

        let none = RouteCandidate::default();
        assert_eq!(none.output_amount_raw(), None);
        assert_eq!(none.first_tool(), None);
    }
}
