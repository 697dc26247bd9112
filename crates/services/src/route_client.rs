//! 跨链路由报价客户端
//!
//! 向聚合器的 advanced routes 接口发起单次报价请求，
//! 不重试、不缓存。所有交易对共享同一个连接池。

use anyhow::Result;
use async_trait::async_trait;
use config_crate::RoutingApiConfig;
use models::{QuoteRequest, QuoteResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use serde::Serialize;
use tracing::debug;
use utils::ConversionError;

use crate::RouteError;

/// 错误响应体在报告中保留的最大长度
const MAX_ERROR_BODY_LEN: usize = 300;

/// 路由报价来源
///
/// 实现必须在响应没有任何候选路由时返回 `RouteError::NoRoute`。
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn get_routes(&self, request: &QuoteRequest) -> Result<QuoteResponse, RouteError>;
}

/// 路由请求选项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions<'a> {
    pub integrator: &'a str,
    pub order: &'a str,
    pub max_price_impact: f64,
    pub allow_switch_chain: bool,
}

/// 路由请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesRequestBody<'a> {
    pub from_address: &'a str,
    pub from_amount: &'a str,
    pub from_chain_id: u64,
    pub from_token_address: &'a str,
    pub to_address: &'a str,
    pub to_chain_id: u64,
    pub to_token_address: &'a str,
    pub options: RouteOptions<'a>,
}

impl<'a> RoutesRequestBody<'a> {
    pub fn new(request: &'a QuoteRequest, config: &'a RoutingApiConfig) -> Self {
        Self {
            from_address: &request.from_address,
            from_amount: &request.from_amount,
            from_chain_id: request.from_chain,
            from_token_address: &request.from_token,
            to_address: &request.to_address,
            to_chain_id: request.to_chain,
            to_token_address: &request.to_token,
            options: RouteOptions {
                integrator: &config.integrator,
                order: &config.order,
                max_price_impact: config.max_price_impact,
                allow_switch_chain: config.allow_switch_chain,
            },
        }
    }
}

/// 路由 API 客户端
pub struct LifiRouteClient {
    client: reqwest::Client,
    config: RoutingApiConfig,
}

impl LifiRouteClient {
    /// 创建客户端，连接池按并发交易对数量设置
    pub fn new(config: RoutingApiConfig, pool_size: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(integrator_headers(&config)?)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(pool_size.max(1))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl RouteProvider for LifiRouteClient {
    async fn get_routes(&self, request: &QuoteRequest) -> Result<QuoteResponse, RouteError> {
        validate_amount(&request.from_amount)?;

        debug!(
            "[Routes] 获取报价: {} -> {}, amount={}",
            request.from_chain, request.to_chain, request.from_amount
        );

        let body = RoutesRequestBody::new(request, &self.config);
        let response = self.client.post(&self.config.url).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RouteError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY_LEN),
            });
        }

        let data: QuoteResponse = serde_json::from_str(&text)
            .map_err(|e| RouteError::Transport(format!("invalid JSON body: {}", e)))?;

        debug!(
            "[Routes] 报价结果: {} -> {}, {} 条候选路由",
            request.from_chain,
            request.to_chain,
            data.routes.len()
        );

        ensure_routes(data, request)
    }
}

/// 没有任何候选路由时转换为 `NoRoute`
pub fn ensure_routes(data: QuoteResponse, request: &QuoteRequest) -> Result<QuoteResponse, RouteError> {
    if data.is_empty() {
        return Err(RouteError::NoRoute {
            from_chain: request.from_chain,
            to_chain: request.to_chain,
        });
    }
    Ok(data)
}

fn integrator_headers(config: &RoutingApiConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://jumper.exchange"));
    headers.insert(REFERER, HeaderValue::from_static("https://jumper.exchange/"));
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
    headers.insert(
        HeaderName::from_static("x-lifi-integrator"),
        HeaderValue::from_str(&config.integrator)?,
    );
    headers.insert(
        HeaderName::from_static("x-lifi-sdk"),
        HeaderValue::from_str(&config.sdk_version)?,
    );
    headers.insert(
        HeaderName::from_static("x-lifi-widget"),
        HeaderValue::from_str(&config.widget_version)?,
    );
    Ok(headers)
}

/// fromAmount 必须是非负整数字符串
fn validate_amount(amount: &str) -> Result<(), ConversionError> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConversionError::Malformed {
            raw: amount.to_string(),
            reason: "fromAmount must be a non-negative integer".to_string(),
        });
    }
    Ok(())
}

fn truncate(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
