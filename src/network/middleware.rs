use std::sync::Arc;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{debug, warn};

use crate::network::session::Session;

/// 非 2xx 响应被状态守卫拦截
#[derive(Debug, thiserror::Error)]
#[error("origin answered HTTP {0}")]
pub struct RejectedStatus(pub StatusCode);

/// 会话注入中间件
/// 负责在每次请求前，将 Session 中的身份标识与额外头部写入 Header
pub struct SessionMiddleware {
    session: Arc<Session>,
}

impl SessionMiddleware {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Middleware for SessionMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let headers = req.headers_mut();

        let ua = self.session.ua();
        if !ua.is_empty()
            && let Ok(val) = HeaderValue::from_str(ua)
        {
            headers.insert(USER_AGENT, val);
        }

        for (k, v) in self.session.headers() {
            headers.insert(k.clone(), v.clone());
        }

        next.run(req, extensions).await
    }
}

/// 状态守卫中间件
/// 将非 2xx 状态码转换为可分类的错误，由上层决定是否重试
pub struct StatusGuardMiddleware;

#[async_trait::async_trait]
impl Middleware for StatusGuardMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let url = req.url().to_string();
        let resp = next.run(req, extensions).await?;

        let status = resp.status();
        if status.is_success() {
            debug!("GET {} -> {}", url, status);
            return Ok(resp);
        }

        warn!("GET {} -> {}", url, status);
        Err(reqwest_middleware::Error::Middleware(anyhow::Error::new(
            RejectedStatus(status),
        )))
    }
}
