use std::sync::Arc;

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::core::config::HttpConfig;
use crate::core::error::{FetchCause, FetchError, GalleryError, Result};
use crate::interfaces::PageSource;
use crate::network::middleware::{RejectedStatus, SessionMiddleware, StatusGuardMiddleware};
use crate::network::session::Session;

/// HTTP 抓取服务 (Fetcher)
///
/// 持有一个带连接池的客户端，所有查询共享；信号量限制全局在途请求数。
#[derive(Clone)]
pub struct HttpService {
    client: ClientWithMiddleware,
    config: HttpConfig,
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl HttpService {
    pub fn new(config: HttpConfig, session: Arc<Session>, shutdown: CancellationToken) -> Result<Self> {
        let client = Self::try_build_internal_client(&config, session)?;
        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.concurrency.max(1))),
            config,
            shutdown,
        })
    }

    /// 构建底层的 HTTP 客户端
    fn try_build_internal_client(config: &HttpConfig, session: Arc<Session>) -> Result<ClientWithMiddleware> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_nodelay(true)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| GalleryError::Fetch(FetchError::new("", FetchCause::from_reqwest(&e), 0)))?;

        Ok(ClientBuilder::new(client)
            .with(SessionMiddleware::new(session))
            .with(StatusGuardMiddleware)
            .build())
    }

    /// 抓取页面文本，瞬时故障按线性退避重试
    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::new(url, FetchCause::InvalidUrl, 0));
        }

        let mut attempts = 0;
        loop {
            attempts += 1;

            let outcome = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => Err(FetchCause::Cancelled),
                res = self.attempt(url) => res,
            };

            let cause = match outcome {
                Ok(body) => return Ok(body),
                Err(cause) => cause,
            };

            if !cause.is_transient() || attempts > self.config.max_retries {
                return Err(FetchError::new(url, cause, attempts));
            }

            let wait = self.config.retry_backoff() * attempts;
            warn!(
                "请求失败 [{}] (第 {}/{} 次): {}。将在 {:?} 后重试...",
                url,
                attempts,
                self.config.max_retries + 1,
                cause,
                wait
            );

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    return Err(FetchError::new(url, FetchCause::Cancelled, attempts));
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, FetchCause> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchCause::Cancelled)?;

        let resp = self.client.get(url).send().await.map_err(classify)?;
        let body = resp.text().await.map_err(|e| FetchCause::from_reqwest(&e))?;
        debug!("已获取 {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

/// 将中间件链错误归类为抓取原因
fn classify(err: reqwest_middleware::Error) -> FetchCause {
    match err {
        reqwest_middleware::Error::Reqwest(e) => FetchCause::from_reqwest(&e),
        reqwest_middleware::Error::Middleware(e) => match e.downcast_ref::<RejectedStatus>() {
            Some(RejectedStatus(status)) => FetchCause::Status(*status),
            None => FetchCause::Other(e.to_string()),
        },
    }
}

#[async_trait]
impl PageSource for HttpService {
    async fn fetch_html(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.fetch(url).await
    }
}
