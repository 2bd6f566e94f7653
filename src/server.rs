//! HTTP 传输层
//!
//! 提供以下路由：
//!
//! - `POST /hash` - 多路复用端点，请求体中的 `type` 字段选择算法
//! - `POST /hash/{algorithm}` - 单算法端点，算法由路径给出
//! - `POST /verify` - 验证密码与哈希是否匹配
//! - `GET /health` - 存活检查
//!
//! 请求体不论 `Content-Type` 如何都按 JSON 解码。哈希计算是 CPU 密集型的，
//! 在阻塞线程池中执行。

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{Error, ErrorStatus};
use crate::password::HashOverrides;
use crate::service::{Dispatcher, HashRequest, HashResponse, VerifyRequest, VerifyResponse};

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: ErrorStatus,
}

/// 传输层错误，转换为带状态码的 JSON 响应
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let code = match status {
            ErrorStatus::BadRequest => StatusCode::BAD_REQUEST,
            ErrorStatus::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == ErrorStatus::InternalError {
            warn!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            message: self.0.message(),
            status,
        };
        (code, Json(body)).into_response()
    }
}

/// 单算法端点的请求体
#[derive(Debug, Deserialize)]
struct SingleAlgorithmBody {
    #[serde(default)]
    password: String,
    #[serde(default)]
    options: Option<HashOverrides>,
}

/// 在给定地址上提供服务，直到收到 Ctrl-C
pub async fn serve(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> crate::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::internal(format!("could not bind {}: {}", addr, e)))?;
    info!(%addr, algorithms = ?dispatcher.algorithms(), "listening");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::internal(format!("server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// 构建路由
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/hash", post(hash))
        .route("/hash/:algorithm", post(hash_with_algorithm))
        .route("/verify", post(verify))
        .route("/health", get(health))
        .with_state(dispatcher)
}

async fn hash(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Bytes,
) -> Result<Json<HashResponse>, ApiError> {
    let request: HashRequest = decode(&body)?;
    run_blocking(move || dispatcher.dispatch(&request)).await
}

async fn hash_with_algorithm(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(algorithm): Path<String>,
    body: Bytes,
) -> Result<Json<HashResponse>, ApiError> {
    let SingleAlgorithmBody { password, options } = decode(&body)?;
    let request = HashRequest {
        algorithm,
        password,
        options,
    };
    run_blocking(move || dispatcher.dispatch(&request)).await
}

async fn verify(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Bytes,
) -> Result<Json<VerifyResponse>, ApiError> {
    let request: VerifyRequest = decode(&body)?;
    run_blocking(move || dispatcher.verify(&request)).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        // 只记录位置，错误文本可能带有请求中的值
        debug!(line = e.line(), column = e.column(), "could not decode request body");
        ApiError(Error::bad_request("could not decode JSON data"))
    })
}

async fn run_blocking<T, F>(work: F) -> Result<Json<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> crate::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError(Error::internal(format!("hash worker failed: {}", e))))?
        .map(Json)
        .map_err(ApiError)
}
