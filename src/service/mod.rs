//! 哈希服务核心
//!
//! 请求校验、参数合并、算法分发与结果归一化。传输层只需把解码后的
//! [`HashRequest`] 交给 [`Dispatcher::dispatch`]。

mod dispatcher;
mod request;

pub use dispatcher::{Dispatcher, DispatcherBuilder, Stage};
pub use request::{HashRequest, HashResponse, VerifyRequest, VerifyResponse};
