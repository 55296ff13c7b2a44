//! HTTP 接口：访客计数端点、健康检查与请求追踪中间件

pub mod middleware;
pub mod services;
