// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了路由器在请求解析与路由匹配生命周期中可能抛出的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了协议解析错误、路由表配置错误以及路由模式编译错误。
//! - **语义映射**：每个变体都对应了特定的业务逻辑，便于上层模块将其转化为对应的 HTTP 响应状态码。
//! - **用户友好**：通过实现 `std::fmt::Display`，确保错误信息可以被安全地记录到日志或返回给客户端。

use std::fmt;

/// 路由器处理请求过程中发生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
/// 注意：URI 无法匹配任何路由**不是**异常，它会降级到兜底路由。
#[derive(Debug, Clone)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    /// 这通常发生在请求头或正文包含非法字符时。
    RequestIsNotUtf8,
    /// 客户端使用了服务器暂不支持的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本（例如：HTTP/0.9 或过高的版本）。
    UnsupportedHttpVersion,
    /// 路由表为空。没有任何候选路由可供匹配，属于配置错误而非请求错误。
    EmptyRouteTable,
    /// GET 请求试图通过 `?method=` 参数伪装 PUT/DELETE 语义。
    /// REST 隧道（REST Tunneling）只允许在 POST 请求上进行。对应 `400 Bad Request`。
    MethodTunnelingOnGet,
    /// 路由模式字符串无法编译为合法的正则表达式。
    /// 携带出错的模式原文，便于在日志中定位配置问题。
    InvalidRoutePattern(String),
    /// 路由表配置文件缺失或无法读取。
    RouteFileNotFound(String),
    /// 路由表配置文件存在但内容不是合法的 TOML。
    MalformedRouteFile(String),
}

use Exception::*;

/// 为 `Exception` 实现 `Display` 特性，使其支持字符串格式化输出。
///
/// 工业实践中，这些描述信息常用于系统日志（Logging）以及发送给开发者的调试响应体中。
impl fmt::Display for Exception {
    /// 根据错误类型写入人类可读的描述文本。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            EmptyRouteTable => write!(f, "Route table is empty, nothing to match against"),
            MethodTunnelingOnGet => write!(f, "Method tunneling is not allowed on GET requests"),
            InvalidRoutePattern(p) => write!(f, "Route pattern can't be compiled: {}", p),
            RouteFileNotFound(p) => write!(f, "Route file not found: {}", p),
            MalformedRouteFile(p) => write!(f, "Route file is not valid TOML: {}", p),
        }
    }
}
