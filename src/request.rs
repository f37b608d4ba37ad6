// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块是路由器的输入端，负责将 TCP 流中读取的原始字节码
//! 解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 路由相关 HTTP 标头（Headers）的提取。
//! 3. 查询字符串（Query String）的键值对解析。
//! 4. Ajax 请求识别（`X-Requested-With` 标头）。

use std::collections::HashMap;

use crate::{exception::Exception, param::*, util};
use log::error;

/// 表示一个完整的 HTTP 请求元数据。
///
/// 该结构体不包含请求体（Body）的大数据部分，主要用于路由分发和权限校验。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法（GET, POST 等）
    method: HttpRequestMethod,
    /// 请求的资源路径（包含查询字符串）
    uri: String,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: String,
    /// 查询字符串解析出的键值对
    query_params: HashMap<String, String>,
    /// 该请求是否由 XMLHttpRequest 发起
    ajax: bool,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法、路径和协议版本。
    /// 3. 解析查询字符串：从路径中切出 `?` 之后的部分并建立键值映射。
    /// 4. 迭代解析标头：识别 `User-Agent` 与 `X-Requested-With` 字段。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    ///
    /// # 错误处理
    /// 如果请求格式不符合 HTTP 规范或使用了不支持的方法/版本，将返回相应的 `Exception`。
    pub fn try_from(buffer: &Vec<u8>, id: u128) -> Result<Self, Exception> {
        // 1. 将字节流转换为字符串，失败则判定为非法的 HTTP 请求
        let request_string = match String::from_utf8(buffer.to_vec()) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let request_lines: Vec<&str> = request_string.split(CRLF).collect();

        // 2. 解析请求行 (e.g., "GET /news/admin/42/edit HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(" ").collect();

        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::UnSupportedRequestMethod);
        }

        // 解析方法名
        let method_str = first_line_parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "OPTIONS" => HttpRequestMethod::Options,
            "POST" => HttpRequestMethod::Post,
            "PUT" => HttpRequestMethod::Put,
            "DELETE" => HttpRequestMethod::Delete,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        // 解析协议版本
        let version_str = first_line_parts.last().unwrap().to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 解析路径（考虑到路径中可能包含空格的情况，虽然不规范但通过 join 尝试恢复）
        let uri = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };

        // 3. 从路径中切出查询字符串并解析为键值对
        let query_params = match util::strip_query(&uri) {
            (_, Some(query)) => util::parse_query_pairs(query),
            (_, None) => HashMap::new(),
        };

        // 4. 迭代各行解析 Headers
        let mut user_agent = "".to_string();
        let mut ajax = false;
        for line in &request_lines {
            let line_lower = line.to_lowercase();
            // 处理 User-Agent
            if line_lower.starts_with("user-agent") {
                if let Some(val) = line.split(": ").nth(1) {
                    user_agent = val.to_string();
                }
            }
            // 处理 X-Requested-With：前端框架以此标记 Ajax 请求
            else if line_lower.starts_with("x-requested-with") {
                if let Some(val) = line.split(": ").nth(1) {
                    ajax = val.eq_ignore_ascii_case("xmlhttprequest");
                }
            }
        }

        Ok(Self {
            method,
            uri,
            version,
            user_agent,
            query_params,
            ajax,
        })
    }
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取完整请求 URI（含查询参数）
    pub fn request_uri(&self) -> &str {
        &self.uri
    }

    /// 获取不含查询字符串的路径部分
    pub fn path(&self) -> &str {
        util::strip_query(&self.uri).0
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 按名称读取单个查询参数
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// 获取全部查询参数
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// 该请求是否由 XMLHttpRequest 发起
    pub fn is_ajax(&self) -> bool {
        self.ajax
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
