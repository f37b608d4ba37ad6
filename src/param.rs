// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由器协议参数与常量模块
//!
//! 该模块定义了 `shaneyale-webrouter` 使用的协议常量和数据结构，包括：
//! - 路由模式中的占位符宏（Placeholder Macro）到正则片段的映射表。
//! - 用于格式协商的 URI 后缀名映射表。
//! - HTTP 方法、版本的强类型枚举。
//! - 默认路由（兜底路由）使用的模块名与动作名。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// 服务器名称标识，用于演示程序 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "shaneyale-webrouter";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 兜底路由的模块名。任何无法匹配的 URI 最终都会落到该模块上。
pub const DEFAULT_MODULE: &str = "index";

/// 兜底路由的动作名
pub const DEFAULT_ACTION: &str = "list";

/// 命名段（`:name` 形式）未被约束覆盖时使用的默认正则片段
pub const DEFAULT_SEGMENT_PATTERN: &str = "[a-z_-]+";

/// 动作名到处理方法名的前缀。`edit` 动作对应 `action_edit` 方法。
pub const ACTION_PREFIX: &str = "action_";

lazy_static! {
    /// 占位符宏到正则片段的映射表。
    ///
    /// 路由模式在编译前先做一轮纯文本替换，例如 `(:id)` 无论出现在
    /// 模式的哪个位置都固定展开为 `([0-9]+)`（引用透明）。
    pub static ref PLACEHOLDER_PATTERNS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("(:id)", "([0-9]+)");
        map.insert("(:num)", "([0-9]+)");
        map.insert("(:alpha)", "([a-zA-Z]+)");
        map.insert("(:alphanum)", "([a-zA-Z0-9]+)");
        map.insert("(:word)", "([a-zA-Z0-9_]+)");
        map.insert("(:year)", "([0-9]{4})");
        map
    };
}

lazy_static! {
    /// URI 尾部后缀名到输出格式（Output Format）的映射表。
    ///
    /// 仅列在表中的后缀会被识别并从 URI 上剥离，用于格式协商；
    /// 未知后缀保留在最后一个路径段中，避免吞掉 id 中的合法点号。
    pub static ref FORMAT_EXTENSIONS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("html", "html");
        map.insert("json", "json");
        map.insert("xml", "xml");
        map.insert("csv", "csv");
        map.insert("rss", "rss");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy)]
pub enum HttpVersion {
    /// HTTP/1.1 版本
    V1_1,
}

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 获取资源的元数据（不包含响应体）
    Head,
    /// 查询服务器支持的选项
    Options,
    /// 提交数据或执行操作
    Post,
    /// 创建或整体替换资源
    Put,
    /// 删除资源
    Delete,
}

use std::fmt;

impl fmt::Display for HttpVersion {
    /// 将枚举格式化为 HTTP 报文中的版本字符串
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
            HttpRequestMethod::Post => write!(f, "POST"),
            HttpRequestMethod::Put => write!(f, "PUT"),
            HttpRequestMethod::Delete => write!(f, "DELETE"),
        }
    }
}
