// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由模式编译模块
//!
//! 该模块是路由器的核心组件之一，负责把人类可读的路由模式字符串
//! （例如 `/:module/:controller/(:id)/:action`）编译为可执行的正则表达式。
//! 编译过程分为三步：
//! 1. 占位符宏展开：`(:id)` 等括号占位符按固定映射表做纯文本替换。
//! 2. 逐段编译：静态段转义为字面量，`:name` 命名段编译为命名捕获组。
//! 3. 锚定拼接：所有段用 `/` 连接并加上 `^...$` 锚点，防止部分匹配。

use std::collections::HashMap;

use log::debug;
use regex::Regex;

use crate::exception::Exception;
use crate::param::{DEFAULT_SEGMENT_PATTERN, PLACEHOLDER_PATTERNS};
use crate::util;

/// 一条路由：模式原文、约束映射、派生的段数与编译后的正则。
#[derive(Debug, Clone)]
pub struct Route {
    /// 模式原文（保留传入时的写法，用于日志与调试）
    pattern: String,
    /// 标准化（去除首尾斜杠）后的模式，用作精确匹配表的键
    normalized: String,
    /// 约束映射。数字键把第 N 个匿名捕获组重命名为指定参数名；
    /// 非数字键覆盖同名命名段的默认正则片段。
    requirements: HashMap<String, String>,
    /// 路由自带的目标默认值（module / controller / action / 任意参数）。
    /// 捕获组提取出的同名值优先于默认值。
    defaults: HashMap<String, String>,
    /// 模式包含的路径段数量，用于匹配前的粗过滤
    segment_count: usize,
    /// 编译后的正则表达式
    regex: Regex,
    /// 是否为纯静态路由（不含任何占位符）
    is_static: bool,
}

/// 一次成功匹配提取出的参数。
///
/// 命名捕获与被约束重命名的匿名捕获进入 `named`；
/// 剩余的匿名捕获按出现顺序进入 `positional`。
#[derive(Debug, Clone, Default)]
pub struct RouteMatch {
    pub named: HashMap<String, String>,
    pub positional: Vec<String>,
}

impl Route {
    /// 编译一条不带约束的路由。
    pub fn new(pattern: &str) -> Result<Self, Exception> {
        Self::with_requirements(pattern, HashMap::new())
    }

    /// 编译一条带约束映射的路由。
    ///
    /// # 编译规则
    /// - 括号占位符（`(:id)` 等）先按 `PLACEHOLDER_PATTERNS` 展开，
    ///   展开结果与占位符出现的位置无关（引用透明）。
    /// - `:name` 命名段编译为 `(?P<name>...)`，约束映射中存在同名
    ///   非数字键时使用该键的正则片段，否则使用默认的 `[a-z_-]+`。
    /// - 其余段视为静态字面量，经 `regex::escape` 转义后写入。
    pub fn with_requirements(
        pattern: &str,
        requirements: HashMap<String, String>,
    ) -> Result<Self, Exception> {
        let normalized = util::trim_slashes(pattern).to_string();

        // 1. 占位符宏展开（纯文本替换）
        let mut expanded = normalized.clone();
        for (placeholder, replacement) in PLACEHOLDER_PATTERNS.iter() {
            expanded = expanded.replace(placeholder, replacement);
        }

        // 2. 逐段编译
        let segments = util::split_segments(&expanded);
        let segment_count = segments.len();
        let mut is_static = true;
        let mut compiled_segments: Vec<String> = Vec::with_capacity(segment_count);
        for segment in &segments {
            if let Some(name) = segment.strip_prefix(':') {
                // 命名段：约束映射可覆盖默认正则片段
                let constraint = requirements
                    .get(name)
                    .map(|s| s.as_str())
                    .unwrap_or(DEFAULT_SEGMENT_PATTERN);
                compiled_segments.push(format!("(?P<{}>{})", name, constraint));
                is_static = false;
            } else if segment.contains('(') {
                // 宏展开产生的匿名捕获组，原样写入
                compiled_segments.push((*segment).to_string());
                is_static = false;
            } else {
                compiled_segments.push(regex::escape(segment));
            }
        }

        // 3. 锚定拼接
        let regex_str = format!("^{}$", compiled_segments.join("/"));
        let regex = match Regex::new(&regex_str) {
            Ok(re) => re,
            Err(e) => {
                debug!("路由模式 {} 编译失败：{}", pattern, e);
                return Err(Exception::InvalidRoutePattern(pattern.to_string()));
            }
        };

        Ok(Self {
            pattern: pattern.to_string(),
            normalized,
            requirements,
            defaults: HashMap::new(),
            segment_count,
            regex,
            is_static,
        })
    }

    /// 以建造者风格附加目标默认值。
    ///
    /// 静态路由（如 `/login`）没有捕获组，完全依赖默认值描述目标；
    /// 动态路由也可以用默认值补齐模式中未出现的字段。
    pub fn defaults(mut self, defaults: HashMap<String, String>) -> Self {
        self.defaults = defaults;
        self
    }

    /// 将标准化路径与该路由的正则进行匹配。
    ///
    /// 入参必须是已去除首尾斜杠、查询串和格式后缀的路径。
    /// 匹配成功时返回提取出的参数，失败时返回 `None`。
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let caps = self.regex.captures(path)?;

        let mut result = RouteMatch::default();
        // 匿名捕获组的序号（1 起），用于套用数字键约束
        let mut anonymous_index = 0usize;
        for (i, name) in self.regex.capture_names().enumerate() {
            if i == 0 {
                continue; // 第 0 组是整体匹配
            }
            let Some(value) = caps.get(i) else {
                continue;
            };
            match name {
                Some(n) => {
                    result.named.insert(n.to_string(), value.as_str().to_string());
                }
                None => {
                    anonymous_index += 1;
                    match self.requirements.get(&anonymous_index.to_string()) {
                        Some(mapped_name) => {
                            result
                                .named
                                .insert(mapped_name.clone(), value.as_str().to_string());
                        }
                        None => result.positional.push(value.as_str().to_string()),
                    }
                }
            }
        }
        Some(result)
    }
}

// --- Getter 访问器实现 ---

impl Route {
    /// 获取模式原文
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 获取标准化后的模式（精确匹配表的键）
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// 获取模式包含的路径段数量
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// 该路由是否为纯静态路由
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// 获取路由自带的目标默认值
    pub fn default_values(&self) -> &HashMap<String, String> {
        &self.defaults
    }

    /// 获取编译后的正则表达式原文
    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }
}
