// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 分发目标模块
//!
//! 该模块定义了路由匹配的产出物 `TargetRoute`：一个描述「哪个模块的
//! 哪个控制器的哪个动作、带什么参数、以什么格式输出」的目标描述符。
//! 下游的分发器（Dispatcher，不在本 crate 范围内）消费该描述符并完成
//! 实际的处理器调用。
//!
//! ## 关于状态
//! 历史实现把分发目标做成进程级静态状态，在常驻进程部署下存在跨请求
//! 泄漏的隐患。这里改为按请求持有的普通值类型：`reset()` 只是一个还原
//! 默认值的普通方法，匹配循环在候选路由之间调用它。

use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::param::{ACTION_PREFIX, DEFAULT_ACTION, DEFAULT_MODULE, HttpRequestMethod};
use crate::route::RouteMatch;

/// 路由匹配产出的分发目标描述符。
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRoute {
    /// 目标模块名
    module: String,
    /// 目标控制器名。未显式指定时回退为模块名。
    controller: Option<String>,
    /// 目标动作名
    action: String,
    /// 经约束重命名或命名捕获得到的具名参数
    params: HashMap<String, String>,
    /// 未被命名的匿名捕获，按出现顺序排列
    positional_params: Vec<String>,
    /// 输出格式（由 URI 后缀协商得出）
    format: String,
    /// 是否渲染页面布局（Ajax 请求通常关闭）
    layout: bool,
    /// 是否为 Ajax 请求
    ajax: bool,
    /// 渲染引擎名称
    renderer: String,
    /// 主题名称
    themename: String,
    /// 生效的 HTTP 方法（REST 隧道改写之后的值）
    request_method: HttpRequestMethod,
}

impl Default for TargetRoute {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            controller: None,
            action: DEFAULT_ACTION.to_string(),
            params: HashMap::new(),
            positional_params: Vec::new(),
            format: "html".to_string(),
            layout: true,
            ajax: false,
            renderer: "html".to_string(),
            themename: "default".to_string(),
            request_method: HttpRequestMethod::Get,
        }
    }
}

impl TargetRoute {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把自身还原为默认目标（兜底路由）。
    ///
    /// 匹配循环本身通过克隆请求级基准目标来隔离候选路由之间的字段，
    /// 此方法留给需要原地复用同一目标对象的调用方。
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 将一次路由匹配的捕获结果写入目标。
    ///
    /// `module` / `controller` / `action` / `id` 是保留参数名，
    /// 直接落到对应字段；其余具名捕获进入参数映射。
    pub fn absorb(&mut self, matched: RouteMatch) {
        for (name, value) in matched.named {
            match name.as_str() {
                "module" => self.module = value,
                "controller" => self.controller = Some(value),
                "action" => self.action = value,
                _ => {
                    self.params.insert(name, value);
                }
            }
        }
        self.positional_params = matched.positional;
    }

    /// 将路由自带的目标默认值写入目标。
    ///
    /// 必须先于 `absorb` 调用：捕获组提取出的同名值覆盖默认值。
    pub fn absorb_defaults(&mut self, defaults: &HashMap<String, String>) {
        for (name, value) in defaults {
            match name.as_str() {
                "module" => self.module = value.clone(),
                "controller" => self.controller = Some(value.clone()),
                "action" => self.action = value.clone(),
                _ => {
                    self.params.insert(name.clone(), value.clone());
                }
            }
        }
    }

    /// 目标实现类的标识，形如 `news::admin`。
    pub fn classname(&self) -> String {
        format!("{}::{}", self.module, self.controller())
    }

    /// 目标处理方法名，形如 `action_edit`。
    pub fn method_name(&self) -> String {
        format!("{}{}", ACTION_PREFIX, self.action)
    }

    /// 目标是否指向一个真实注册过的处理器。
    ///
    /// 只做存在性查询，绝不触发调用。
    pub fn is_dispatchable(&self, registry: &HandlerRegistry) -> bool {
        registry.contains(&self.module, self.controller(), &self.action)
    }

    /// 序列化为分发器消费的 JSON 描述符。
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "module": self.module,
            "controller": self.controller(),
            "action": self.action,
            "method": self.method_name(),
            "params": self.params.clone(),
            "positional_params": self.positional_params.clone(),
            "format": self.format,
            "layout": self.layout,
            "ajax": self.ajax,
            "renderer": self.renderer,
            "themename": self.themename,
            "request_method": self.request_method.to_string(),
        })
    }
}

// --- Setter / Getter 访问器实现 ---

impl TargetRoute {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn set_module(&mut self, module: &str) {
        self.module = module.to_string();
    }

    /// 控制器名。未显式指定时与模块同名（模块的主控制器）。
    pub fn controller(&self) -> &str {
        self.controller.as_deref().unwrap_or(&self.module)
    }

    pub fn set_controller(&mut self, controller: &str) {
        self.controller = Some(controller.to_string());
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn set_action(&mut self, action: &str) {
        self.action = action.to_string();
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    pub fn set_param(&mut self, name: &str, value: &str) {
        self.params.insert(name.to_string(), value.to_string());
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn positional_params(&self) -> &[String] {
        &self.positional_params
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, format: &str) {
        self.format = format.to_string();
    }

    pub fn layout(&self) -> bool {
        self.layout
    }

    pub fn set_layout(&mut self, layout: bool) {
        self.layout = layout;
    }

    pub fn ajax(&self) -> bool {
        self.ajax
    }

    /// 标记 Ajax 请求。Ajax 响应不渲染页面布局。
    pub fn set_ajax(&mut self, ajax: bool) {
        self.ajax = ajax;
        if ajax {
            self.layout = false;
        }
    }

    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    pub fn set_renderer(&mut self, renderer: &str) {
        self.renderer = renderer.to_string();
    }

    pub fn themename(&self) -> &str {
        &self.themename
    }

    pub fn set_themename(&mut self, themename: &str) {
        self.themename = themename.to_string();
    }

    pub fn request_method(&self) -> HttpRequestMethod {
        self.request_method
    }

    pub fn set_request_method(&mut self, method: HttpRequestMethod) {
        self.request_method = method;
    }
}

/// 已注册处理器的登记表。
///
/// 运行时没有「按名查类」的反射能力，可分发性检查改为对显式注册过的
/// `{模块, 控制器, 动作}` 三元组做查询。空登记表表示使用方没有接入
/// 分发器，此时一切目标视为可分发（检查是可选能力）。
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    /// `module::controller` 到动作集合的映射
    handlers: HashMap<String, HashSet<String>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个处理器三元组。
    pub fn register(&mut self, module: &str, controller: &str, action: &str) {
        self.handlers
            .entry(format!("{}::{}", module, controller))
            .or_default()
            .insert(action.to_string());
    }

    /// 存在性查询：`{module}::{controller}` 下是否登记了 `action`。
    pub fn contains(&self, module: &str, controller: &str, action: &str) -> bool {
        if self.handlers.is_empty() {
            return true;
        }
        self.handlers
            .get(&format!("{}::{}", module, controller))
            .map(|actions| actions.contains(action))
            .unwrap_or(false)
    }

    /// 登记表是否为空（未接入分发器）
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
