// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由引擎
//!
//! 该模块把一个已解析的 HTTP 请求映射到分发目标 `TargetRoute`。
//!
//! ## 匹配顺序
//! 1. REST 隧道改写：POST 携带 `?method=PUT|DELETE` 时改写生效方法；
//!    GET 携带 `?method=` 直接判错。
//! 2. URI 标准化：剥离查询串、去除首尾斜杠、剥离格式后缀。
//! 3. 查询参数模式：未启用 URL 重写（或空路径携带 `mod=`）时，直接从
//!    `mod=` / `ctrl=` / `action=` / `id=` 构造目标，不经过正则。
//! 4. 精确匹配快路径：路径命中静态路由表时 O(1) 返回，静态路由因此
//!    永远先于正则路由命中。
//! 5. 正则遍历：先按段数做粗过滤，再按插入顺序逐条尝试（先插入者
//!    优先，首个命中即停）。
//! 6. 每个候选命中后做可分发性检查，不可分发则丢弃该候选继续。
//! 7. 全部落空时降级为兜底路由（module `index`，action `list`），
//!    永不返回空目标。

use log::{debug, warn};

use crate::exception::Exception;
use crate::param::HttpRequestMethod;
use crate::request::Request;
use crate::route::Route;
use crate::target::{HandlerRegistry, TargetRoute};
use crate::util;

use std::collections::HashMap;

/// URL 路由器：有序路由表 + 静态路由精确匹配表 + 处理器登记表。
///
/// 构造完成后只读，匹配过程不修改路由器自身，可安全地跨线程共享。
#[derive(Debug, Clone)]
pub struct Router {
    /// 全部路由，插入顺序即优先级
    routes: Vec<Route>,
    /// 标准化模式到路由下标的精确匹配表（只收录静态路由，先插入者优先）
    static_table: HashMap<String, usize>,
    /// 可分发性检查使用的处理器登记表
    registry: HandlerRegistry,
    /// 是否启用 mod_rewrite 风格的路径 URL
    rewrite_urls: bool,
    /// 路由表修订号，外部缓存用它判断缓存项是否仍然有效
    revision: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            static_table: HashMap::new(),
            registry: HandlerRegistry::new(),
            rewrite_urls: true,
            revision: 0,
        }
    }

    /// 附加处理器登记表，启用可分发性检查。
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 切换 URL 重写模式。关闭后路由器只走查询参数模式。
    pub fn set_rewrite_urls(&mut self, rewrite_urls: bool) {
        self.rewrite_urls = rewrite_urls;
    }

    /// 向路由表追加一条路由。
    ///
    /// 静态路由同时登记进精确匹配表；同一路径的后来者不覆盖先来者，
    /// 维持「表序即优先级」的不变量。每次追加都推进修订号。
    pub fn add_route(&mut self, route: Route) {
        let index = self.routes.len();
        if route.is_static() {
            self.static_table
                .entry(route.normalized().to_string())
                .or_insert(index);
        }
        self.routes.push(route);
        self.revision += 1;
    }

    /// 以模式字符串追加路由的便捷方法。
    pub fn add_pattern(&mut self, pattern: &str) -> Result<(), Exception> {
        let route = Route::new(pattern)?;
        self.add_route(route);
        Ok(())
    }

    /// 路由表中的路由数量
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// 路由表是否为空
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 当前修订号。路由表每变化一次该值递增。
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// 处理器登记表的可变引用，用于在构造后补充登记。
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// # 路由匹配入口
    ///
    /// 把请求映射为分发目标。无法匹配的 URI 降级为兜底路由而不是报错；
    /// 返回 `Err` 的只有两类问题：空路由表（配置错误）和 GET 隧道（协议
    /// 滥用）。
    pub fn route(&self, request: &Request, id: u128) -> Result<TargetRoute, Exception> {
        if self.routes.is_empty() {
            return Err(Exception::EmptyRouteTable);
        }

        // 1. REST 隧道：确定生效的 HTTP 方法
        let method = self.effective_method(request, id)?;

        // 2. URI 标准化
        let (raw_path, _) = util::strip_query(request.request_uri());
        let trimmed = util::trim_slashes(raw_path);
        let (path, format) = util::split_format_extension(trimmed);

        // base 携带与路由表无关的请求级字段，候选之间从它复制，
        // 避免上一个候选的字段泄漏
        let mut base = TargetRoute::new();
        base.set_request_method(method);
        base.set_ajax(request.is_ajax());
        if let Some(format) = format {
            base.set_format(format);
        }

        // 3. 查询参数模式：不做正则匹配，直接取 mod= / ctrl= / action=
        if self.use_query_mode(path, request) {
            debug!("[ID{}]使用查询参数模式路由：{}", id, request.request_uri());
            return Ok(self.route_from_query(request, &base, id));
        }

        let segments = util::split_segments(path);

        // 空路径（站点首页）直接落到兜底路由
        if segments.is_empty() {
            debug!("[ID{}]空路径，返回兜底路由", id);
            return Ok(base);
        }

        // 4. 精确匹配快路径：静态路由永远赢过正则路由
        if let Some(&index) = self.static_table.get(path) {
            let route = &self.routes[index];
            let mut target = base.clone();
            target.absorb_defaults(route.default_values());
            if target.is_dispatchable(&self.registry) {
                debug!("[ID{}]精确匹配命中：{}", id, route.pattern());
                return Ok(target);
            }
            debug!(
                "[ID{}]精确匹配命中但目标不可分发：{}",
                id,
                route.pattern()
            );
        }

        // 5. 正则遍历：段数粗过滤 + 插入顺序逐条尝试
        for route in &self.routes {
            if route.segment_count() != segments.len() {
                continue;
            }
            let Some(matched) = route.match_path(path) else {
                continue;
            };

            // 6. 候选命中，检查可分发性
            let mut target = base.clone();
            target.absorb_defaults(route.default_values());
            target.absorb(matched);
            if target.is_dispatchable(&self.registry) {
                debug!("[ID{}]路由命中：{} -> {}", id, route.pattern(), path);
                return Ok(target);
            }
            debug!(
                "[ID{}]候选路由 {} 命中但目标 {}.{} 不可分发，继续",
                id,
                route.pattern(),
                target.classname(),
                target.method_name()
            );
        }

        // 7. 降级为兜底路由
        debug!("[ID{}]无可分发的匹配，返回兜底路由：{}", id, path);
        Ok(base)
    }

    /// REST 隧道改写。
    ///
    /// POST 携带 `?method=PUT|DELETE` 时返回改写后的方法；GET 携带
    /// `?method=` 一律判错；POST 携带未知取值时告警并维持 POST。
    fn effective_method(
        &self,
        request: &Request,
        id: u128,
    ) -> Result<HttpRequestMethod, Exception> {
        let tunneled = request.get_param("method");
        match (request.method(), tunneled) {
            (HttpRequestMethod::Get, Some(_)) => {
                warn!("[ID{}]GET请求试图通过method参数伪装方法，已拒绝", id);
                Err(Exception::MethodTunnelingOnGet)
            }
            (HttpRequestMethod::Post, Some(value)) => {
                match value.to_uppercase().as_str() {
                    "PUT" => Ok(HttpRequestMethod::Put),
                    "DELETE" => Ok(HttpRequestMethod::Delete),
                    other => {
                        warn!("[ID{}]未知的method隧道取值：{}，按POST处理", id, other);
                        Ok(HttpRequestMethod::Post)
                    }
                }
            }
            (method, _) => Ok(method),
        }
    }

    /// 是否走查询参数模式。
    ///
    /// 关闭 URL 重写时恒走该模式；开启时，空路径（或入口脚本路径）
    /// 携带 `mod=` 参数也走该模式，兼容两种部署共存的场景。
    fn use_query_mode(&self, path: &str, request: &Request) -> bool {
        if !self.rewrite_urls {
            return true;
        }
        (path.is_empty() || path == "index.php") && request.get_param("mod").is_some()
    }

    /// 从查询参数直接构造目标并尝试立即分发。
    fn route_from_query(&self, request: &Request, base: &TargetRoute, id: u128) -> TargetRoute {
        let mut target = base.clone();
        let Some(module) = request.get_param("mod") else {
            // 非重写部署下不带 mod= 的请求即站点首页
            return target;
        };
        target.set_module(module);
        if let Some(controller) = request.get_param("ctrl") {
            target.set_controller(controller);
        }
        if let Some(action) = request.get_param("action") {
            target.set_action(action);
        }
        if let Some(ident) = request.get_param("id") {
            target.set_param("id", ident);
        }

        if target.is_dispatchable(&self.registry) {
            target
        } else {
            debug!(
                "[ID{}]查询参数目标 {}.{} 不可分发，返回兜底路由",
                id,
                target.classname(),
                target.method_name()
            );
            base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use std::collections::HashMap;

    fn raw_request(line: &str) -> Request {
        let text = format!("{} HTTP/1.1\r\nHost: localhost:7878\r\n\r\n", line);
        Request::try_from(&text.as_bytes().to_vec(), 0).unwrap()
    }

    fn get(uri: &str) -> Request {
        raw_request(&format!("GET {}", uri))
    }

    fn post(uri: &str) -> Request {
        raw_request(&format!("POST {}", uri))
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// 规格核心用例：/:module/:controller/(:id)/:action 加约束 {1: id}
    #[test]
    fn test_home_route_with_positional_requirement() {
        let mut router = Router::new();
        router.add_route(
            Route::with_requirements("/:module/:controller/(:id)/:action", map(&[("1", "id")]))
                .unwrap(),
        );

        let target = router.route(&get("/news/admin/42/edit"), 0).unwrap();
        assert_eq!(target.module(), "news");
        assert_eq!(target.controller(), "admin");
        assert_eq!(target.param("id"), Some("42"));
        assert_eq!(target.action(), "edit");
    }

    /// 空路由表是配置错误
    #[test]
    fn test_empty_route_table_is_an_error() {
        let router = Router::new();
        match router.route(&get("/news"), 0) {
            Err(Exception::EmptyRouteTable) => {}
            other => panic!("Expected EmptyRouteTable, got {:?}", other),
        }
    }

    /// 未匹配的 URI 降级为兜底路由而不是报错
    #[test]
    fn test_unmatched_uri_falls_back_to_default() {
        let mut router = Router::new();
        router.add_pattern("/news/(:id)").unwrap();

        let target = router.route(&get("/does/not/exist"), 0).unwrap();
        assert_eq!(target.module(), "index");
        assert_eq!(target.action(), "list");
    }

    /// 精确匹配快路径：同一 URI 下静态路由永远赢过正则路由
    #[test]
    fn test_static_route_beats_regex_route() {
        let mut router = Router::new();
        // 正则路由先插入，按表序它本应先命中
        router.add_route(
            Route::new("/:module")
                .unwrap()
                .defaults(map(&[("action", "from_regex")])),
        );
        router.add_route(
            Route::new("/login")
                .unwrap()
                .defaults(map(&[("module", "account"), ("action", "login")])),
        );

        let target = router.route(&get("/login"), 0).unwrap();
        assert_eq!(target.module(), "account");
        assert_eq!(target.action(), "login");
    }

    /// 表序即优先级：首个命中的正则路由获胜
    #[test]
    fn test_first_regex_match_wins() {
        let mut router = Router::new();
        router.add_route(
            Route::new("/news/(:id)")
                .unwrap()
                .defaults(map(&[("module", "news"), ("action", "show")])),
        );
        router.add_route(
            Route::new("/:module/(:num)")
                .unwrap()
                .defaults(map(&[("action", "generic")])),
        );

        let target = router.route(&get("/news/42"), 0).unwrap();
        assert_eq!(target.action(), "show");
    }

    /// 段数粗过滤：段数不同的路由绝不参与匹配
    #[test]
    fn test_segment_count_prefilter() {
        let mut router = Router::new();
        router.add_route(
            Route::new("/:module/:action")
                .unwrap()
                .defaults(map(&[("marker", "two")])),
        );
        router.add_route(
            Route::new("/:module")
                .unwrap()
                .defaults(map(&[("marker", "one")])),
        );

        let target = router.route(&get("/news"), 0).unwrap();
        assert_eq!(target.param("marker"), Some("one"));

        let target = router.route(&get("/news/edit"), 0).unwrap();
        assert_eq!(target.param("marker"), Some("two"));
    }

    /// 不可分发的候选被丢弃，匹配继续到下一个候选
    #[test]
    fn test_dispatchability_skips_candidates() {
        let mut router = Router::new();
        router.add_route(
            Route::new("/:module/(:id)")
                .unwrap()
                .defaults(map(&[("controller", "public"), ("action", "show")])),
        );
        router.add_route(
            Route::with_requirements("/:controller/(:id)", map(&[("1", "id")]))
                .unwrap()
                .defaults(map(&[("module", "news"), ("action", "detail")])),
        );
        // 只登记第二条路由产出的目标
        router.registry_mut().register("news", "news", "detail");

        let target = router.route(&get("/news/42"), 0).unwrap();
        assert_eq!(target.module(), "news");
        assert_eq!(target.action(), "detail");
        assert_eq!(target.param("id"), Some("42"));
    }

    /// 所有候选都不可分发时降级为兜底路由
    #[test]
    fn test_no_dispatchable_candidate_yields_default() {
        let mut router = Router::new();
        router.add_route(
            Route::new("/:module/(:id)")
                .unwrap()
                .defaults(map(&[("action", "show")])),
        );
        router.registry_mut().register("blog", "blog", "list");

        let target = router.route(&get("/news/42"), 0).unwrap();
        assert_eq!(target.module(), "index");
        assert_eq!(target.action(), "list");
        // 上一个候选写入的字段不得泄漏进兜底目标
        assert_eq!(target.param("id"), None);
    }

    /// GET 隧道判错，POST 隧道改写生效方法
    #[test]
    fn test_rest_tunneling() {
        let mut router = Router::new();
        router.add_pattern("/news/(:id)").unwrap();

        match router.route(&get("/news/42?method=PUT"), 0) {
            Err(Exception::MethodTunnelingOnGet) => {}
            other => panic!("Expected MethodTunnelingOnGet, got {:?}", other),
        }

        let target = router.route(&post("/news/42?method=PUT"), 0).unwrap();
        assert_eq!(target.request_method(), HttpRequestMethod::Put);

        let target = router.route(&post("/news/42?method=delete"), 0).unwrap();
        assert_eq!(target.request_method(), HttpRequestMethod::Delete);

        // 未知取值维持 POST
        let target = router.route(&post("/news/42?method=TRACE"), 0).unwrap();
        assert_eq!(target.request_method(), HttpRequestMethod::Post);
    }

    /// 关闭 URL 重写时走查询参数模式
    #[test]
    fn test_query_mode_routing() {
        let mut router = Router::new();
        router.set_rewrite_urls(false);
        router.add_pattern("/:module/:action").unwrap();

        let target = router
            .route(&get("/index.php?mod=news&ctrl=admin&action=edit&id=42"), 0)
            .unwrap();
        assert_eq!(target.module(), "news");
        assert_eq!(target.controller(), "admin");
        assert_eq!(target.action(), "edit");
        assert_eq!(target.param("id"), Some("42"));
    }

    /// 重写模式下，空路径携带 mod= 的请求同样走查询参数模式
    #[test]
    fn test_query_mode_heuristic_under_rewrite() {
        let mut router = Router::new();
        router.add_pattern("/:module/:action").unwrap();

        let target = router.route(&get("/?mod=news&action=archive"), 0).unwrap();
        assert_eq!(target.module(), "news");
        assert_eq!(target.action(), "archive");
    }

    /// 格式后缀剥离并写入目标，未知后缀不剥离
    #[test]
    fn test_format_negotiation() {
        let mut router = Router::new();
        router.add_route(
            Route::with_requirements("/news/(:id)", map(&[("1", "id")])).unwrap(),
        );

        let target = router.route(&get("/news/42.json"), 0).unwrap();
        assert_eq!(target.format(), "json");
        assert_eq!(target.param("id"), Some("42"));

        let target = router.route(&get("/news/42"), 0).unwrap();
        assert_eq!(target.format(), "html");
    }

    /// 空路径（站点首页）直接返回兜底路由
    #[test]
    fn test_root_path_yields_default() {
        let mut router = Router::new();
        router.add_pattern("/:module").unwrap();

        let target = router.route(&get("/"), 0).unwrap();
        assert_eq!(target.module(), "index");
        assert_eq!(target.action(), "list");
    }

    /// Ajax 请求在目标上留下标记并关闭布局
    #[test]
    fn test_ajax_flag_propagates() {
        let mut router = Router::new();
        router.add_pattern("/:module").unwrap();

        let text = "GET /news HTTP/1.1\r\nHost: localhost\r\nX-Requested-With: XMLHttpRequest\r\n\r\n";
        let request = Request::try_from(&text.as_bytes().to_vec(), 0).unwrap();
        let target = router.route(&request, 0).unwrap();
        assert!(target.ajax());
        assert!(!target.layout());
    }

    /// 修订号随路由表变化递增
    #[test]
    fn test_revision_tracks_changes() {
        let mut router = Router::new();
        assert_eq!(router.revision(), 0);
        router.add_pattern("/:module").unwrap();
        router.add_pattern("/news/(:id)").unwrap();
        assert_eq!(router.revision(), 2);
    }

    /// 两个构造入口的初始配置必须一致
    #[test]
    fn test_default_matches_new() {
        let by_default = Router::default();
        let by_new = Router::new();
        assert_eq!(by_default.rewrite_urls, by_new.rewrite_urls);
        assert!(by_default.rewrite_urls);
        assert_eq!(by_default.revision(), by_new.revision());
        assert!(by_default.is_empty());
    }
}
