// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由器公共 API 集成测试
//!
//! 该套件完全在进程内运行，不依赖外部服务器，
//! 覆盖路由器对外承诺的全部可测性质。

use std::collections::HashMap;

use webrouter::{Exception, HttpRequestMethod, Request, Route, Router};

fn request(line: &str) -> Request {
    let text = format!("{} HTTP/1.1\r\nHost: localhost:7878\r\n\r\n", line);
    Request::try_from(&text.as_bytes().to_vec(), 0).unwrap()
}

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// 搭建一个带常用路由的路由器
fn standard_router() -> Router {
    let mut router = Router::new();
    router.add_route(
        Route::new("/login")
            .unwrap()
            .defaults(map(&[("module", "account"), ("action", "login")])),
    );
    router.add_route(
        Route::with_requirements("/:module/:controller/(:id)/:action", map(&[("1", "id")]))
            .unwrap(),
    );
    router.add_route(
        Route::with_requirements("/:module/(:id)/:action", map(&[("1", "id")])).unwrap(),
    );
    router.add_pattern("/:module/:action").unwrap();
    router.add_pattern("/:module").unwrap();
    router
}

#[test]
fn resolves_full_module_controller_id_action() {
    let router = standard_router();

    let target = router.route(&request("GET /news/admin/42/edit"), 0).unwrap();

    assert_eq!(target.module(), "news");
    assert_eq!(target.controller(), "admin");
    assert_eq!(target.param("id"), Some("42"));
    assert_eq!(target.action(), "edit");
    assert_eq!(target.classname(), "news::admin");
    assert_eq!(target.method_name(), "action_edit");
}

#[test]
fn static_route_shortcircuits_regex_iteration() {
    let router = standard_router();

    // `/login` 同时满足 `/:module` 的正则，但静态路由必须先命中
    let target = router.route(&request("GET /login"), 0).unwrap();
    assert_eq!(target.module(), "account");
    assert_eq!(target.action(), "login");
}

#[test]
fn unmatched_uri_always_yields_default_target() {
    let router = standard_router();

    // 大写字母不满足默认的 [a-z_-]+ 约束
    let target = router.route(&request("GET /NEWS/Admin"), 0).unwrap();
    assert_eq!(target.module(), "index");
    assert_eq!(target.action(), "list");

    // 超过任何路由段数的 URI 同样降级
    let target = router
        .route(&request("GET /a/b/c/d/e/f/g"), 0)
        .unwrap();
    assert_eq!(target.module(), "index");
}

#[test]
fn empty_route_table_raises_error() {
    let router = Router::new();
    assert!(matches!(
        router.route(&request("GET /news"), 0),
        Err(Exception::EmptyRouteTable)
    ));
}

#[test]
fn get_tunneling_is_rejected_post_tunneling_rewrites() {
    let router = standard_router();

    assert!(matches!(
        router.route(&request("GET /news/42/edit?method=PUT"), 0),
        Err(Exception::MethodTunnelingOnGet)
    ));

    let target = router
        .route(&request("POST /news/42/edit?method=PUT"), 0)
        .unwrap();
    assert_eq!(target.request_method(), HttpRequestMethod::Put);

    let target = router
        .route(&request("POST /news/42/edit?method=DELETE"), 0)
        .unwrap();
    assert_eq!(target.request_method(), HttpRequestMethod::Delete);
}

#[test]
fn format_extension_is_negotiated_and_stripped() {
    let router = standard_router();

    let target = router
        .route(&request("GET /news/admin/42/edit.json"), 0)
        .unwrap();
    assert_eq!(target.format(), "json");
    assert_eq!(target.param("id"), Some("42"));
    assert_eq!(target.action(), "edit");
}

#[test]
fn query_mode_bypasses_regex_matching() {
    let mut router = standard_router();
    router.set_rewrite_urls(false);

    let target = router
        .route(
            &request("GET /index.php?mod=news&ctrl=admin&action=edit&id=42"),
            0,
        )
        .unwrap();
    assert_eq!(target.module(), "news");
    assert_eq!(target.controller(), "admin");
    assert_eq!(target.action(), "edit");
    assert_eq!(target.param("id"), Some("42"));
}

#[test]
fn dispatchability_controls_candidate_acceptance() {
    let mut router = standard_router();
    router.registry_mut().register("news", "admin", "edit");

    // 登记过的目标正常返回
    let target = router.route(&request("GET /news/admin/42/edit"), 0).unwrap();
    assert_eq!(target.classname(), "news::admin");

    // 未登记的目标降级为兜底路由
    let target = router.route(&request("GET /blog/7/show"), 0).unwrap();
    assert_eq!(target.module(), "index");
    assert_eq!(target.action(), "list");
    assert_eq!(target.param("id"), None);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `(:id)` 的展开结果与它在模式中的位置无关
        #[test]
        fn placeholder_expansion_is_referentially_transparent(
            prefix in "[a-z]{1,8}",
            suffix in "[a-z]{1,8}",
        ) {
            let head = Route::new(&format!("/(:id)/{}/{}", prefix, suffix)).unwrap();
            let middle = Route::new(&format!("/{}/(:id)/{}", prefix, suffix)).unwrap();
            let tail = Route::new(&format!("/{}/{}/(:id)", prefix, suffix)).unwrap();

            prop_assert_eq!(head.regex_str(), format!("^([0-9]+)/{}/{}$", prefix, suffix));
            prop_assert_eq!(middle.regex_str(), format!("^{}/([0-9]+)/{}$", prefix, suffix));
            prop_assert_eq!(tail.regex_str(), format!("^{}/{}/([0-9]+)$", prefix, suffix));
        }

        /// 段数过滤恰好保留段数相等的路由：URI 有几段就命中几段的路由
        #[test]
        fn segment_count_filter_is_exact(segments in prop::collection::vec("[a-z]{1,8}", 1..=4)) {
            let mut router = Router::new();
            for count in 1..=4usize {
                let pattern = (0..count)
                    .map(|i| format!("/:seg{}", i))
                    .collect::<String>();
                let route = Route::new(&pattern).unwrap().defaults(
                    [("depth".to_string(), count.to_string())].into_iter().collect()
                );
                router.add_route(route);
            }

            let uri = format!("/{}", segments.join("/"));
            let target = router.route(&request(&format!("GET {}", uri)), 0).unwrap();
            let depth = segments.len().to_string();
            prop_assert_eq!(target.param("depth"), Some(depth.as_str()));
        }

        /// 任意 URI 下路由器都返回目标而不是崩溃
        #[test]
        fn router_is_total_over_arbitrary_paths(path in "[a-zA-Z0-9/._-]{0,64}") {
            let router = standard_router();
            let uri = format!("/{}", path);
            let result = router.route(&request(&format!("GET {}", uri)), 0);
            prop_assert!(result.is_ok());
        }
    }
}
