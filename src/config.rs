use num_cpus;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use core::str;
use log::{error, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::prelude::*;

use crate::exception::Exception;
use crate::route::Route;
use crate::router::Router;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    port: u16,
    worker_threads: usize,
    cache_size: usize,
    local: bool,
    #[serde(default = "default_rewrite_urls")]
    rewrite_urls: bool,
    /// 应用级路由表文件，最先载入
    #[serde(default = "default_routes_file")]
    routes_file: String,
    /// 各模块的路由表文件，按列表顺序在应用级路由之后合并
    #[serde(default)]
    module_routes: Vec<String>,
}

fn default_rewrite_urls() -> bool {
    true
}

fn default_routes_file() -> String {
    "config/routes.toml".to_string()
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: 7878,
            worker_threads: 0,
            cache_size: 64,
            local: true,
            rewrite_urls: default_rewrite_urls(),
            routes_file: default_routes_file(),
            module_routes: Vec::new(),
        }
    }

    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => panic!("no such file {} exception:{}", filename, e),
        };
        let mut str_val = String::new();
        match file.read_to_string(&mut str_val) {
            Ok(s) => s,
            Err(e) => panic!("Error Reading file: {}", e),
        };

        let mut raw_config: Config = match toml::from_str(&str_val) {
            Ok(t) => t,
            Err(_) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置");
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.cache_size == 0 {
            warn!("cache_size被设置为0，但目前尚不支持禁用缓存，因此该值将被改为64。");
            raw_config.cache_size = 64;
        }
        raw_config
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn rewrite_urls(&self) -> bool {
        self.rewrite_urls
    }

    pub fn routes_file(&self) -> &str {
        &self.routes_file
    }

    pub fn module_routes(&self) -> &[String] {
        &self.module_routes
    }
}

/// 路由表文件中的一条路由声明。
///
/// ```toml
/// [[routes]]
/// pattern = "/:module/:controller/(:id)/:action"
/// requirements = { "1" = "id" }
/// defaults = { module = "news" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RouteSpec {
    pub pattern: String,
    #[serde(default)]
    pub requirements: HashMap<String, String>,
    #[serde(default)]
    pub defaults: HashMap<String, String>,
}

/// 一份路由表文件的顶层结构
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RouteFile {
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// 读取并反序列化单个路由表文件。
///
/// 与运行时配置不同，路由表属于路由器的输入数据：缺失或损坏的文件
/// 以 `Exception` 报告给调用方，由调用方决定是跳过还是中止。
pub fn load_route_file(filename: &str) -> Result<Vec<RouteSpec>, Exception> {
    let mut file = match File::open(filename) {
        Ok(f) => f,
        Err(_) => return Err(Exception::RouteFileNotFound(filename.to_string())),
    };
    let mut str_val = String::new();
    if file.read_to_string(&mut str_val).is_err() {
        return Err(Exception::RouteFileNotFound(filename.to_string()));
    }

    let route_file: RouteFile = match toml::from_str(&str_val) {
        Ok(t) => t,
        Err(e) => {
            error!("路由表文件 {} 解析失败：{}", filename, e);
            return Err(Exception::MalformedRouteFile(filename.to_string()));
        }
    };
    Ok(route_file.routes)
}

/// 按配置构建路由器：应用级路由表在前，各模块路由表按序在后。
///
/// 先载入者在表序上优先。缺失的模块路由表只记录告警并跳过，
/// 应用级路由表缺失则视为致命配置错误。
pub fn build_router(config: &Config) -> Result<Router, Exception> {
    let mut router = Router::new();
    router.set_rewrite_urls(config.rewrite_urls());

    for spec in load_route_file(config.routes_file())? {
        add_spec(&mut router, &spec)?;
    }

    for filename in config.module_routes() {
        match load_route_file(filename) {
            Ok(specs) => {
                for spec in specs {
                    add_spec(&mut router, &spec)?;
                }
            }
            Err(Exception::RouteFileNotFound(f)) => {
                warn!("模块路由表 {} 不存在，已跳过", f);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(router)
}

fn add_spec(router: &mut Router, spec: &RouteSpec) -> Result<(), Exception> {
    let route = Route::with_requirements(&spec.pattern, spec.requirements.clone())?
        .defaults(spec.defaults.clone());
    router.add_route(route);
    Ok(())
}
