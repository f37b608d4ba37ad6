// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由演示服务器
//!
//! 该模块实现了基于 Tokio 运行时的多线程演示服务器：接收 HTTP 请求、
//! 执行路由匹配，并把解析出的分发目标以 JSON 描述符的形式返回给
//! 客户端（真正的分发器由宿主应用提供，不在本程序范围内）。
//! 核心功能包括：
//! - 应用级与模块级路由表的载入与合并
//! - 基于 LRU 的路由解析结果缓存
//! - 支持多线程异步 I/O 处理
//! - 后台管理控制台（CLI 指令交互）

// --- 模块定义 ---
mod cache;      // 路由解析结果缓存
mod config;     // 配置解析与路由表载入
mod exception;  // 自定义异常与错误处理
mod param;      // 全局常量与静态参数
mod request;    // HTTP 请求报文解析器
mod route;      // 路由模式编译
mod router;     // 路由匹配引擎
mod target;     // 分发目标描述符
mod util;       // 通用工具函数

use cache::RouteCache;
use config::Config;
use request::Request;
use router::Router;

use chrono::Utc;
use log::{debug, error, info, warn};
use log4rs;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::{Arc, Mutex},
    time::Instant,
};

use crate::exception::Exception;
use crate::param::{CRLF, SERVER_NAME};

/// # 程序入口点
///
/// 初始化系统环境、加载配置与路由表，并启动主事件循环。
fn main() {
    // 1. 初始化日志系统：采用 log4rs 异步日志架构，通过外部 YAML 灵活配置级别与输出目的地
    log4rs::init_file("config/log4rs.yaml", Default::default()).unwrap();

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");

    // 3. 路由表载入：应用级路由表在前，各模块路由表按序合并在后
    let mut router = match config::build_router(&config) {
        Ok(router) => router,
        Err(e) => {
            error!("路由表载入失败：{}", e);
            panic!("路由表载入失败：{}", e);
        }
    };
    info!("路由表已载入，共{}条路由", router.len());

    // 演示用处理器登记表。宿主应用接入真实分发器时在此登记自己的控制器。
    router.registry_mut().register("index", "index", "list");
    router.registry_mut().register("news", "news", "show");
    router.registry_mut().register("news", "admin", "edit");
    router.registry_mut().register("account", "account", "login");

    // 4. 异步运行时定制：根据配置文件动态分配工作线程数，实现 CPU 绑定的并发优化
    let worker_threads = config.worker_threads();
    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(serve(config, router));
}

/// # 主服务循环
async fn serve(config: Config, router: Router) {
    // 共享资源初始化：
    // - 使用 Arc<Mutex<...>> 保证缓存系统在多线程环境下的线程安全
    // - 采用容量受限的缓存机制防止内存溢出
    let cache_size = config.cache_size();
    let cache = Arc::new(Mutex::new(RouteCache::from_capacity(cache_size)));
    let router_arc = Arc::new(router);

    // 网络层初始化：
    // 支持全地址监听 (0.0.0.0) 或本地回环监听 (127.0.0.1)
    let port: u16 = config.port();
    info!("服务端将在{}端口上监听Socket连接", port);
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}地址上监听Socket连接", address);
    let socket = SocketAddrV4::new(address, port);

    // 绑定端口并启动监听器
    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            panic!("无法绑定端口：{}，错误：{}", port, e);
        }
    };
    info!("端口{}绑定完成", port);

    // 服务器状态与生命周期管理
    // shutdown_flag: 用于优雅停机 (Graceful Shutdown)
    // active_connection: 追踪当前并发连接数
    let shutdown_flag = Arc::new(Mutex::new(false));
    let active_connection = Arc::new(Mutex::new(0u32));

    // 启动交互式管理控制台任务
    // 该任务运行在后台，不阻塞监听循环，提供运维指令支持
    tokio::spawn({
        let shutdown_flag = Arc::clone(&shutdown_flag);
        let active_connection = Arc::clone(&active_connection);
        let router = Arc::clone(&router_arc);
        async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut input = String::new();
            loop {
                input.clear();
                if let Ok(_) = reader.read_line(&mut input).await {
                    let cmd = input.trim();
                    match cmd {
                        "stop" => {
                            let mut flag = shutdown_flag.lock().unwrap();
                            *flag = true;
                            println!("停机指令已激活，服务器将在处理完下一个请求后关闭...");
                            break;
                        }
                        "help" => {
                            println!("== Webrouter Help ==");
                            println!("stop   - 发出停机信号");
                            println!("status - 查看当前服务器运行状态");
                            println!("help   - 显示此帮助信息");
                            println!("====================");
                        }
                        "status" => {
                            let active_count = *active_connection.lock().unwrap();
                            println!("== Webrouter 状态 ===");
                            println!("当前活跃连接数: {}", active_count);
                            println!("路由表条数: {}", router.len());
                            println!("====================");
                        }
                        _ => {
                            println!("无效的命令：{}", cmd);
                        }
                    }
                } else {
                    break;
                }
            }
        }
    });

    let mut id: u128 = 0;

    // 主事件循环 (Accept Loop)
    // 持续接收新连接并将其分发至 Tokio 线程池进行异步处理
    loop {
        // 检查停机标志位
        if *shutdown_flag.lock().unwrap() {
            info!("主循环接收到停机指令，正在退出...");
            break;
        }

        // 等待新的 TCP 连接
        let (mut stream, addr) = listener.accept().await.unwrap();
        debug!("新的连接：{}", addr);

        // 为每个连接克隆资源句柄（Arc 引用计数增加）
        let active_connection_arc = Arc::clone(&active_connection);
        let cache_arc = Arc::clone(&cache);
        let router_arc_clone = Arc::clone(&router_arc);

        debug!("[ID{}]TCP连接已建立", id);

        // 使用轻量级绿色线程处理具体请求，确保非阻塞 IO
        tokio::spawn(async move {
            {
                // 连接计数加 1
                let mut lock = active_connection_arc.lock().unwrap();
                *lock += 1;
            }

            // 核心业务处理
            handle_connection(&mut stream, id, router_arc_clone, cache_arc).await;

            {
                // 处理完成后连接计数减 1
                let mut lock = active_connection_arc.lock().unwrap();
                *lock -= 1;
            }
        });
        id += 1; // 增加请求唯一标识序列
    }
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期，包括读取解析请求、执行路由匹配、
/// 以及把分发目标序列化为 JSON 响应发送回去。
async fn handle_connection(
    stream: &mut TcpStream,
    id: u128,
    router: Arc<Router>,
    cache: Arc<Mutex<RouteCache>>,
) {
    let mut buffer = vec![0; 1024];

    // 等待流进入可读状态
    stream.readable().await.unwrap();

    // 尝试非阻塞读取 HTTP 报文
    match stream.try_read(&mut buffer) {
        Ok(0) => return, // 客户端主动关闭连接
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
        _ => {}
    }
    debug!("[ID{}]HTTP请求接收完毕", id);

    let start_time = Instant::now();

    // 1. 协议解析阶段：将字节流转换为结构化的 Request 对象
    let request = match Request::try_from(&buffer, id) {
        Ok(req) => req,
        Err(e) => {
            error!("[ID{}]解析HTTP请求失败: {:?}", id, e);
            let _ = send_plain(stream, 400, "Bad Request").await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    // 2. 缓存查询阶段：同一 {方法, URI, ajax} 的解析结果直接复用
    // 锁的作用域内只取出JSON文本，发送在释放锁之后进行
    let cache_key = RouteCache::key(
        &request.method().to_string(),
        request.request_uri(),
        request.is_ajax(),
    );
    let cached_body = {
        let mut cache_lock = match cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("[ID{}]缓存锁被污染，恢复并继续", id);
                poisoned.into_inner()
            }
        };
        cache_lock
            .find(&cache_key, router.revision())
            .map(|target| target.to_json().to_string())
    };
    if let Some(body) = cached_body {
        debug!("[ID{}]路由缓存命中：{}", id, cache_key);
        let _ = send_json(stream, 200, &body).await;
        return;
    }

    // 3. 路由匹配阶段：确定分发目标
    let target = match router.route(&request, id) {
        Ok(target) => target,
        Err(Exception::MethodTunnelingOnGet) => {
            warn!("[ID{}]GET隧道被拒绝：{}", id, request.request_uri());
            let _ = send_plain(stream, 400, "Bad Request").await;
            return;
        }
        Err(e) => {
            error!("[ID{}]路由匹配失败: {}", id, e);
            let _ = send_plain(stream, 500, "Internal Server Error").await;
            return;
        }
    };
    debug!(
        "[ID{}]HTTP路由解析完毕，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    // 4. 缓存回填
    {
        let mut cache_lock = match cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("[ID{}]缓存锁被污染，恢复并继续", id);
                poisoned.into_inner()
            }
        };
        cache_lock.push(&cache_key, target.clone(), router.revision());
    }

    // 5. 结构化日志记录：便于后期审计与性能监控
    info!(
        "[ID{}] {}, {}, {} -> {}.{}, {}",
        id,
        request.version(),
        request.request_uri(),
        request.method(),
        target.classname(),
        target.method_name(),
        request.user_agent(),
    );

    // 6. 数据发送阶段：分发目标描述符作为 JSON 返回
    let body = target.to_json().to_string();
    let _ = send_json(stream, 200, &body).await;
}

/// 发送 JSON 响应
async fn send_json(stream: &mut TcpStream, code: u16, body: &str) -> std::io::Result<()> {
    send_response(stream, code, "application/json", body).await
}

/// 发送纯文本响应
async fn send_plain(stream: &mut TcpStream, code: u16, body: &str) -> std::io::Result<()> {
    send_response(stream, code, "text/plain", body).await
}

async fn send_response(
    stream: &mut TcpStream,
    code: u16,
    content_type: &str,
    body: &str,
) -> std::io::Result<()> {
    let reason = match code {
        200 => "OK",
        400 => "Bad Request",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}{CRLF}Server: {}{CRLF}Date: {}{CRLF}Content-Type: {}{CRLF}Content-Length: {}{CRLF}{CRLF}{}",
        code,
        reason,
        SERVER_NAME,
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT"),
        content_type,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}
