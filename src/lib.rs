pub mod cache;
pub mod config;
pub mod exception;
pub mod param;
pub mod request;
pub mod route;
pub mod router;
pub mod target;
pub mod util;

pub use cache::RouteCache;
pub use config::Config;
pub use exception::Exception;
pub use param::{HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use route::{Route, RouteMatch};
pub use router::Router;
pub use target::{HandlerRegistry, TargetRoute};
