use std::collections::HashMap;

use crate::param::FORMAT_EXTENSIONS;

/// 从完整 URI 中切出查询字符串。
///
/// 返回 `(路径部分, 查询字符串)`，查询字符串不包含 `?` 本身。
pub fn strip_query(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

/// 去除路径两端的 `/`。
///
/// `"/news/admin/"` 与 `"news/admin"` 在路由语义上等价，
/// 统一化之后才能进行精确匹配与分段。
pub fn trim_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

/// 将标准化后的路径按 `/` 切分为有序路径段。空路径产生空向量。
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// 剥离用于格式协商的尾部后缀名。
///
/// 只有收录在 `FORMAT_EXTENSIONS` 白名单中的后缀才会被剥离，
/// 例如 `news/admin/42.json` 变为 `("news/admin/42", Some("json"))`；
/// `archive/v1.2` 中的 `.2` 不是合法格式，路径原样保留。
pub fn split_format_extension(path: &str) -> (&str, Option<&'static str>) {
    if let Some((stem, ext)) = path.rsplit_once('.') {
        // 后缀只可能出现在最后一个路径段内
        if !ext.contains('/') {
            if let Some(format) = FORMAT_EXTENSIONS.get(ext) {
                return (stem, Some(format));
            }
        }
    }
    (path, None)
}

/// 将查询字符串解析为键值对映射。
///
/// 不做百分号解码：路由参数的取值空间（模块名、动作名、数字 id）
/// 均不含保留字符，解码交给后续的参数绑定层处理。
/// 重复的键以最后一次出现为准。
pub fn parse_query_pairs(query: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for part in query.split('&') {
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((key, value)) => pairs.insert(key.to_string(), value.to_string()),
            None => pairs.insert(part.to_string(), String::new()),
        };
    }
    pairs
}
