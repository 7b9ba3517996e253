// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了服务器遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 服务器会产生的状态码及其原因短语（Reason Phrase）。
//! - 单次读取缓冲区与文件读取上限的默认值。
//! - HTTP 方法、版本及编码格式的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 响应状态行中的协议标识，永远是 HTTP/1.1
pub const STATUS_LINE_VERSION: &str = "HTTP/1.1";

/// 单次读取连接数据时使用的缓冲区大小
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// `GET /files/<name>` 最多返回的文件字节数，超出部分被截断
pub const DEFAULT_FILE_READ_LIMIT: usize = 1024;

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 4221;

/// `/echo` 路由返回的内容类型
pub const TEXT_PLAIN: &str = "text/plain";

/// `/files/` 路由返回的内容类型
pub const OCTET_STREAM: &str = "application/octet-stream";

lazy_static! {
    /// 服务器可能返回的状态码与其标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(201, "Created");
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(500, "Internal Server Error");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    /// HTTP/1.1 版本
    V1_1,
}

/// 请求行中的 HTTP 方法。
///
/// 只有 GET 与 POST 被识别，其余（包括缺失的方法）统一归为 `Unrecognized`。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 提交数据
    Post,
    /// 无法识别或缺失的方法
    #[default]
    Unrecognized,
}

impl HttpRequestMethod {
    /// 按字面值（大小写敏感）识别方法名
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => HttpRequestMethod::Get,
            "POST" => HttpRequestMethod::Post,
            _ => HttpRequestMethod::Unrecognized,
        }
    }
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpEncoding {
    /// GNU zip 压缩
    Gzip,
}

impl HttpEncoding {
    /// 将 `Accept-Encoding` 中的单个 token 映射为编码。
    ///
    /// 比较是大小写敏感的，`GZIP` 不会被接受。
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gzip" => Some(HttpEncoding::Gzip),
            _ => None,
        }
    }
}

use std::fmt;

impl fmt::Display for HttpVersion {
    /// 将枚举格式化为 HTTP 报文中的版本字符串
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_1 => write!(f, "{}", STATUS_LINE_VERSION),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Post => write!(f, "POST"),
            HttpRequestMethod::Unrecognized => write!(f, "UNRECOGNIZED"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// 将枚举格式化为 `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
        }
    }
}
