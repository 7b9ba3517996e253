// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块负责将连接上第一次读取到的原始字节解析为结构化的 `Request`。它涵盖了：
//! 1. 以空行为界切分报文头与报文体，报文体按原始字节保留。
//! 2. 将报文头的每一行归类为带标签的 `Line` 变体，再折叠进 `Request`。
//! 3. 请求行（方法、目标、版本）与少量受支持标头的提取。
//!
//! 解析永远不会失败：行格式不正确时对应字段保持空值，由路由层尽力处理。

use crate::param::HttpRequestMethod;

use bytes::Bytes;
use log::{debug, warn};

/// 请求行：方法、请求目标与协议版本。
///
/// 版本字符串不做校验，原样保留。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestLine {
    method: HttpRequestMethod,
    target: String,
    version: String,
}

/// 服务器关心的少量请求标头，缺失时为空字符串或空序列。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestHeaders {
    host: String,
    user_agent: String,
    accept: String,
    /// 客户端列出的编码 token，保持原始顺序
    accept_encoding: Vec<String>,
}

/// 一个连接上唯一的 HTTP 请求。
#[derive(Debug, Clone, Default)]
pub struct Request {
    line: RequestLine,
    headers: RequestHeaders,
    /// 空行之后的原始字节，受单次读取缓冲区大小限制
    body: Bytes,
}

/// 报文头中单行的分类结果。
#[derive(Debug, PartialEq)]
enum Line {
    RequestLine(RequestLine),
    Host(String),
    Accept(String),
    UserAgent(String),
    AcceptEncoding(Vec<String>),
    /// 不受支持的标头或无法识别的行，直接丢弃
    Unmodeled,
}

impl Request {
    /// 从单次读取得到的字节构建 `Request`。
    ///
    /// # 参数
    /// * `buffer` - 从连接读取的原始数据（已截取到实际读取长度）。
    /// * `id` - 连接 ID，用于在日志中追踪。
    pub fn parse(buffer: &[u8], id: u128) -> Self {
        let (head, body) = split_head_body(buffer);
        let head = String::from_utf8_lossy(head);

        let mut request = Request {
            body: Bytes::copy_from_slice(body),
            ..Default::default()
        };
        let mut seen_request_line = false;

        for raw in head.split('\n') {
            let raw = raw.trim_end_matches('\r');
            match classify(raw) {
                Line::RequestLine(line) => {
                    if seen_request_line {
                        debug!("[ID{}]忽略重复的请求行：{}", id, raw);
                        continue;
                    }
                    seen_request_line = true;
                    request.line = line;
                }
                Line::Host(host) => request.headers.host = host,
                Line::Accept(accept) => request.headers.accept = accept,
                Line::UserAgent(user_agent) => request.headers.user_agent = user_agent,
                Line::AcceptEncoding(tokens) => request.headers.accept_encoding = tokens,
                Line::Unmodeled => {}
            }
        }

        if !seen_request_line {
            warn!("[ID{}]请求中没有可识别的请求行", id);
        } else if request.line.version.is_empty() {
            warn!("[ID{}]请求行格式不完整，缺失字段保持为空", id);
        }

        request
    }
}

/// 以第一个空行为界切分报文头与报文体。
///
/// 同时接受 `\r\n\r\n` 与裸 `\n\n`，取先出现者；找不到空行时整段视为报文头。
fn split_head_body(buffer: &[u8]) -> (&[u8], &[u8]) {
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| (i, i + 4));
    let lf = buffer
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|i| (i, i + 2));

    let boundary = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match boundary {
        Some((head_end, body_start)) => (&buffer[..head_end], &buffer[body_start..]),
        None => (buffer, &[]),
    }
}

fn classify(line: &str) -> Line {
    if line.starts_with("GET") || line.starts_with("POST") {
        let mut tokens = line.split_whitespace();
        let method = tokens
            .next()
            .map(HttpRequestMethod::from_token)
            .unwrap_or_default();
        let target = tokens.next().unwrap_or_default().to_string();
        let version = tokens.next().unwrap_or_default().to_string();
        Line::RequestLine(RequestLine {
            method,
            target,
            version,
        })
    } else if line.starts_with("Host") {
        Line::Host(header_value(line))
    } else if line.starts_with("Accept:") {
        Line::Accept(header_value(line))
    } else if line.starts_with("User-Agent") {
        Line::UserAgent(header_value(line))
    } else if let Some(rest) = line.strip_prefix("Accept-Encoding:") {
        // 以连续的非字母字符为分隔符，"gzip;q=1.0" 会得到 ["gzip", "q"]
        let tokens = rest
            .split(|c: char| !is_letter(c))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Line::AcceptEncoding(tokens)
    } else {
        Line::Unmodeled
    }
}

/// 字母字符：Alphabetic 中去掉罗马数字等字母型数字（Nl）
fn is_letter(c: char) -> bool {
    c.is_alphabetic() && !c.is_numeric()
}

/// 取第一个空白分隔的 token（标头名）之后的全部文本。
fn header_value(line: &str) -> String {
    match line.trim().split_once(char::is_whitespace) {
        Some((_, value)) => value.trim().to_string(),
        None => String::new(),
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn method(&self) -> HttpRequestMethod {
        self.line.method
    }

    /// 获取原始请求目标（路径）
    pub fn target(&self) -> &str {
        &self.line.target
    }

    /// 获取未经校验的协议版本字符串
    pub fn version(&self) -> &str {
        &self.line.version
    }

    pub fn host(&self) -> &str {
        &self.headers.host
    }

    pub fn user_agent(&self) -> &str {
        &self.headers.user_agent
    }

    pub fn accept(&self) -> &str {
        &self.headers.accept
    }

    /// 获取客户端列出的编码 token（按出现顺序）
    pub fn accept_encoding(&self) -> &[String] {
        &self.headers.accept_encoding
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
