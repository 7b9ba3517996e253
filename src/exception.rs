// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在请求处理生命周期中可能出现的各类异常情况。
//!
//! 请求解析本身从不失败（畸形的行只会让对应字段保持空值），因此这里只覆盖
//! 路由、文件系统与压缩阶段的错误。每个变体都对应一个确定的 HTTP 状态码，
//! 由路由层负责转换。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Exception {
    /// 在指定的资源根目录下未找到所请求的文件。对应 `404 Not Found`。
    FileNotFound,
    /// 请求的文件名为空、是绝对路径或包含 `..` 等越权片段。对应 `400 Bad Request`。
    InvalidPath,
    /// `/files/` 路由收到了 GET、POST 以外的方法。对应 `405 Method Not Allowed`。
    MethodNotAllowed,
    /// 文件存在但无法读取（例如是目录或权限不足）。对应 `500 Internal Server Error`。
    FileReadFailed,
    /// 写入上传文件失败（权限、磁盘空间等）。对应 `500 Internal Server Error`。
    FileWriteFailed,
    /// gzip 压缩响应体失败。只影响当前请求，对应 `500 Internal Server Error`。
    CompressionFailed,
}

use Exception::*;

impl Exception {
    /// 异常对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            FileNotFound => 404,
            InvalidPath => 400,
            MethodNotAllowed => 405,
            FileReadFailed | FileWriteFailed | CompressionFailed => 500,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileNotFound => write!(f, "File not found (404)"),
            InvalidPath => write!(f, "Invalid path (400)"),
            MethodNotAllowed => write!(f, "Method not allowed (405)"),
            FileReadFailed => write!(f, "Couldn't read the requested file"),
            FileWriteFailed => write!(f, "Couldn't write the uploaded file"),
            CompressionFailed => write!(f, "Couldn't gzip the response body"),
        }
    }
}

impl std::error::Error for Exception {}
