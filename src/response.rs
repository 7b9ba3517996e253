// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应构建模块
//!
//! `Response` 由路由层按请求新建，经过一次内容协商（可选的 gzip 压缩）后，
//! 被序列化为写回连接的完整字节序列。
//!
//! 响应头永远按固定顺序输出 `Content-Encoding`、`Content-Type`、`Content-Length`
//! 三项，即使值为空也保留该行。

use crate::{exception::Exception, param::*};

use bytes::Bytes;
use flate2::{write::GzEncoder, Compression};
use log::{debug, error};

use std::io::{self, Write};

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    /// 为 `None` 时输出空的 `Content-Length` 行
    content_length: Option<usize>,
    content_encoding: Option<HttpEncoding>,
    content: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// 空的 `200 OK` 响应
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: None,
            content_encoding: None,
            content: Bytes::new(),
        }
    }

    /// 只有状态行、没有响应体的响应（201、404、405 等）
    pub fn from_status_code(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response
    }

    /// 带响应体的响应，`Content-Length` 按响应体字节数设置
    pub fn with_body(code: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        let content: Bytes = body.into();
        let mut response = Self::new();
        response.set_code(code);
        response.content_type = Some(content_type.to_string());
        response.content_length = Some(content.len());
        response.content = content;
        response
    }

    /// 由异常生成对应状态码的空响应
    pub fn from_exception(exception: Exception) -> Self {
        Self::from_status_code(exception.status_code())
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&reason) => reason.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                String::new()
            }
        };
        self
    }

    /// 按客户端的 `Accept-Encoding` 对响应体进行压缩。
    ///
    /// 只要 token 序列中任意位置出现字面值 `gzip` 就启用压缩，且只压缩一次。
    /// 压缩后 `Content-Length` 以压缩结果的长度重新计算。
    pub fn compress_for(&mut self, accept_encoding: &[String], id: u128) -> Result<(), Exception> {
        if self.content_encoding.is_some() {
            return Ok(());
        }
        let encoding = match decide_encoding(accept_encoding) {
            Some(e) => e,
            None => {
                debug!("[ID{}]不进行压缩", id);
                return Ok(());
            }
        };
        debug!("[ID{}]使用{}压缩编码", id, encoding);

        let compressed = match compress(&self.content, Some(encoding)) {
            Ok(c) => c,
            Err(e) => {
                error!("[ID{}]压缩响应体失败: {}", id, e);
                return Err(Exception::CompressionFailed);
            }
        };
        self.content_encoding = Some(encoding);
        self.content_length = Some(compressed.len());
        self.content = Bytes::from(compressed);
        Ok(())
    }

    /// 序列化为写回连接的完整字节序列
    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = &self.version.to_string();
        let status_code: &str = &self.status_code.to_string();
        let information: &str = &self.information;
        let content_encoding: &str = &match self.content_encoding {
            Some(e) => e.to_string(),
            None => String::new(),
        };
        let content_type: &str = self.content_type.as_deref().unwrap_or("");
        let content_length: &str = &match self.content_length {
            Some(len) => len.to_string(),
            None => String::new(),
        };

        let header = [
            version,
            " ",
            status_code,
            " ",
            information,
            CRLF,
            "Content-Encoding: ",
            content_encoding,
            CRLF,
            "Content-Type: ",
            content_type,
            CRLF,
            "Content-Length: ",
            content_length,
            CRLF,
            CRLF,
        ]
        .concat();

        [header.as_bytes(), &self.content[..]].concat()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

fn compress(data: &[u8], mode: Option<HttpEncoding>) -> io::Result<Vec<u8>> {
    let original_size = data.len();
    let result = match mode {
        Some(HttpEncoding::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        None => Ok(data.to_vec()),
    };

    if let Ok(ref compressed) = result {
        debug!(
            "压缩完成: {:?}, 原始大小: {} bytes, 压缩后: {} bytes",
            mode,
            original_size,
            compressed.len()
        );
    }

    result
}

fn decide_encoding(accept_encoding: &[String]) -> Option<HttpEncoding> {
    accept_encoding
        .iter()
        .find_map(|token| HttpEncoding::from_token(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use proptest::prelude::*;
    use std::io::Read;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        out
    }

    /// 把序列化结果拆成报文头与报文体
    fn split(bytes: &[u8]) -> (String, Vec<u8>) {
        let pos = bytes.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        (
            String::from_utf8(bytes[..pos + 4].to_vec()).unwrap(),
            bytes[pos + 4..].to_vec(),
        )
    }

    #[test]
    fn test_compress_none() {
        let data = b"Hello, World!".to_vec();
        let result = compress(&data, None).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_compress_gzip() {
        let data = b"Hello, World! This is a test string for compression.".to_vec();
        let result = compress(&data, Some(HttpEncoding::Gzip)).unwrap();

        assert_ne!(result, data);
        assert_eq!(&result[0..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&result), data);
    }

    #[test]
    fn test_compress_empty_data() {
        let result = compress(&[], Some(HttpEncoding::Gzip)).unwrap();
        assert!(!result.is_empty());
        assert!(gunzip(&result).is_empty());
    }

    #[test]
    fn test_decide_encoding() {
        assert_eq!(decide_encoding(&tokens(&["gzip"])), Some(HttpEncoding::Gzip));
        assert_eq!(
            decide_encoding(&tokens(&["identity", "gzip"])),
            Some(HttpEncoding::Gzip)
        );
        assert_eq!(decide_encoding(&tokens(&["deflate", "br"])), None);
        assert_eq!(decide_encoding(&tokens(&["GZIP"])), None);
        assert_eq!(decide_encoding(&[]), None);
    }

    #[test]
    fn test_response_new() {
        let response = Response::new();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.information(), "OK");
        assert_eq!(response.content_type(), None);
        assert_eq!(response.content_length(), None);
        assert!(response.content().is_empty());
    }

    #[test]
    fn test_as_bytes_empty_headers() {
        let bytes = Response::new().as_bytes();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-Encoding: \r\nContent-Type: \r\nContent-Length: \r\n\r\n"
        );
    }

    #[test]
    fn test_as_bytes_with_content() {
        let bytes = Response::with_body(200, TEXT_PLAIN, "hello").as_bytes();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-Encoding: \r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (201, "Created"),
            (400, "Bad Request"),
            (404, "Not Found"),
            (405, "Method Not Allowed"),
            (500, "Internal Server Error"),
        ];
        for (code, reason) in cases {
            let response = Response::from_status_code(code);
            assert_eq!(response.status_code(), code);
            assert_eq!(response.information(), reason);
        }
    }

    #[test]
    fn test_from_exception() {
        let response = Response::from_exception(Exception::FileNotFound);
        assert_eq!(response.status_code(), 404);
        assert!(response.content().is_empty());
    }

    #[test]
    fn test_compress_for_gzip() {
        let mut response = Response::with_body(200, TEXT_PLAIN, "abcabcabcabcabc");
        response.compress_for(&tokens(&["gzip"]), 0).unwrap();

        assert_eq!(response.content_encoding(), Some(HttpEncoding::Gzip));
        assert_eq!(response.content_length(), Some(response.content().len()));
        assert_eq!(gunzip(response.content()), b"abcabcabcabcabc");

        let (head, body) = split(&response.as_bytes());
        assert!(head.contains("Content-Encoding: gzip\r\n"));
        assert!(head.contains(&format!("Content-Length: {}\r\n", body.len())));
    }

    #[test]
    fn test_compress_for_without_gzip() {
        let mut response = Response::with_body(200, TEXT_PLAIN, "plain");
        response
            .compress_for(&tokens(&["deflate", "br"]), 0)
            .unwrap();

        assert_eq!(response.content_encoding(), None);
        assert_eq!(response.content().as_ref(), b"plain");
        assert_eq!(response.content_length(), Some(5));
    }

    /// gzip 重复出现时也只压缩一次
    #[test]
    fn test_compress_for_single_pass() {
        let mut response = Response::with_body(200, TEXT_PLAIN, "twice");
        response
            .compress_for(&tokens(&["gzip", "gzip"]), 0)
            .unwrap();
        response.compress_for(&tokens(&["gzip"]), 0).unwrap();

        assert_eq!(gunzip(response.content()), b"twice");
    }

    /// 压缩失败时返回不带响应体的 500
    #[test]
    fn test_compression_failure_is_500() {
        let response = Response::from_exception(Exception::CompressionFailed);
        let bytes = response.as_bytes();

        assert!(bytes.starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(bytes.ends_with(b"Content-Length: \r\n\r\n"));
    }

    /// 空响应体在启用 gzip 时也会得到正确的 Content-Length
    #[test]
    fn test_compress_for_empty_body_sets_length() {
        let mut response = Response::from_status_code(404);
        response.compress_for(&tokens(&["gzip"]), 0).unwrap();

        let (head, body) = split(&response.as_bytes());
        assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(head.contains(&format!("Content-Length: {}\r\n", body.len())));
        assert!(gunzip(&body).is_empty());
    }

    proptest! {
        /// 对任意响应体，gzip 解压结果与原文一致，且 Content-Length 等于实际传输长度
        #[test]
        fn prop_gzip_round_trip(body in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let mut response = Response::with_body(200, OCTET_STREAM, body.clone());
            response.compress_for(&tokens(&["identity", "gzip"]), 0).unwrap();
            let (head, sent) = split(&response.as_bytes());
            let expected_length = format!("Content-Length: {}\r\n", sent.len());
            prop_assert!(head.contains(&expected_length));
            prop_assert_eq!(gunzip(&sent), body);
        }

        /// 未协商压缩时响应体原样发送
        #[test]
        fn prop_identity_when_not_negotiated(body in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let mut response = Response::with_body(200, OCTET_STREAM, body.clone());
            response.compress_for(&[], 0).unwrap();
            let (_, sent) = split(&response.as_bytes());
            prop_assert_eq!(sent, body);
        }
    }
}
