// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由与处理器分发
//!
//! 按请求目标的字面值/前缀匹配路由，按以下优先级（先匹配者生效）：
//! 1. `/` -> 空的 200 响应。
//! 2. `/echo...` -> 回显去掉 `/echo/` 前缀后的内容。
//! 3. `/user-agent...` -> 回显请求的 User-Agent。
//! 4. `/files/...` -> GET 读取文件，POST 写入文件，其它方法返回 405。
//! 5. 其它路径 -> 404。
//!
//! 所服务的目录与文件系统能力在构造时注入，不依赖任何全局状态。

use crate::{
    exception::Exception,
    file::{FileDirectory, FileStore, LocalFileStore},
    param::*,
    request::Request,
    response::Response,
};

use log::{debug, error, warn};

/// 请求目标匹配到的路由
#[derive(Debug, PartialEq)]
enum Route<'a> {
    Root,
    /// 携带需要回显的内容
    Echo(&'a str),
    UserAgent,
    /// 携带 `/files/` 之后的文件名
    Files(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    fn from_target(target: &'a str) -> Self {
        if target == "/" {
            Route::Root
        } else if target.starts_with("/echo") {
            // `/echo` 本身或 `/echoX` 不含 `/echo/` 前缀，原样回显
            Route::Echo(target.strip_prefix("/echo/").unwrap_or(target))
        } else if target.starts_with("/user-agent") {
            Route::UserAgent
        } else if let Some(name) = target.strip_prefix("/files/") {
            Route::Files(name)
        } else {
            Route::NotFound
        }
    }
}

pub struct Router<S: FileStore = LocalFileStore> {
    directory: FileDirectory,
    store: S,
    /// GET 文件时最多返回的字节数
    file_read_limit: usize,
}

impl Router<LocalFileStore> {
    pub fn new(directory: FileDirectory, file_read_limit: usize) -> Self {
        Self::with_store(directory, LocalFileStore, file_read_limit)
    }
}

impl<S: FileStore> Router<S> {
    pub fn with_store(directory: FileDirectory, store: S, file_read_limit: usize) -> Self {
        Self {
            directory,
            store,
            file_read_limit,
        }
    }

    pub fn directory(&self) -> &FileDirectory {
        &self.directory
    }

    /// 将请求分发到对应的处理器并生成响应
    pub fn dispatch(&self, request: &Request, id: u128) -> Response {
        let route = Route::from_target(request.target());
        debug!("[ID{}]路由匹配结果：{:?}", id, route);

        match route {
            Route::Root => Response::new(),
            Route::Echo(content) => {
                Response::with_body(200, TEXT_PLAIN, content.as_bytes().to_vec())
            }
            Route::UserAgent => Response::with_body(
                200,
                TEXT_PLAIN,
                request.user_agent().as_bytes().to_vec(),
            ),
            Route::Files(name) => match self.serve_file(request, name, id) {
                Ok(response) => response,
                Err(e) => {
                    warn!("[ID{}]处理文件请求{}失败：{}", id, request.target(), e);
                    Response::from_exception(e)
                }
            },
            Route::NotFound => {
                debug!("[ID{}]请求的路径：{} 不存在，返回404", id, request.target());
                Response::from_status_code(404)
            }
        }
    }

    fn serve_file(&self, request: &Request, name: &str, id: u128) -> Result<Response, Exception> {
        match request.method() {
            HttpRequestMethod::Get => self.read_file(name, id),
            HttpRequestMethod::Post => self.write_file(name, request, id),
            HttpRequestMethod::Unrecognized => Err(Exception::MethodNotAllowed),
        }
    }

    fn read_file(&self, name: &str, id: u128) -> Result<Response, Exception> {
        let path = self.directory.resolve(name, id)?;
        if !self.store.exists(&path) {
            return Err(Exception::FileNotFound);
        }

        // 多读一个字节，用来判断文件是否被截断
        let mut contents = match self.store.read_up_to(&path, self.file_read_limit + 1) {
            Ok(c) => c,
            Err(e) => {
                error!("[ID{}]无法读取文件{}: {}", id, path.display(), e);
                return Err(Exception::FileReadFailed);
            }
        };
        if contents.len() > self.file_read_limit {
            warn!(
                "[ID{}]文件{}超过{}字节，响应体已截断",
                id,
                path.display(),
                self.file_read_limit
            );
            contents.truncate(self.file_read_limit);
        }
        debug!("[ID{}]读取文件{}，共{}字节", id, path.display(), contents.len());

        Ok(Response::with_body(200, OCTET_STREAM, contents))
    }

    fn write_file(&self, name: &str, request: &Request, id: u128) -> Result<Response, Exception> {
        let path = self.directory.resolve(name, id)?;
        if let Err(e) = self.store.write_all(&path, request.body()) {
            error!("[ID{}]无法写入文件{}: {}", id, path.display(), e);
            return Err(Exception::FileWriteFailed);
        }
        debug!(
            "[ID{}]已写入文件{}，共{}字节",
            id,
            path.display(),
            request.body().len()
        );
        Ok(Response::from_status_code(201))
    }
}
