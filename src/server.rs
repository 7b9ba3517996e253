// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接接入与单连接处理
//!
//! 每个被接受的连接由一个独立的 Tokio 任务处理：一次读取、一次解析/路由/编码、
//! 一次写回，然后关闭连接。任务之间只共享只读的路由器（及其中的根目录）。
//!
//! `max_connections` 为 0 时不限制并发任务数；否则使用信号量限制同时处理的连接数。

use crate::{
    config::Config,
    file::{FileDirectory, FileStore},
    request::Request,
    response::Response,
    router::Router,
};

use log::{debug, error, info};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpListener,
    sync::Semaphore,
};

use std::{
    future::Future,
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::Arc,
    time::{Duration, Instant},
};

/// accept 失败后的重试间隔
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    read_buffer_size: usize,
    connection_limit: Option<Arc<Semaphore>>,
}

impl Server {
    /// 按配置绑定监听地址
    pub async fn bind(config: &Config) -> io::Result<Self> {
        let address = match config.local() {
            true => Ipv4Addr::new(127, 0, 0, 1),
            false => Ipv4Addr::new(0, 0, 0, 0),
        };
        let socket = SocketAddrV4::new(address, config.port());
        let listener = TcpListener::bind(socket).await?;
        info!("服务端将在{}上监听Socket连接", socket);
        Ok(Self::from_listener(listener, config))
    }

    /// 使用已绑定的监听器构建服务器
    pub fn from_listener(listener: TcpListener, config: &Config) -> Self {
        let router = Router::new(
            FileDirectory::new(config.directory()),
            config.file_read_limit(),
        );
        let connection_limit = match config.max_connections() {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };
        Self {
            listener,
            router: Arc::new(router),
            read_buffer_size: config.read_buffer_size(),
            connection_limit,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 运行接入循环，直到收到 Ctrl-C
    pub async fn run(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("无法监听停机信号：{}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// 运行接入循环，直到 `shutdown` 完成。已经开始处理的连接不受影响。
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut id: u128 = 0;

        loop {
            let permit = match &self.connection_limit {
                Some(limit) => {
                    let acquired = tokio::select! {
                        _ = &mut shutdown => break,
                        permit = limit.clone().acquire_owned() => permit,
                    };
                    match acquired {
                        Ok(p) => Some(p),
                        Err(e) => {
                            error!("连接信号量已关闭：{}", e);
                            break;
                        }
                    }
                }
                None => None,
            };

            let accepted = tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => accepted,
            };
            let (mut stream, addr) = match accepted {
                Ok(a) => a,
                Err(e) => {
                    error!("接受连接时遇到错误：{}", e);
                    // 文件描述符耗尽等错误会持续出现，稍等再重试
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };
            debug!("[ID{}]TCP连接已建立：{}", id, addr);

            let router = Arc::clone(&self.router);
            let read_buffer_size = self.read_buffer_size;
            tokio::spawn(async move {
                handle_connection(&mut stream, id, router.as_ref(), read_buffer_size).await;
                drop(permit);
            });
            id += 1;
        }
        info!("接入循环已退出");
    }
}

/// # 连接处理器
///
/// 负责单个连接的完整生命周期：读取、解析、路由、压缩协商、写回。
/// 读取失败或对端在发送任何数据前关闭时直接放弃，不发送任何响应。
pub async fn handle_connection<T, S>(
    stream: &mut T,
    id: u128,
    router: &Router<S>,
    read_buffer_size: usize,
) where
    T: AsyncRead + AsyncWrite + Unpin,
    S: FileStore,
{
    let mut buffer = vec![0; read_buffer_size];
    let bytes_read = match stream.read(&mut buffer).await {
        Ok(0) => {
            debug!("[ID{}]客户端在发送请求前关闭了连接", id);
            return;
        }
        Ok(n) => n,
        Err(e) => {
            error!("[ID{}]读取连接时遇到错误: {}", id, e);
            return;
        }
    };
    debug!("[ID{}]HTTP请求接收完毕，共{}字节", id, bytes_read);

    let start_time = Instant::now();

    let request = Request::parse(&buffer[..bytes_read], id);
    debug!("[ID{}]Host: {}, Accept: {}", id, request.host(), request.accept());

    let mut response = router.dispatch(&request, id);
    if let Err(e) = response.compress_for(request.accept_encoding(), id) {
        error!("[ID{}]{}，返回500", id, e);
        response = Response::from_exception(e);
    }

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}",
        id,
        request.version(),
        request.target(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    let response_bytes = response.as_bytes();
    debug!("[ID{}]发送全量响应，长度: {}", id, response_bytes.len());
    if let Err(e) = stream.write_all(&response_bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}
