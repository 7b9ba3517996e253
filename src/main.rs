// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 最小 HTTP/1.1 服务器
//!
//! 程序入口：初始化日志、载入配置、构建 Tokio 运行时并启动接入循环。
//! 核心功能包括：
//! - `/` 探活、`/echo/<内容>` 回显、`/user-agent` 回显客户端标识
//! - `/files/<文件名>` 的 GET 读取与 POST 写入
//! - 按 `Accept-Encoding` 协商的 gzip 压缩

use codecrafters_http::{file::ensure_root, Config, Server};

use clap::Parser;
use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::runtime::Builder;

use std::{path::Path, process};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const DEFAULT_CONFIG: &str = "config/development.toml";

#[derive(Parser, Debug)]
#[command(name = "codecrafters-http")]
#[command(about = "A minimal HTTP/1.1 server", long_about = None)]
struct Args {
    /// `/files/` 路由所服务的目录，覆盖配置文件中的值
    #[arg(long)]
    directory: Option<String>,

    /// TOML 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// 监听端口，覆盖配置文件中的值
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() {
    let args = Args::parse();

    // 1. 初始化日志系统：优先使用外部 YAML 配置，缺失时退回到控制台输出
    init_logging(LOG_CONFIG);

    // 2. 环境配置加载：命令行参数覆盖 TOML 文件
    let mut config = Config::from_toml(&args.config);
    config.override_with(args.directory, args.port);
    info!("配置文件已载入");
    info!("文件根目录：{}", config.directory());

    if let Err(e) = ensure_root(Path::new(config.directory())) {
        error!("无法创建目录{}：{}", config.directory(), e);
        process::exit(1);
    }

    // 3. 异步运行时定制：根据配置文件分配工作线程数
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            error!("无法构建Tokio运行时：{}", e);
            process::exit(1);
        }
    };

    runtime.block_on(async {
        let server = match Server::bind(&config).await {
            Ok(s) => s,
            Err(e) => {
                error!("无法绑定端口：{}，错误：{}", config.port(), e);
                process::exit(1);
            }
        };
        info!("端口{}绑定完成", config.port());
        server.run().await;
    });
    info!("服务器已停止");
}

fn init_logging(path: &str) {
    if Path::new(path).exists() {
        match log4rs::init_file(path, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("无法从{}初始化日志：{}，使用控制台日志", path, e),
        }
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("无法初始化日志：{}", e);
            }
        }
        Err(e) => eprintln!("日志配置无效：{}", e),
    }
}
