use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::param::{DEFAULT_FILE_READ_LIMIT, DEFAULT_PORT, DEFAULT_READ_BUFFER_SIZE};

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_directory")]
    directory: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    local: bool,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_read_buffer_size")]
    read_buffer_size: usize,
    #[serde(default = "default_file_read_limit")]
    file_read_limit: usize,
    // 0 表示不限制并发连接数
    #[serde(default)]
    max_connections: usize,
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_file_read_limit() -> usize {
    DEFAULT_FILE_READ_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            directory: default_directory(),
            port: default_port(),
            local: false,
            worker_threads: 0,
            read_buffer_size: default_read_buffer_size(),
            file_read_limit: default_file_read_limit(),
            max_connections: 0,
        }
        .normalized()
    }

    /// 从 TOML 文件载入配置。
    ///
    /// 文件不存在时使用默认配置；文件内容非法时记录错误并使用默认配置。
    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                warn!("无法打开配置文件{}：{}，使用默认配置", filename, e);
                return Config::new();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("读取配置文件{}失败：{}，使用默认配置", filename, e);
            return Config::new();
        }
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(content: &str) -> Self {
        let raw_config: Config = match toml::from_str(content) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        raw_config.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }
        if self.read_buffer_size == 0 {
            warn!("read_buffer_size被设置为0，该值将被改为{}。", DEFAULT_READ_BUFFER_SIZE);
            self.read_buffer_size = DEFAULT_READ_BUFFER_SIZE;
        }
        if self.file_read_limit == 0 {
            warn!("file_read_limit被设置为0，该值将被改为{}。", DEFAULT_FILE_READ_LIMIT);
            self.file_read_limit = DEFAULT_FILE_READ_LIMIT;
        }
        self
    }

    /// 使用命令行参数覆盖配置文件中的值
    pub fn override_with(&mut self, directory: Option<String>, port: Option<u16>) {
        if let Some(directory) = directory {
            self.directory = directory;
        }
        if let Some(port) = port {
            self.port = port;
        }
    }
}

impl Config {
    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn file_read_limit(&self) -> usize {
        self.file_read_limit
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}
