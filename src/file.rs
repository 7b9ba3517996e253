// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 文件服务适配层
//!
//! 将 `/files/<name>` 中的文件名映射为配置根目录下的路径，并提供有界读取与整体写入。
//! 文件系统被抽象为 `FileStore` 能力（存在性检查、有界读取、整体写入），
//! 路由层只依赖该 trait，测试时可以替换为 mock 实现。

use crate::exception::Exception;

use log::debug;

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Write},
    path::{Component, Path, PathBuf},
};

/// 路由层所需的文件系统能力
#[cfg_attr(test, mockall::automock)]
pub trait FileStore: Send + Sync {
    /// 路径是否存在
    fn exists(&self, path: &Path) -> bool;

    /// 最多读取 `max_bytes` 字节，返回实际读到的内容
    fn read_up_to(&self, path: &Path, max_bytes: usize) -> io::Result<Vec<u8>>;

    /// 创建或覆盖文件并写入全部字节
    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// 基于本地磁盘的 `FileStore` 实现
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_up_to(&self, path: &Path, max_bytes: usize) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut contents = Vec::with_capacity(max_bytes.min(64 * 1024));
        // take 会持续读取直到达到上限或文件结束，避免一次 read 只读到部分数据
        file.take(max_bytes as u64).read_to_end(&mut contents)?;
        Ok(contents)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o777);
        }
        let mut file = options.open(path)?;
        file.write_all(bytes)?;
        file.flush()
    }
}

/// `/files/` 路由所服务的根目录
#[derive(Debug, Clone)]
pub struct FileDirectory {
    root: PathBuf,
}

impl FileDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 将请求中的文件名拼接到根目录下。
    ///
    /// 文件名必须是非空的相对路径，且只能由普通路径片段组成：
    /// `..`、绝对路径或盘符前缀都会返回 `Exception::InvalidPath`。
    pub fn resolve(&self, name: &str, id: u128) -> Result<PathBuf, Exception> {
        if name.is_empty() || name.contains('\0') {
            return Err(Exception::InvalidPath);
        }
        let relative = Path::new(name);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        let named = relative
            .components()
            .any(|c| matches!(c, Component::Normal(_)));
        if !confined || !named {
            debug!("[ID{}]拒绝越出根目录的文件名：{}", id, name);
            return Err(Exception::InvalidPath);
        }
        let path = self.root.join(relative);
        debug!("[ID{}]映射物理路径：{}", id, path.display());
        Ok(path)
    }
}

/// 检查根目录是否存在，不存在时尝试创建
pub fn ensure_root(root: &Path) -> io::Result<()> {
    if root.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(root)
}
