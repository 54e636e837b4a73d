//! rangedown: 按 Range 分段顺序下载大文件
//!
//! 流程：探测服务器是否支持 Range → 逐块下载到临时文件（共享重试次数）→ 按偏移顺序合并。

pub mod cli;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;
