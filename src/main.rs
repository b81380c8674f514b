//! # rice-scan：命令行入口
//!
//! 本文件仅负责日志初始化与参数解析，流程见 `cli` 模块。

use clap::Parser;
use rice_disease_detection::cli::{self, CliArgs};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    if let Err(err) = cli::run(args).await {
        log::error!("运行失败 [{}]: {}", err.code(), err);
        std::process::exit(1);
    }
}
