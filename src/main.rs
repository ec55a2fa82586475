use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use log::warn;
use rsubrecurse::handle::{print_summary, ConsoleSink};
use rsubrecurse::input::Opts;
use rsubrecurse::logger::init_logger;
use rsubrecurse::state::ScanState;
use rsubrecurse::wordlist::load_wordlist;
use rsubrecurse::SubdomainScanEngine;

#[tokio::main]
async fn main() {
    let opts = Opts::parse();

    if let Err(e) = init_logger(opts.log_level()) {
        eprintln!("日志初始化失败: {}", e);
    }

    // 执行子域名枚举
    if let Err(e) = run_subdomain_scan(opts).await {
        eprintln!("子域名枚举失败: {}", e);
        std::process::exit(1);
    }
}

/// 枚举主逻辑
async fn run_subdomain_scan(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    // 配置和字典错误都在扫描开始前返回
    let engine = SubdomainScanEngine::new(opts.scan_config())?;
    let wordlist = load_wordlist(&opts.wordlist)?;

    // Ctrl-C 取消
    let shutdown = engine.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在停止...");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    let state = ScanState::new();
    let sink = Arc::new(ConsoleSink::new(opts.output_mode(), state.clone()));
    let report = engine.run_with_sink(wordlist, sink).await?;

    if !report.completed {
        warn!("扫描被中断，结果不完整");
    }

    if opts.summary {
        print_summary(&state.get_discovered_domains(), &report.stats);
    }

    Ok(())
}
