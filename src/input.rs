use std::time::Duration;

use clap::Parser;

use crate::api::SubdomainScanConfig;
use crate::handle::OutputMode;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "rsubrecurse")]
#[command(author = "gelenlen")]
#[command(version = "0.1")]
#[command(about = "A tool for recursively enumerating subdomains", long_about = None, arg_required_else_help = true)]
pub struct Opts {
    /// target domain
    #[arg(short, long)]
    pub domain: String,

    /// wordlist path
    #[arg(short, long, default_value = "wordlist.txt")]
    pub wordlist: String,

    /// number of concurrent workers
    #[arg(short, long, default_value_t = 20)]
    pub threads: usize,

    /// resolvers, use default dns on default
    #[arg(short, long)]
    pub resolvers: Vec<String>,

    /// dns query timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// grace period in milliseconds before a worker checks for completion
    #[arg(long, default_value_t = 10)]
    pub grace_ms: u64,

    /// max recursion depth (unlimited by default)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// skip wildcard detection
    #[arg(long)]
    pub no_wildcard: bool,

    /// only print found domains
    #[arg(short, long)]
    pub silent: bool,

    /// print each finding as a json line
    #[arg(short, long, conflicts_with = "silent")]
    pub json: bool,

    /// show summary statistics
    #[arg(long)]
    pub summary: bool,

    /// verbose logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Opts {
    /// 转换为扫描配置
    pub fn scan_config(&self) -> SubdomainScanConfig {
        SubdomainScanConfig {
            domain: self.domain.clone(),
            workers: self.threads,
            resolvers: self.resolvers.clone(),
            timeout_secs: self.timeout,
            grace_period: Duration::from_millis(self.grace_ms),
            wildcard_detection: !self.no_wildcard,
            max_depth: self.max_depth,
        }
    }

    /// 终端输出方式
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.silent {
            OutputMode::Plain
        } else {
            OutputMode::Table
        }
    }

    /// 日志级别
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
