//! # rsubrecurse
//!
//! 一个基于Rust实现的递归子域名枚举工具库。
//!
//! ## 特性
//!
//! - 🔁 **递归发现**: 每个发现的子域名都会再次与字典组合，继续向下枚举
//! - 🚀 **并发解析**: 固定数量的工作者共享同一个无界队列
//! - 🛑 **自动结束**: 无中心调度，活跃计数为0且队列为空时全部工作者退出
//! - 🌐 **泛解析过滤**: 扫描前探测根域名，过滤与泛解析结果完全相同的记录
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use rsubrecurse::scan_subdomains;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let results = scan_subdomains("example.com", "wordlist.txt").await?;
//!
//!     println!("发现 {} 个子域名", results.len());
//!     for result in results.iter().take(5) {
//!         println!("  {} -> {}", result.domain, result.ips.join(","));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 高级配置
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rsubrecurse::{ConsoleSink, OutputMode, ScanState, SubdomainScanConfig, SubdomainScanEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SubdomainScanConfig {
//!         domain: "example.com".to_string(),
//!         workers: 50,
//!         resolvers: vec!["1.1.1.1".to_string()],
//!         max_depth: Some(3),
//!         ..Default::default()
//!     };
//!
//!     let engine = SubdomainScanEngine::new(config)?;
//!     let sink = Arc::new(ConsoleSink::new(OutputMode::Plain, ScanState::new()));
//!     let words = vec!["www".to_string(), "api".to_string()];
//!     let report = engine.run_with_sink(words, sink).await?;
//!
//!     println!("共解析 {} 个候选", report.stats.claimed);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod coordinator;
pub mod dns_resolver;
pub mod error;
pub mod handle;
pub mod input;
pub mod logger;
pub mod model;
pub mod queue;
pub mod seeder;
pub mod state;
pub mod wildcard;
pub mod wordlist;
pub mod worker;

// 重新导出主要的公共API
pub use api::{scan_subdomains, ScanReport, SubdomainScanConfig, SubdomainScanEngine};

// 导出其他有用的类型
pub use coordinator::{Coordinator, DEFAULT_GRACE_PERIOD};
pub use dns_resolver::{DnsResolver, Resolve, ResolutionOutcome};
pub use error::{Result, ScanError};
pub use handle::{ConsoleSink, DiscoveredDomain, FindingSink, OutputMode};
pub use model::Candidate;
pub use queue::WorkQueue;
pub use state::{ScanState, ScanStats};
pub use wildcard::{WildcardDetector, WildcardSignature};
pub use wordlist::load_wordlist;
