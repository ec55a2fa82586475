use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info};
use tokio::task::JoinSet;

use crate::coordinator::{Coordinator, DEFAULT_GRACE_PERIOD};
use crate::dns_resolver::{DnsResolver, Resolve};
use crate::error::{Result, ScanError};
use crate::handle::{DiscoveredDomain, FindingSink};
use crate::queue::WorkQueue;
use crate::seeder::Seeder;
use crate::state::{ScanState, ScanStats};
use crate::wildcard::{WildcardDetector, WildcardSignature};
use crate::wordlist::load_wordlist;
use crate::worker::{aggregate_stats, Worker, WorkerContext};

/// 子域名扫描配置
#[derive(Debug, Clone)]
pub struct SubdomainScanConfig {
    /// 目标根域名
    pub domain: String,
    /// 并发工作者数量，至少为1
    pub workers: usize,
    /// DNS服务器列表，为空时使用默认服务器
    pub resolvers: Vec<String>,
    /// 单次查询超时（秒）
    pub timeout_secs: u64,
    /// 工作者注销后到静默检查之间的等待时间
    pub grace_period: Duration,
    /// 是否检测泛解析
    pub wildcard_detection: bool,
    /// 最大层级，None 表示不限制
    pub max_depth: Option<usize>,
}

impl Default for SubdomainScanConfig {
    fn default() -> Self {
        SubdomainScanConfig {
            domain: String::new(),
            workers: 20,
            resolvers: Vec::new(),
            timeout_secs: 5,
            grace_period: DEFAULT_GRACE_PERIOD,
            wildcard_detection: true,
            max_depth: None,
        }
    }
}

impl SubdomainScanConfig {
    /// 校验配置并返回规范化后的根域名
    pub fn validate(&self) -> Result<String> {
        let root = self.domain.trim().trim_matches('.').to_lowercase();
        if root.is_empty() {
            return Err(ScanError::Config("必须指定目标域名".to_string()));
        }
        if self.workers == 0 {
            return Err(ScanError::Config("工作者数量必须大于0".to_string()));
        }
        if self.max_depth == Some(0) {
            return Err(ScanError::Config("最大层级必须大于0".to_string()));
        }
        Ok(root)
    }
}

/// 一次扫描的结果统计
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// 根域名
    pub root: String,
    /// 泛解析特征，未检测到时为空
    pub wildcard: WildcardSignature,
    /// 种子任务入队数量
    pub seeded: usize,
    /// 汇总统计
    pub stats: ScanStats,
    /// 耗时
    pub duration: Duration,
    /// 是否自然结束（被取消时为 false）
    pub completed: bool,
}

/// 子域名扫描引擎
pub struct SubdomainScanEngine<R = DnsResolver> {
    config: SubdomainScanConfig,
    root: String,
    resolver: Arc<R>,
    shutdown: Arc<AtomicBool>,
}

impl SubdomainScanEngine<DnsResolver> {
    /// 使用 trust-dns 解析器创建引擎
    pub fn new(config: SubdomainScanConfig) -> Result<Self> {
        config.validate()?;
        let resolver = DnsResolver::new(&config.resolvers, Duration::from_secs(config.timeout_secs))?;
        Self::with_resolver(config, resolver)
    }
}

impl<R: Resolve> SubdomainScanEngine<R> {
    /// 使用自定义解析器创建引擎
    pub fn with_resolver(config: SubdomainScanConfig, resolver: R) -> Result<Self> {
        let root = config.validate()?;
        Ok(SubdomainScanEngine {
            config,
            root,
            resolver: Arc::new(resolver),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// 规范化后的根域名
    pub fn root(&self) -> &str {
        &self.root
    }

    /// 取消标志，置位后工作者在下一次取候选前退出；每次运行开始时复位
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// 对根域名做一次泛解析探测
    pub async fn detect_wildcard(&self) -> WildcardSignature {
        if !self.config.wildcard_detection {
            return WildcardSignature::default();
        }
        WildcardDetector::new(self.resolver.as_ref())
            .detect(&self.root)
            .await
    }

    /// 执行扫描，真实发现实时上报给 `sink`
    ///
    /// 工作者归属于这次调用：返回的 future 被丢弃时，全部工作者随之中止。
    pub async fn run_with_sink<S: FindingSink>(
        &self,
        wordlist: Vec<String>,
        sink: Arc<S>,
    ) -> Result<ScanReport> {
        let start_time = Instant::now();
        // 上一次运行留下的取消信号不影响本次
        self.shutdown.store(false, Ordering::SeqCst);
        let wildcard = self.detect_wildcard().await;

        let queue = WorkQueue::new();
        let coordinator = Arc::new(Coordinator::new(
            self.config.workers,
            self.config.grace_period,
            Arc::clone(&self.shutdown),
        ));
        let wordlist = Arc::new(wordlist);

        info!(
            "开始扫描 {}: {} 个字典词, {} 个工作者",
            self.root,
            wordlist.len(),
            self.config.workers
        );

        // 种子任务必须在工作者启动前登记
        let seeder = Seeder::new(
            queue.clone(),
            Arc::clone(&wordlist),
            &self.root,
            Arc::clone(&coordinator),
        );

        let ctx = Arc::new(WorkerContext {
            resolver: Arc::clone(&self.resolver),
            sink,
            queue: queue.clone(),
            coordinator: Arc::clone(&coordinator),
            wordlist,
            signature: wildcard.clone(),
            max_depth: self.config.max_depth,
        });

        let mut workers = JoinSet::new();
        let mut task_ids = HashMap::with_capacity(self.config.workers);
        let mut worker_stats = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let worker = Worker::new(id, Arc::clone(&ctx));
            worker_stats.push(worker.stats());
            let handle = workers.spawn(worker.run());
            task_ids.insert(handle.id(), id);
        }

        let seeded = seeder.run().await;

        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                let id = task_ids.get(&e.id()).copied().unwrap_or_default();
                error!("工作者 {} 异常退出: {}", id, e);
                failure.get_or_insert(ScanError::Worker {
                    id,
                    reason: e.to_string(),
                });
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let completed = !coordinator.is_cancelled();
        debug_assert!(!completed || (queue.is_empty() && coordinator.active() == 0));

        let stats = aggregate_stats(&worker_stats, &queue);
        let duration = start_time.elapsed();
        info!(
            "扫描结束 {}: 解析 {} 个候选, 发现 {} 个, 耗时 {:.2}s",
            self.root,
            stats.claimed,
            stats.genuine,
            duration.as_secs_f64()
        );

        Ok(ScanReport {
            root: self.root.clone(),
            wildcard,
            seeded,
            stats,
            duration,
            completed,
        })
    }

    /// 执行扫描并收集全部发现
    pub async fn run(&self, wordlist: Vec<String>) -> Result<(Vec<DiscoveredDomain>, ScanReport)> {
        let state = ScanState::new();
        let report = self.run_with_sink(wordlist, Arc::new(state.clone())).await?;
        Ok((state.get_discovered_domains(), report))
    }

    /// 请求取消正在进行的扫描
    pub fn cancel(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// 便捷的扫描函数
pub async fn scan_subdomains<P: AsRef<Path>>(
    domain: &str,
    wordlist_file: P,
) -> Result<Vec<DiscoveredDomain>> {
    let config = SubdomainScanConfig {
        domain: domain.to_string(),
        ..Default::default()
    };
    let wordlist = load_wordlist(wordlist_file)?;
    let engine = SubdomainScanEngine::new(config)?;
    let (findings, _) = engine.run(wordlist).await?;
    Ok(findings)
}
