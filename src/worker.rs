//! 工作者
//!
//! 每个工作者循环执行：
//! - 登记为活跃
//! - 非阻塞地从队列取候选并解析，直到取空
//! - 真实发现上报给接收端，并把 `字典词.发现` 全部放回队列
//! - 注销，等待宽限期，做静默检查，决定退出还是再来一轮

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::coordinator::Coordinator;
use crate::dns_resolver::{Resolve, ResolutionOutcome};
use crate::handle::{DiscoveredDomain, FindingSink};
use crate::model::Candidate;
use crate::queue::WorkQueue;
use crate::state::ScanStats;
use crate::wildcard::WildcardSignature;

/// 所有工作者共享的上下文
pub struct WorkerContext<R, S> {
    /// 解析器
    pub resolver: Arc<R>,
    /// 真实发现的接收端
    pub sink: Arc<S>,
    /// 工作队列
    pub queue: WorkQueue,
    /// 静默检测
    pub coordinator: Arc<Coordinator>,
    /// 字典
    pub wordlist: Arc<Vec<String>>,
    /// 泛解析特征
    pub signature: WildcardSignature,
    /// 最大层级，达到后不再派生
    pub max_depth: Option<usize>,
}

/// 单个候选的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// 真实发现，派生了 `derived` 个新候选
    Emitted { derived: usize },
    /// 与泛解析特征相同，被过滤
    Suppressed,
    /// 不存在
    NotFound,
    /// 解析出错，按不存在丢弃
    Failed(String),
}

/// 工作者统计
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// 取走的候选数
    pub claimed: AtomicU64,
    /// 真实发现
    pub genuine: AtomicU64,
    /// 泛解析过滤
    pub wildcard_suppressed: AtomicU64,
    /// 不存在
    pub not_found: AtomicU64,
    /// 解析出错
    pub resolve_errors: AtomicU64,
    /// 派生的候选数
    pub derived: AtomicU64,
    /// 空闲检查次数
    pub idle_checks: AtomicU64,
}

impl WorkerStats {
    fn record(&self, disposition: &Disposition) {
        self.claimed.fetch_add(1, Ordering::Relaxed);
        match disposition {
            Disposition::Emitted { derived } => {
                self.genuine.fetch_add(1, Ordering::Relaxed);
                self.derived.fetch_add(*derived as u64, Ordering::Relaxed);
            }
            Disposition::Suppressed => {
                self.wildcard_suppressed.fetch_add(1, Ordering::Relaxed);
            }
            Disposition::NotFound => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
            }
            Disposition::Failed(_) => {
                self.resolve_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_idle_check(&self) {
        self.idle_checks.fetch_add(1, Ordering::Relaxed);
    }
}

/// 汇总所有工作者的统计
pub fn aggregate_stats(stats: &[Arc<WorkerStats>], queue: &WorkQueue) -> ScanStats {
    let queue_stats = queue.stats();
    let mut total = ScanStats {
        enqueued: queue_stats.enqueued(),
        ..Default::default()
    };
    for s in stats {
        total.claimed += s.claimed.load(Ordering::Relaxed);
        total.genuine += s.genuine.load(Ordering::Relaxed);
        total.wildcard_suppressed += s.wildcard_suppressed.load(Ordering::Relaxed);
        total.not_found += s.not_found.load(Ordering::Relaxed);
        total.resolve_errors += s.resolve_errors.load(Ordering::Relaxed);
        total.derived += s.derived.load(Ordering::Relaxed);
        total.idle_checks += s.idle_checks.load(Ordering::Relaxed);
    }
    total
}

/// 工作者
pub struct Worker<R, S> {
    id: usize,
    ctx: Arc<WorkerContext<R, S>>,
    stats: Arc<WorkerStats>,
}

impl<R: Resolve, S: FindingSink> Worker<R, S> {
    /// 创建工作者
    pub fn new(id: usize, ctx: Arc<WorkerContext<R, S>>) -> Self {
        Worker {
            id,
            ctx,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    /// 统计，工作者退出后仍可读取
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// 主循环，直到全局静默或收到取消信号才返回
    pub async fn run(self) {
        trace!("工作者 {} 启动", self.id);
        let coordinator = &self.ctx.coordinator;

        while !coordinator.is_cancelled() {
            {
                let _active = coordinator.enter();
                while !coordinator.is_cancelled() {
                    let Some(candidate) = self.ctx.queue.try_claim() else {
                        break;
                    };
                    let disposition = self.process(candidate).await;
                    self.stats.record(&disposition);
                }
            }

            coordinator.pause().await;
            self.stats.record_idle_check();
            if coordinator.is_quiescent(&self.ctx.queue) {
                break;
            }
        }

        debug!(
            "工作者 {} 退出: 解析 {} 个, 发现 {} 个",
            self.id,
            self.stats.claimed.load(Ordering::Relaxed),
            self.stats.genuine.load(Ordering::Relaxed)
        );
    }

    /// 解析一个候选并按结果分类处理
    pub async fn process(&self, candidate: Candidate) -> Disposition {
        match self.ctx.resolver.resolve(candidate.name()).await {
            ResolutionOutcome::Error(reason) => {
                debug!("解析失败 {}: {}", candidate, reason);
                Disposition::Failed(reason)
            }
            ResolutionOutcome::NotFound => Disposition::NotFound,
            ResolutionOutcome::Found(addrs) if self.ctx.signature.matches(&addrs) => {
                trace!("泛解析过滤: {}", candidate);
                Disposition::Suppressed
            }
            ResolutionOutcome::Found(addrs) => {
                self.ctx.sink.report(DiscoveredDomain {
                    domain: candidate.name().to_string(),
                    ips: addrs.iter().map(|ip| ip.to_string()).collect(),
                    depth: candidate.depth(),
                    timestamp: chrono::Utc::now().timestamp() as u64,
                });
                let derived = self.fan_out(&candidate);
                Disposition::Emitted { derived }
            }
        }
    }

    /// 以发现的域名为后缀，把每个字典词都放回队列
    fn fan_out(&self, candidate: &Candidate) -> usize {
        if let Some(max_depth) = self.ctx.max_depth {
            if candidate.depth() >= max_depth {
                return 0;
            }
        }
        for word in self.ctx.wordlist.iter() {
            self.ctx.queue.enqueue(candidate.child(word));
        }
        self.ctx.wordlist.len()
    }
}
