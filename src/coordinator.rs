//! 静默检测
//!
//! 工作者既消费队列又向队列生产，某个工作者看到队列为空时，
//! 兄弟工作者可能正握着一个候选域名、马上就要写入一批新候选。
//! `Coordinator` 记录当前活跃的执行者数量（工作者 + 种子任务），
//! 只有在同一把锁下同时观察到"活跃数为0且队列为空"时才允许工作者退出。
//!
//! 工作者在取出任何候选之前先登记为活跃，手里的候选处理完才注销，
//! 所以一个候选要么在队列里，要么在某个活跃执行者手里。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::queue::WorkQueue;

/// 默认宽限期：注销后等待多久再做静默检查
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(10);

/// 活跃计数与退出判定
#[derive(Debug)]
pub struct Coordinator {
    active: Mutex<usize>,
    /// 工作者数量 + 1（种子任务）
    capacity: usize,
    grace_period: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Coordinator {
    /// 为 `workers` 个工作者创建协调器
    pub fn new(workers: usize, grace_period: Duration, shutdown: Arc<AtomicBool>) -> Self {
        Coordinator {
            active: Mutex::new(0),
            capacity: workers + 1,
            grace_period,
            shutdown,
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // 计数器只做加减，中毒后数据仍然有效
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 登记为活跃
    pub fn register(&self) {
        let mut active = self.lock();
        *active += 1;
        debug_assert!(*active <= self.capacity, "活跃数超过执行者总数");
    }

    /// 注销活跃状态
    pub fn deregister(&self) {
        let mut active = self.lock();
        debug_assert!(*active > 0, "注销次数多于登记次数");
        *active = active.saturating_sub(1);
    }

    /// 登记并返回守卫，守卫析构时自动注销
    pub fn enter(self: &Arc<Self>) -> ActiveGuard {
        self.register();
        ActiveGuard {
            coordinator: Arc::clone(self),
        }
    }

    /// 当前活跃数
    pub fn active(&self) -> usize {
        *self.lock()
    }

    /// 在计数锁内判断是否已全局静默：活跃数为0且队列为空
    pub fn is_quiescent(&self, queue: &WorkQueue) -> bool {
        let active = self.lock();
        *active == 0 && queue.is_empty()
    }

    /// 注销后的宽限等待，给正在解析的兄弟工作者重新登记或补充队列的机会
    pub async fn pause(&self) {
        tokio::time::sleep(self.grace_period).await;
    }

    /// 是否收到取消信号
    pub fn is_cancelled(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// 发出取消信号
    pub fn cancel(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// 活跃登记守卫
#[derive(Debug)]
pub struct ActiveGuard {
    coordinator: Arc<Coordinator>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.coordinator.deregister();
    }
}
