//! 候选域名工作队列
//!
//! 无界的多生产者/多消费者FIFO队列。种子任务和所有工作者共享同一个队列，
//! 取出操作是非阻塞的：队列为空时立即返回，工作者不能阻塞等待新条目，
//! 否则"队列暂时为空但还有生产者"与"真正完成"将无法区分。

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::model::Candidate;

/// 队列统计
#[derive(Debug, Default)]
pub struct QueueStats {
    /// 入队总数
    pub enqueued: AtomicU64,
    /// 被取走的总数
    pub claimed: AtomicU64,
}

impl QueueStats {
    /// 入队总数
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// 被取走的总数
    pub fn claimed(&self) -> u64 {
        self.claimed.load(Ordering::Relaxed)
    }
}

/// 共享工作队列
///
/// 每个克隆同时持有发送端和接收端，所以通道永远不会断开。
#[derive(Clone)]
pub struct WorkQueue {
    sender: Sender<Candidate>,
    receiver: Receiver<Candidate>,
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// 创建空队列
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        WorkQueue {
            sender,
            receiver,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// 追加到队尾，不会失败
    pub fn enqueue(&self, candidate: Candidate) {
        // 先计数，保证任意时刻 claimed <= enqueued
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        // 接收端由队列自身持有，send 只会在断开时失败
        let _ = self.sender.send(candidate);
    }

    /// 非阻塞取出队头，队列为空时返回 None
    pub fn try_claim(&self) -> Option<Candidate> {
        match self.receiver.try_recv() {
            Ok(candidate) => {
                self.stats.claimed.fetch_add(1, Ordering::Relaxed);
                Some(candidate)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// 当前队列长度
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// 队列统计
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
