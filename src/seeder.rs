use std::sync::Arc;

use log::debug;

use crate::coordinator::{ActiveGuard, Coordinator};
use crate::model::Candidate;
use crate::queue::WorkQueue;

/// 每入队多少个种子让出一次执行权
const SEED_YIELD_INTERVAL: usize = 1024;

/// 种子任务：把 `字典词.根域名` 放入队列
///
/// 构造时即登记为活跃，必须在工作者启动之前创建，
/// 否则工作者可能在种子写入前就判定为静默。
pub struct Seeder {
    queue: WorkQueue,
    wordlist: Arc<Vec<String>>,
    root: String,
    coordinator: Arc<Coordinator>,
    _active: ActiveGuard,
}

impl Seeder {
    /// 创建种子任务并登记为活跃
    pub fn new(
        queue: WorkQueue,
        wordlist: Arc<Vec<String>>,
        root: &str,
        coordinator: Arc<Coordinator>,
    ) -> Self {
        let active = coordinator.enter();
        Seeder {
            queue,
            wordlist,
            root: root.to_string(),
            coordinator,
            _active: active,
        }
    }

    /// 遍历一次字典，返回入队数量；结束时注销活跃状态
    pub async fn run(self) -> usize {
        let mut seeded = 0;
        for word in self.wordlist.iter() {
            if self.coordinator.is_cancelled() {
                break;
            }
            self.queue.enqueue(Candidate::seed(word, &self.root));
            seeded += 1;
            if seeded % SEED_YIELD_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
        }
        debug!("种子任务完成: {} 个候选", seeded);
        seeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::DEFAULT_GRACE_PERIOD;
    use std::sync::atomic::AtomicBool;

    fn coordinator() -> Arc<Coordinator> {
        Arc::new(Coordinator::new(
            1,
            DEFAULT_GRACE_PERIOD,
            Arc::new(AtomicBool::new(false)),
        ))
    }

    #[tokio::test]
    async fn test_seeder_registers_until_done() {
        let coordinator = coordinator();
        let queue = WorkQueue::new();
        let wordlist = Arc::new(vec!["www".to_string(), "api".to_string(), "www".to_string()]);

        let seeder = Seeder::new(queue.clone(), wordlist, "example.com", coordinator.clone());
        assert_eq!(coordinator.active(), 1);
        assert!(!coordinator.is_quiescent(&queue));

        assert_eq!(seeder.run().await, 3);
        assert_eq!(coordinator.active(), 0);

        // 重复词保留
        let names: Vec<_> = std::iter::from_fn(|| queue.try_claim())
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["www.example.com", "api.example.com", "www.example.com"]);
    }

    #[tokio::test]
    async fn test_empty_wordlist() {
        let coordinator = coordinator();
        let queue = WorkQueue::new();
        let seeder = Seeder::new(queue.clone(), Arc::new(Vec::new()), "example.com", coordinator.clone());
        assert_eq!(seeder.run().await, 0);
        assert!(coordinator.is_quiescent(&queue));
    }

    #[tokio::test]
    async fn test_cancelled_seeder_stops() {
        let coordinator = coordinator();
        coordinator.cancel();
        let queue = WorkQueue::new();
        let wordlist = Arc::new(vec!["www".to_string()]);
        let seeder = Seeder::new(queue.clone(), wordlist, "example.com", coordinator.clone());
        assert_eq!(seeder.run().await, 0);
        assert!(queue.is_empty());
        assert_eq!(coordinator.active(), 0);
    }
}
