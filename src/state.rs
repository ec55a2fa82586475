//! 线程安全的状态管理模块
//!
//! 每次扫描都有自己独立的结果收集器，替代全局静态变量。

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::handle::{DiscoveredDomain, FindingSink};

/// 扫描结果收集器
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// 发现的域名列表
    pub discovered_domains: Arc<Mutex<Vec<DiscoveredDomain>>>,
}

impl ScanState {
    /// 创建新的状态管理器
    pub fn new() -> Self {
        ScanState {
            discovered_domains: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 添加发现的域名
    pub fn add_discovered_domain(&self, domain: DiscoveredDomain) {
        if let Ok(mut domains) = self.discovered_domains.lock() {
            domains.push(domain);
        }
    }

    /// 获取发现的域名列表
    pub fn get_discovered_domains(&self) -> Vec<DiscoveredDomain> {
        if let Ok(domains) = self.discovered_domains.lock() {
            domains.clone()
        } else {
            Vec::new()
        }
    }

    /// 发现数量
    pub fn len(&self) -> usize {
        self.discovered_domains.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// 是否还没有发现
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空发现的域名列表
    pub fn clear_discovered_domains(&self) {
        if let Ok(mut domains) = self.discovered_domains.lock() {
            domains.clear();
        }
    }
}

impl FindingSink for ScanState {
    fn report(&self, finding: DiscoveredDomain) {
        self.add_discovered_domain(finding);
    }
}

/// 扫描统计，由各工作者的计数汇总而来
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// 入队的候选总数
    pub enqueued: u64,
    /// 被取走解析的候选总数
    pub claimed: u64,
    /// 真实发现
    pub genuine: u64,
    /// 命中泛解析被过滤
    pub wildcard_suppressed: u64,
    /// 不存在
    pub not_found: u64,
    /// 解析出错（按不存在处理）
    pub resolve_errors: u64,
    /// 派生出的候选数
    pub derived: u64,
    /// 工作者空闲检查次数
    pub idle_checks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn domain(i: usize) -> DiscoveredDomain {
        DiscoveredDomain {
            domain: format!("test{}.example.com", i),
            ips: vec![format!("192.168.1.{}", i)],
            depth: 1,
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    #[test]
    fn test_thread_safety() {
        let state = ScanState::new();
        let mut handles = vec![];

        // 启动多个线程同时写入
        for i in 0..10 {
            let state_clone = state.clone();
            handles.push(thread::spawn(move || {
                state_clone.report(domain(i));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.get_discovered_domains().len(), 10);
        assert_eq!(state.len(), 10);
    }

    #[test]
    fn test_state_isolation() {
        let state1 = ScanState::new();
        let state2 = ScanState::new();

        state1.add_discovered_domain(domain(1));
        state2.add_discovered_domain(domain(2));

        assert_eq!(state1.len(), 1);
        assert_eq!(state2.len(), 1);
        assert_ne!(
            state1.get_discovered_domains()[0].domain,
            state2.get_discovered_domains()[0].domain
        );

        state1.clear_discovered_domains();
        assert!(state1.is_empty());
        assert!(!state2.is_empty());
    }
}
