use std::collections::BTreeSet;
use std::net::IpAddr;

use log::{debug, warn};
use rand::Rng;

use crate::dns_resolver::{Resolve, ResolutionOutcome};

/// 随机探测标签长度
pub const PROBE_LABEL_LEN: usize = 10;

const PROBE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 泛解析特征：随机域名解析出的地址集合，未检测到泛解析时为空
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardSignature {
    addrs: BTreeSet<IpAddr>,
}

impl WildcardSignature {
    /// 由地址集合构造
    pub fn new(addrs: BTreeSet<IpAddr>) -> Self {
        WildcardSignature { addrs }
    }

    /// 是否处于泛解析模式
    pub fn is_active(&self) -> bool {
        !self.addrs.is_empty()
    }

    /// 地址集合与特征完全相同（集合相等，不只是数量相同）
    pub fn matches(&self, addrs: &BTreeSet<IpAddr>) -> bool {
        self.is_active() && &self.addrs == addrs
    }

    /// 特征地址
    pub fn addrs(&self) -> &BTreeSet<IpAddr> {
        &self.addrs
    }
}

/// 泛解析检测器
///
/// 只探测根域名：某个子域名自带的泛解析不会被单独发现，
/// 其下递归出来的结果可能包含误报。
pub struct WildcardDetector<'a, R> {
    resolver: &'a R,
}

impl<'a, R: Resolve> WildcardDetector<'a, R> {
    /// 使用给定解析器创建检测器
    pub fn new(resolver: &'a R) -> Self {
        WildcardDetector { resolver }
    }

    /// 解析一个随机子域名，有结果则认为存在泛解析
    pub async fn detect(&self, domain: &str) -> WildcardSignature {
        let probe = format!("{}.{}", random_label(PROBE_LABEL_LEN), domain);
        debug!("泛解析探测: {}", probe);

        match self.resolver.resolve(&probe).await {
            ResolutionOutcome::Found(addrs) => {
                warn!(
                    "检测到泛解析记录: {} -> {}",
                    domain,
                    addrs.iter().map(|ip| ip.to_string()).collect::<Vec<_>>().join(",")
                );
                WildcardSignature::new(addrs)
            }
            ResolutionOutcome::NotFound => WildcardSignature::default(),
            ResolutionOutcome::Error(e) => {
                warn!("泛解析检测失败 {}: {}", domain, e);
                WildcardSignature::default()
            }
        }
    }
}

/// 生成随机标签
pub fn random_label(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| PROBE_ALPHABET[rng.gen_range(0..PROBE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn set(ips: &[[u8; 4]]) -> BTreeSet<IpAddr> {
        ips.iter()
            .map(|o| IpAddr::V4(Ipv4Addr::new(o[0], o[1], o[2], o[3])))
            .collect()
    }

    struct CatchAll(BTreeSet<IpAddr>);

    impl Resolve for CatchAll {
        async fn resolve(&self, _name: &str) -> ResolutionOutcome {
            ResolutionOutcome::from_addrs(self.0.iter().copied())
        }
    }

    struct Failing;

    impl Resolve for Failing {
        async fn resolve(&self, _name: &str) -> ResolutionOutcome {
            ResolutionOutcome::Error("SERVFAIL".to_string())
        }
    }

    #[test]
    fn test_random_label() {
        let label = random_label(PROBE_LABEL_LEN);
        assert_eq!(label.len(), 10);
        assert!(label.chars().all(|c| c.is_ascii_alphabetic()));
        assert_ne!(label, random_label(PROBE_LABEL_LEN));
    }

    #[test]
    fn test_signature_matches_set_equality() {
        let signature = WildcardSignature::new(set(&[[1, 2, 3, 4], [1, 2, 3, 5]]));
        assert!(signature.is_active());
        assert!(signature.matches(&set(&[[1, 2, 3, 5], [1, 2, 3, 4]])));
        // 数量相同但地址不同
        assert!(!signature.matches(&set(&[[1, 2, 3, 4], [5, 6, 7, 8]])));
        // 子集
        assert!(!signature.matches(&set(&[[1, 2, 3, 4]])));
    }

    #[test]
    fn test_inactive_signature_never_matches() {
        let signature = WildcardSignature::default();
        assert!(!signature.is_active());
        assert!(!signature.matches(&BTreeSet::new()));
        assert!(!signature.matches(&set(&[[1, 2, 3, 4]])));
    }

    #[tokio::test]
    async fn test_detect_wildcard() {
        let resolver = CatchAll(set(&[[1, 2, 3, 4]]));
        let signature = WildcardDetector::new(&resolver).detect("example.com").await;
        assert!(signature.matches(&set(&[[1, 2, 3, 4]])));

        let resolver = CatchAll(BTreeSet::new());
        let signature = WildcardDetector::new(&resolver).detect("example.com").await;
        assert!(!signature.is_active());
    }

    #[tokio::test]
    async fn test_detect_error_means_no_wildcard() {
        let signature = WildcardDetector::new(&Failing).detect("example.com").await;
        assert!(!signature.is_active());
    }
}
