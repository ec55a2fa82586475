use std::collections::BTreeSet;
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

use crate::error::{Result, ScanError};

/// 单个域名的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// 解析成功，地址集合非空
    Found(BTreeSet<IpAddr>),
    /// 域名不存在或没有地址记录
    NotFound,
    /// 解析失败（超时、SERVFAIL等）
    Error(String),
}

impl ResolutionOutcome {
    /// 由地址列表构造结果，空列表视为不存在
    pub fn from_addrs<I: IntoIterator<Item = IpAddr>>(addrs: I) -> Self {
        let addrs: BTreeSet<IpAddr> = addrs.into_iter().collect();
        if addrs.is_empty() {
            ResolutionOutcome::NotFound
        } else {
            ResolutionOutcome::Found(addrs)
        }
    }
}

/// 域名解析能力
///
/// 多个工作者会并发调用，实现之间不能共享可变状态。
pub trait Resolve: Send + Sync + 'static {
    /// 解析域名的地址记录
    fn resolve(&self, name: &str) -> impl Future<Output = ResolutionOutcome> + Send;
}

/// 基于 trust-dns 的DNS解析器
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    /// 创建解析器，`nameservers` 为空时使用系统DNS配置
    pub fn new(nameservers: &[String], timeout: Duration) -> Result<Self> {
        let (config, mut opts) = if nameservers.is_empty() {
            read_system_conf().map_err(|e| ScanError::Resolver(e.to_string()))?
        } else {
            let ips = parse_nameservers(nameservers)?;
            let config = ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(&ips, 53, true),
            );
            (config, ResolverOpts::default())
        };
        opts.timeout = timeout;

        let resolver = TokioAsyncResolver::tokio(config, opts);
        Ok(DnsResolver { resolver })
    }
}

impl Resolve for DnsResolver {
    async fn resolve(&self, name: &str) -> ResolutionOutcome {
        // 以根结尾，避免系统搜索域被拼接到候选域名后面
        let fqdn = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{}.", name)
        };

        match self.resolver.lookup_ip(fqdn.as_str()).await {
            Ok(response) => ResolutionOutcome::from_addrs(response.iter()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => ResolutionOutcome::NotFound,
                _ => ResolutionOutcome::Error(e.to_string()),
            },
        }
    }
}

/// 解析DNS服务器地址列表
fn parse_nameservers(nameservers: &[String]) -> Result<Vec<IpAddr>> {
    nameservers
        .iter()
        .map(|s| {
            s.trim()
                .parse::<IpAddr>()
                .map_err(|_| ScanError::Config(format!("无效的DNS服务器地址: {}", s)))
        })
        .collect()
}
