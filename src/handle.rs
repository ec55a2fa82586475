use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Once;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::state::{ScanState, ScanStats};

/// 发现的域名结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDomain {
    /// 完整域名
    pub domain: String,
    /// 解析到的地址，已排序
    pub ips: Vec<String>,
    /// 层级，根域名下第一层为1
    pub depth: usize,
    /// 发现时间（unix秒）
    pub timestamp: u64,
}

/// 真实发现的接收端
///
/// 只追加，不保证顺序；多个工作者会并发调用。
pub trait FindingSink: Send + Sync + 'static {
    /// 上报一个真实发现
    fn report(&self, finding: DiscoveredDomain);
}

/// 终端输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 表格
    Table,
    /// 每行一个域名
    Plain,
    /// 每行一个JSON对象
    Json,
}

/// 实时打印发现并收集到 `ScanState`
pub struct ConsoleSink {
    mode: OutputMode,
    state: ScanState,
    header: Once,
}

impl ConsoleSink {
    /// 创建终端输出
    pub fn new(mode: OutputMode, state: ScanState) -> Self {
        ConsoleSink {
            mode,
            state,
            header: Once::new(),
        }
    }

    /// 收集到的结果
    pub fn state(&self) -> &ScanState {
        &self.state
    }
}

impl FindingSink for ConsoleSink {
    fn report(&self, finding: DiscoveredDomain) {
        match self.mode {
            OutputMode::Plain => println!("{}", finding.domain),
            OutputMode::Json => match serde_json::to_string(&finding) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("结果序列化失败 {}: {}", finding.domain, e),
            },
            OutputMode::Table => {
                self.header.call_once(|| {
                    println!("\n{:<40} {:<40} {:<6} {:<10}", "域名", "IP地址", "层级", "时间");
                    println!("{}", "-".repeat(100));
                });
                println!(
                    "{} {:<40} {:<6} {}",
                    format!("{:<40}", finding.domain).green(),
                    finding.ips.join(","),
                    finding.depth,
                    chrono::DateTime::from_timestamp(finding.timestamp as i64, 0)
                        .unwrap_or_default()
                        .format("%H:%M:%S")
                );
            }
        }
        self.state.add_discovered_domain(finding);
    }
}

/// 汇总统计信息
#[derive(Debug, Clone, Default)]
pub struct SummaryStats {
    /// 发现域名总数
    pub total_domains: usize,
    /// 唯一IP
    pub unique_ips: HashSet<String>,
    /// /24 网段分布
    pub ip_ranges: HashMap<String, Vec<String>>,
    /// 各层级的发现数量
    pub depth_counts: BTreeMap<usize, usize>,
}

/// 生成汇总统计
pub fn generate_summary(discovered: &[DiscoveredDomain]) -> SummaryStats {
    let mut summary = SummaryStats {
        total_domains: discovered.len(),
        ..Default::default()
    };

    for domain in discovered {
        for ip in &domain.ips {
            if let Ok(addr) = ip.parse::<IpAddr>() {
                if !summary.unique_ips.insert(ip.clone()) {
                    continue;
                }
                if let IpAddr::V4(ipv4) = addr {
                    let octets = ipv4.octets();
                    let range = format!("{}.{}.{}.0/24", octets[0], octets[1], octets[2]);
                    summary.ip_ranges.entry(range).or_default().push(ip.clone());
                }
            }
        }
        *summary.depth_counts.entry(domain.depth).or_insert(0) += 1;
    }

    summary
}

/// 打印汇总信息
pub fn print_summary(discovered: &[DiscoveredDomain], stats: &ScanStats) {
    let summary = generate_summary(discovered);

    println!("\n{}", "=".repeat(60));
    println!("                    汇总统计");
    println!("{}", "=".repeat(60));

    println!("发现域名总数: {}", summary.total_domains);
    println!("唯一IP数量: {}", summary.unique_ips.len());
    println!("解析候选数: {}", stats.claimed);
    println!("泛解析过滤: {}", stats.wildcard_suppressed);
    println!("不存在: {}", stats.not_found);
    println!("解析失败: {}", stats.resolve_errors);

    println!("\n层级分布:");
    for (depth, count) in &summary.depth_counts {
        println!("  {}: {}", depth, count);
    }

    println!("\nIP段分布 (前10个):");
    let mut sorted_ranges: Vec<_> = summary.ip_ranges.iter().collect();
    sorted_ranges.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(b.0)));
    for (range, ips) in sorted_ranges.iter().take(10) {
        println!("  {}: {} 个IP", range, ips.len());
    }

    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(domain: &str, ips: &[&str], depth: usize) -> DiscoveredDomain {
        DiscoveredDomain {
            domain: domain.to_string(),
            ips: ips.iter().map(|s| s.to_string()).collect(),
            depth,
            timestamp: 0,
        }
    }

    #[test]
    fn test_generate_summary() {
        let discovered = vec![
            found("www.example.com", &["10.0.0.1", "10.0.0.2"], 1),
            found("api.example.com", &["10.0.0.1"], 1),
            found("dev.api.example.com", &["10.0.1.7", "::1"], 2),
        ];

        let summary = generate_summary(&discovered);
        assert_eq!(summary.total_domains, 3);
        assert_eq!(summary.unique_ips.len(), 4);
        assert_eq!(summary.ip_ranges["10.0.0.0/24"].len(), 2);
        assert_eq!(summary.ip_ranges["10.0.1.0/24"].len(), 1);
        assert_eq!(summary.depth_counts[&1], 2);
        assert_eq!(summary.depth_counts[&2], 1);
    }

    #[test]
    fn test_console_sink_collects() {
        let state = ScanState::new();
        let sink = ConsoleSink::new(OutputMode::Plain, state.clone());
        sink.report(found("www.example.com", &["9.9.9.9"], 1));
        assert_eq!(state.len(), 1);
        assert_eq!(sink.state().get_discovered_domains()[0].domain, "www.example.com");
    }

    #[test]
    fn test_json_line_shape() {
        let line = serde_json::to_string(&found("www.example.com", &["9.9.9.9"], 1)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["domain"], "www.example.com");
        assert_eq!(value["ips"][0], "9.9.9.9");
        assert_eq!(value["depth"], 1);
    }
}
