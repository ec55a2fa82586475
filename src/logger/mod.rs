use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::sync::Mutex;

/// 输出到标准错误的彩色日志，标准输出只留给扫描结果
pub struct Logger {
    use_colors: bool,
    max_level: LevelFilter,
    labels: HashMap<Level, &'static str>,
    mutex: Mutex<()>,
}

impl Logger {
    /// 创建日志器
    pub fn new(max_level: LevelFilter) -> Self {
        let mut labels = HashMap::new();
        labels.insert(Level::Error, "Error");
        labels.insert(Level::Warn, "Warning");
        labels.insert(Level::Info, "INFO");
        labels.insert(Level::Debug, "DEBUG");
        labels.insert(Level::Trace, "TRACE");

        Logger {
            use_colors: std::io::stderr().is_terminal(),
            max_level,
            labels,
            mutex: Mutex::new(()),
        }
    }

    fn wrap(&self, label: &str, level: Level) -> String {
        if !self.use_colors {
            return label.to_string();
        }

        match level {
            Level::Error => label.red().to_string(),
            Level::Warn => label.yellow().to_string(),
            Level::Info => label.blue().to_string(),
            Level::Debug => label.magenta().to_string(),
            Level::Trace => label.normal().to_string(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let label = self.labels.get(&record.level()).copied().unwrap_or("LOG");
        format!("[{}] {}", self.wrap(label, record.level()), record.args())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.max_level {
            return false;
        }
        // 调试级别只输出本crate的日志
        metadata.level() <= Level::Info || metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format(record);
        let _guard = self.mutex.lock();
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// 安装全局日志
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_enabled_levels() {
        let logger = Logger::new(LevelFilter::Info);
        let info = Metadata::builder().level(Level::Info).target("trust_dns_proto").build();
        let debug = Metadata::builder().level(Level::Debug).target("rsubrecurse::worker").build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));

        let logger = Logger::new(LevelFilter::Trace);
        let foreign = Metadata::builder().level(Level::Debug).target("trust_dns_proto").build();
        assert!(logger.enabled(&debug));
        assert!(!logger.enabled(&foreign));
    }

    #[test]
    fn test_format_without_colors() {
        let mut logger = Logger::new(LevelFilter::Info);
        logger.use_colors = false;
        assert_eq!(
            logger.format(
                &Record::builder()
                    .level(Level::Warn)
                    .args(format_args!("检测到泛解析记录"))
                    .build()
            ),
            "[Warning] 检测到泛解析记录"
        );
    }

    #[test]
    fn test_init_logger_only_once() {
        assert!(init_logger(LevelFilter::Warn).is_ok());
        assert_eq!(log::max_level(), LevelFilter::Warn);
        assert!(init_logger(LevelFilter::Debug).is_err());
    }
}
