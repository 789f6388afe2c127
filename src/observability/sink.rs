//! 行为日志落点
//!
//! 协调器只往 LogSink 写格式化好的行，无返回值、无背压；写失败直接吞掉。
//! - TracingSink：转发给 tracing（target = "companion"）
//! - FileSink：`[HH:MM:SS] 内容`，每行 flush，打开时截断
//! - MemorySink：共享缓冲，测试用

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 单向日志落点
pub trait LogSink: Send {
    fn write_line(&mut self, line: &str);

    /// 关闭落点（宿主卸载时调用）
    fn close(&mut self) {}

    fn log(&mut self, args: fmt::Arguments<'_>) {
        self.write_line(&args.to_string());
    }
}

/// 转发到 tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&mut self, line: &str) {
        tracing::info!(target: "companion", "{}", line);
    }
}

/// 带时间戳的文件日志
#[derive(Debug)]
pub struct FileSink {
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// 截断打开；打开失败时返回一个静默落点
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let writer = match File::create(path) {
            Ok(f) => Some(BufWriter::new(f)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Log file open failed, sink disabled");
                None
            }
        };
        let mut sink = Self { writer };
        sink.write_line("Logger initialized");
        sink
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}

impl LogSink for FileSink {
    fn write_line(&mut self, line: &str) {
        let Some(w) = self.writer.as_mut() else {
            return;
        };
        let stamp = chrono::Local::now().format("%H:%M:%S");
        let _ = writeln!(w, "[{}] {}", stamp, line);
        let _ = w.flush();
    }

    fn close(&mut self) {
        if self.writer.is_some() {
            self.write_line("Logger shutting down");
            self.writer = None;
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// 内存落点；clone 共享同一缓冲
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// 包含 `needle` 的行数
    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }
}

impl LogSink for MemorySink {
    fn write_line(&mut self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_shared() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.log(format_args!("[Recall] tick={}", 5));
        writer.write_line("second");
        assert_eq!(sink.lines(), vec!["[Recall] tick=5", "second"]);
        assert!(sink.contains("Recall"));
        assert_eq!(sink.count("tick"), 1);
    }

    #[test]
    fn test_file_sink_writes_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companion.log");

        let mut sink = FileSink::open(&path);
        assert!(sink.is_open());
        sink.write_line("hello");
        sink.close();
        sink.write_line("after close");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("] Logger initialized"));
        assert!(lines[1].starts_with('['));
        assert!(lines[1].ends_with("] hello"));
        assert!(lines[2].ends_with("] Logger shutting down"));
    }

    #[test]
    fn test_file_sink_open_failure_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::open(dir.path().join("missing").join("x.log"));
        assert!(!sink.is_open());
        sink.write_line("dropped");
        sink.close();
    }
}
