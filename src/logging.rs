//! Line logging to stderr, mirrored into a timestamped file under the log dir.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::NaiveTime;

pub type LogFile = Arc<Mutex<BufWriter<File>>>;

/// `<dir>/<prefix>_YYYYmmdd_HHMMSS.log` を作成
pub fn open_log_file<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<LogFile> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log dir {}", dir.display()))?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.log", prefix, ts));
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    eprintln!("Log: {}", path.display());
    Ok(Arc::new(Mutex::new(BufWriter::new(file))))
}

/// `[HH:MM:SS.mmm] [tag] msg`
pub fn format_line(time: NaiveTime, tag: impl Display, msg: &str) -> String {
    format!("[{}] [{}] {}", time.format("%H:%M:%S%.3f"), tag, msg)
}

/// stderr とログファイルの両方に1行書く
///
/// ファイル書き込みの失敗は無視する
pub fn write_line(logfile: &LogFile, tag: impl Display, msg: &str) {
    let line = format_line(chrono::Local::now().time(), tag, msg);
    eprintln!("{}", line);
    if let Ok(mut f) = logfile.lock() {
        let _ = writeln!(f, "{}", line);
        let _ = f.flush();
    }
}

/// `log!(logfile, tag, "format", args...)`
///
/// tag は接続元アドレスやサブシステム名など `Display` を実装する値
#[macro_export]
macro_rules! log {
    ($logfile:expr, $tag:expr, $($arg:tt)*) => {
        $crate::logging::write_line(&$logfile, $tag, &format!($($arg)*))
    };
}
