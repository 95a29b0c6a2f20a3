use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// 待ち受けアドレス
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// 1メッセージの最大バイト数
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// 動画はNフレームごとに解析
    #[serde(default = "default_sample_interval")]
    pub sample_interval: u64,
    /// 動画のフレームレート（タイムスタンプ算出用）
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// 姿勢種別の既定値 ("squat" / "desk")
    #[serde(default = "default_posture")]
    pub default_posture: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default)]
    pub verbose: bool,
}

fn default_listen_addr() -> String { "0.0.0.0:9100".to_string() }
fn default_max_frame_length() -> usize { 4 * 1024 * 1024 }
fn default_sample_interval() -> u64 { 30 }
fn default_fps() -> f64 { 30.0 }
fn default_posture() -> String { "desk".to_string() }
fn default_log_dir() -> String { "logs".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_frame_length: default_max_frame_length(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_interval: default_sample_interval(),
            fps: default_fps(),
            default_posture: default_posture(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            verbose: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid config")?;
        Ok(config)
    }

    /// 読み込めない場合は既定値
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9100");
        assert_eq!(config.server.max_frame_length, 4 * 1024 * 1024);
        assert_eq!(config.session.sample_interval, 30);
        assert_eq!(config.session.fps, 30.0);
        assert_eq!(config.session.default_posture, "desk");
        assert_eq!(config.log.dir, "logs");
        assert!(!config.log.verbose);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [server]
            listen_addr = "127.0.0.1:7000"

            [session]
            fps = 60.0
            default_posture = "squat"

            [log]
            verbose = true
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7000");
        assert_eq!(config.server.max_frame_length, 4 * 1024 * 1024);
        assert_eq!(config.session.fps, 60.0);
        assert_eq!(config.session.sample_interval, 30);
        assert_eq!(config.session.default_posture, "squat");
        assert!(config.log.verbose);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(Config::parse("[session]\nfps = \"fast\"").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist/posture.toml");
        assert_eq!(config.session.sample_interval, 30);
    }
}
