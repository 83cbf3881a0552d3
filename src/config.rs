//! 環境変数から読み込むプロセス設定

use std::str::FromStr;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/library";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 3000;

/// 起動時に選択するカタログストアのバックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unsupported storage backend '{}'", other)),
        }
    }
}

/// 設定値の解釈エラー（変数名を含む）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
}

impl AppConfig {
    /// プロセスの環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数ルックアップ関数から設定を読み込む
    ///
    /// 未設定の変数は既定値を使う。解釈できない値はエラーになる。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            storage: parse_or(&lookup, "CATALOG_STORAGE", StorageBackend::default())?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
        })
    }

    /// サーバーの待ち受けアドレス
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
