use crate::error::{Result, ScannerError};
use lazy_static::lazy_static;
use prescription_scanner_common::API_URL_VAR;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 読み込む.envファイル（後のものが優先）
pub const ENV_FILES: &[&str] = &[".env", ".env.local", ".env.production"];

lazy_static! {
    static ref ENV_LINE: Regex = Regex::new(&format!(
        r"(?m)^[ \t]*(?:export[ \t]+)?{}[ \t]*=[ \t]*(.*?)[ \t]*\r?$",
        API_URL_VAR
    ))
    .expect("valid env line regex");
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScannerError::Config("home directory not found".into()))?;
        Ok(home
            .join(".config")
            .join("prescription-scanner")
            .join("config.json"))
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        self.api_base_url = Some(url);
        self.save()
    }
}

/// ベースURLの取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    Flag,
    Env,
    EnvFile(PathBuf),
    ConfigFile,
    Unset,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::Flag => write!(f, "--api-url"),
            UrlSource::Env => write!(f, "environment ({})", API_URL_VAR),
            UrlSource::EnvFile(path) => write!(f, "{}", path.display()),
            UrlSource::ConfigFile => write!(f, "saved config"),
            UrlSource::Unset => write!(f, "not set"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// 未設定なら空文字（検証で "not set" になる）
    pub url: String,
    pub source: UrlSource,
}

/// ベースURLを決定する
///
/// 優先順位: --api-url > 環境変数 > .envファイル > 保存済み設定
pub fn resolve_api_url(flag: Option<&str>, config: &Config, dir: &Path) -> ResolvedUrl {
    let env_value = std::env::var(API_URL_VAR).ok();
    resolve_api_url_with(flag, env_value, config, dir)
}

pub fn resolve_api_url_with(
    flag: Option<&str>,
    env_value: Option<String>,
    config: &Config,
    dir: &Path,
) -> ResolvedUrl {
    if let Some(url) = flag {
        return ResolvedUrl {
            url: url.to_string(),
            source: UrlSource::Flag,
        };
    }

    if let Some(url) = env_value.filter(|v| !v.trim().is_empty()) {
        return ResolvedUrl {
            url,
            source: UrlSource::Env,
        };
    }

    if let Some((url, path)) = read_env_files(dir) {
        return ResolvedUrl {
            url,
            source: UrlSource::EnvFile(path),
        };
    }

    match &config.api_base_url {
        Some(url) if !url.trim().is_empty() => ResolvedUrl {
            url: url.clone(),
            source: UrlSource::ConfigFile,
        },
        _ => ResolvedUrl {
            url: String::new(),
            source: UrlSource::Unset,
        },
    }
}

/// ディレクトリ内の.envファイルから値を探す
pub fn read_env_files(dir: &Path) -> Option<(String, PathBuf)> {
    let mut found = None;

    for file in ENV_FILES {
        let path = dir.join(file);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        if let Some(url) = parse_env_value(&content) {
            tracing::debug!(path = %path.display(), "found {} in env file", API_URL_VAR);
            found = Some((url, path));
        }
    }

    found
}

/// .envの内容から値を取り出す（最後の定義が有効、引用符は除去）
///
/// 空の値は未定義扱い
pub fn parse_env_value(content: &str) -> Option<String> {
    ENV_LINE
        .captures_iter(content)
        .filter_map(|caps| {
            let value = caps[1].replace(['"', '\''], "").trim().to_string();
            (!value.is_empty()).then_some(value)
        })
        .last()
}
