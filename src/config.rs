use crate::error::{CompatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const STORE_ENV: &str = "ELEMENT_COMPAT_STORE";
const WORKBOOK_ENV: &str = "ELEMENT_COMPAT_WORKBOOK";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// レコードストア（JSON）のパス
    pub store_path: Option<PathBuf>,
    /// 既定の取り込み元ワークブック
    pub workbook: Option<PathBuf>,
    /// 範囲表記にシート名がない場合のシート名
    pub default_sheet: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
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

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CompatError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("element-compat").join("config.json"))
    }

    /// ストアのパス（環境変数 > 設定ファイル > 既定）
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(STORE_ENV) {
            return Ok(PathBuf::from(path));
        }

        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }

        let data = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| CompatError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("element-compat").join("records.json"))
    }

    /// 取り込み元ワークブック（環境変数 > 設定ファイル）
    pub fn resolved_workbook(&self) -> Option<PathBuf> {
        std::env::var(WORKBOOK_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| self.workbook.clone())
    }

    pub fn set_store_path(&mut self, path: PathBuf) -> Result<()> {
        self.store_path = Some(path);
        self.save()
    }

    pub fn set_workbook(&mut self, path: PathBuf) -> Result<()> {
        self.workbook = Some(path);
        self.save()
    }

    pub fn set_default_sheet(&mut self, sheet: String) -> Result<()> {
        self.default_sheet = Some(sheet);
        self.save()
    }
}
