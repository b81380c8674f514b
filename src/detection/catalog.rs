//! # 病害目录
//!
//! ## 设计思路
//!
//! 目录是固定枚举而非动态存储：随二进制内嵌一份 JSON，第一次访问时解析，
//! 之后整个进程生命周期只读。检测结果里的 `disease` 只是对目录条目的引用（`Arc`）。
//!
//! 构造时校验：非空、id 唯一、必须包含 `healthy` 条目。

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{DetectionError, Disease};

/// “健康”哨兵条目的 id。
pub const HEALTHY_DISEASE_ID: &str = "healthy";

const BUILTIN_CATALOG_JSON: &str = include_str!("../../data/diseases.json");

static BUILTIN_CATALOG: Lazy<Arc<DiseaseCatalog>> = Lazy::new(|| {
    Arc::new(
        DiseaseCatalog::from_json(BUILTIN_CATALOG_JSON)
            .expect("内嵌病害目录必须合法"),
    )
});

/// 只读病害目录，保持 JSON 中的顺序。
#[derive(Debug)]
pub struct DiseaseCatalog {
    entries: Vec<Arc<Disease>>,
    index: HashMap<String, usize>,
}

impl DiseaseCatalog {
    /// 内嵌目录（15 个条目，含 `healthy`）。
    pub fn builtin() -> Arc<DiseaseCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, DetectionError> {
        let diseases: Vec<Disease> = serde_json::from_str(json)
            .map_err(|e| DetectionError::Catalog(format!("目录 JSON 解析失败：{}", e)))?;
        Self::from_entries(diseases)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, DetectionError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::Catalog(format!("无法读取目录文件 {}：{}", path.display(), e))
        })?;
        let catalog = Self::from_json(&content)?;
        log::info!("📚 已加载病害目录 {}（{} 个条目）", path.display(), catalog.len());
        Ok(catalog)
    }

    pub fn from_entries(diseases: Vec<Disease>) -> Result<Self, DetectionError> {
        if diseases.is_empty() {
            return Err(DetectionError::Catalog("目录为空".to_string()));
        }

        let mut index = HashMap::with_capacity(diseases.len());
        for (position, disease) in diseases.iter().enumerate() {
            if disease.id.trim().is_empty() {
                return Err(DetectionError::Catalog(format!("第 {} 个条目缺少 id", position)));
            }
            if index.insert(disease.id.clone(), position).is_some() {
                return Err(DetectionError::Catalog(format!("重复的病害 id：{}", disease.id)));
            }
        }

        if !index.contains_key(HEALTHY_DISEASE_ID) {
            return Err(DetectionError::Catalog(format!(
                "目录缺少 `{}` 条目",
                HEALTHY_DISEASE_ID
            )));
        }

        Ok(Self {
            entries: diseases.into_iter().map(Arc::new).collect(),
            index,
        })
    }

    /// 按目录顺序返回全部条目。
    pub fn all(&self) -> &[Arc<Disease>] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Disease>> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
