//! 位置层级：站点 → 楼宇 → 楼层 → 传感空间。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 层级（固定四级）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Site,
    Building,
    Storey,
    Space,
}

impl HierarchyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HierarchyLevel::Site => "site",
            HierarchyLevel::Building => "building",
            HierarchyLevel::Storey => "storey",
            HierarchyLevel::Space => "space",
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 传感空间类别（仅 Space 层有意义）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceCategory {
    Occupancy,
    PeopleCount,
    Temperature,
    Humidity,
}

impl SpaceCategory {
    /// 解析远端 `spaceType`，未知类别返回 None。
    pub fn from_space_type(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "occupancy" => Some(SpaceCategory::Occupancy),
            "peoplecount" | "people_count" | "people-count" => Some(SpaceCategory::PeopleCount),
            "temperature" => Some(SpaceCategory::Temperature),
            "humidity" => Some(SpaceCategory::Humidity),
            _ => None,
        }
    }
}

/// 远端接口返回的原始位置记录。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub function_type: String,
    #[serde(default)]
    pub space_type: String,
}

/// 规范化后的位置节点（每轮采集重新生成，不整树持久化）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNode {
    pub uuid: String,
    pub name: String,
    pub level: HierarchyLevel,
    pub space_type: String,
    pub function_type: String,
    pub children: Vec<LocationNode>,
}

impl LocationNode {
    /// 由原始记录与所在层级构造节点。
    pub fn from_record(record: LocationRecord, level: HierarchyLevel) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            level,
            space_type: record.space_type,
            function_type: record.function_type,
            children: Vec::new(),
        }
    }

    /// 空间类别；非 Space 层恒为 None。
    pub fn category(&self) -> Option<SpaceCategory> {
        if self.level != HierarchyLevel::Space {
            return None;
        }
        SpaceCategory::from_space_type(&self.space_type)
    }

    /// 可过滤字段的静态映射。
    pub fn filter_field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "uuid" => Some(&self.uuid),
            "object_type" | "level" => Some(self.level.as_str()),
            "function_type" => Some(&self.function_type),
            "space_type" | "category" => Some(&self.space_type),
            _ => None,
        }
    }
}
