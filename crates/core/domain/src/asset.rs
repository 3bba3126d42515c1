//! 目标平台资产类别与类型常量。

use crate::location::SpaceCategory;
use std::fmt;

pub const ROOT_ASSET_TYPE: &str = "signify_root";
pub const GROUP_ASSET_TYPE: &str = "signify_group";
pub const OCCUPANCY_ASSET_TYPE: &str = "signify_occupancy_space";
pub const PEOPLE_COUNT_ASSET_TYPE: &str = "signify_people_count_space";
pub const TEMPERATURE_ASSET_TYPE: &str = "signify_temperature_space";
pub const HUMIDITY_ASSET_TYPE: &str = "signify_humidity_space";

/// 根节点的外部标识与显示名。
pub const ROOT_UUID: &str = "root";
pub const ROOT_NAME: &str = "root";

/// 空间类别对应的资产类型。
pub fn space_asset_type(category: SpaceCategory) -> &'static str {
    match category {
        SpaceCategory::Occupancy => OCCUPANCY_ASSET_TYPE,
        SpaceCategory::PeopleCount => PEOPLE_COUNT_ASSET_TYPE,
        SpaceCategory::Temperature => TEMPERATURE_ASSET_TYPE,
        SpaceCategory::Humidity => HUMIDITY_ASSET_TYPE,
    }
}

/// 全局唯一标识：`资产类型 + "_" + 外部 UUID`。
pub fn global_asset_identifier(asset_type: &str, uuid: &str) -> String {
    format!("{}_{}", asset_type, uuid)
}

/// 资产记录的层级类别（用于重建楼宇等邻接关系）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Root,
    Site,
    Building,
    Storey,
    Space,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Root => "root",
            AssetKind::Site => "site",
            AssetKind::Building => "building",
            AssetKind::Storey => "storey",
            AssetKind::Space => "space",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "root" => Some(AssetKind::Root),
            "site" => Some(AssetKind::Site),
            "building" => Some(AssetKind::Building),
            "storey" => Some(AssetKind::Storey),
            "space" => Some(AssetKind::Space),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
