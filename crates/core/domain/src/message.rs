//! 推送通道消息。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 订阅类别（远端 subscription 接口路径段）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionCategory {
    Occupancy,
    Humidity,
    Temperature,
    PeopleCount,
}

impl SubscriptionCategory {
    pub const ALL: [SubscriptionCategory; 4] = [
        SubscriptionCategory::Occupancy,
        SubscriptionCategory::Humidity,
        SubscriptionCategory::Temperature,
        SubscriptionCategory::PeopleCount,
    ];

    pub fn as_path(&self) -> &'static str {
        match self {
            SubscriptionCategory::Occupancy => "OCCUPANCY",
            SubscriptionCategory::Humidity => "HUMIDITY",
            SubscriptionCategory::Temperature => "TEMPERATURE",
            SubscriptionCategory::PeopleCount => "PEOPLE_COUNT",
        }
    }
}

impl fmt::Display for SubscriptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// 占用状态（线上枚举）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyState {
    Occupied,
    Unoccupied,
    #[serde(other)]
    Unknown,
}

impl OccupancyState {
    /// 占用状态对应的计数增量。
    pub fn delta(&self) -> i64 {
        match self {
            OccupancyState::Occupied => 1,
            OccupancyState::Unoccupied => -1,
            OccupancyState::Unknown => 0,
        }
    }
}

/// 推送通道上的原始 JSON 消息。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub space_id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub occupancy: Option<OccupancyState>,
}

/// 转换后交给分发器的传感消息。
#[derive(Debug, Clone, PartialEq)]
pub struct SensorMessage {
    pub space_id: String,
    /// 毫秒时间戳。
    pub timestamp: i64,
    pub count: Option<i64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub unit: Option<String>,
    pub occupancy: Option<i64>,
}
