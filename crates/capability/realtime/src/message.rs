use crate::RealtimeError;
use domain::{PushMessage, SensorMessage};

/// 线上消息转为分发用消息：占用状态换算为计数增量。
pub fn translate(message: PushMessage) -> SensorMessage {
    SensorMessage {
        space_id: message.space_id,
        timestamp: message.timestamp,
        count: message.count,
        temperature: message.temperature,
        humidity: message.humidity,
        unit: message.unit,
        occupancy: message.occupancy.map(|state| state.delta()),
    }
}

/// 解码文本帧并换算。
pub fn decode_message(text: &str) -> Result<SensorMessage, RealtimeError> {
    let message: PushMessage =
        serde_json::from_str(text).map_err(|err| RealtimeError::Decode(err.to_string()))?;
    Ok(translate(message))
}
