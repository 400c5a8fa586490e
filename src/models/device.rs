use serde::{Deserialize, Serialize};

/// Below this battery percentage the UI shows an advisory. Connection is
/// still allowed.
pub const LOW_BATTERY_THRESHOLD: u8 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "DeviceWire")]
pub struct DeviceState {
    pub id: String,
    pub name: String,
    pub battery: u8,
}

/// Incoming device JSON; converted through [`DeviceState::new`] so the
/// battery clamp applies to deserialized devices too.
#[derive(Deserialize)]
struct DeviceWire {
    id: String,
    name: String,
    battery: u8,
}

impl From<DeviceWire> for DeviceState {
    fn from(wire: DeviceWire) -> Self {
        DeviceState::new(wire.id, wire.name, wire.battery)
    }
}

impl DeviceState {
    pub fn new(id: impl Into<String>, name: impl Into<String>, battery: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            battery: battery.min(100),
        }
    }

    pub fn is_low_battery(&self) -> bool {
        self.battery < LOW_BATTERY_THRESHOLD
    }
}
