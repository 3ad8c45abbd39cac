// ── Domain model ──

use omnilogic_api::telemetry::{
    ColorLogicLightStatus, FilterStatus, HeaterStatus, VirtualHeaterStatus,
};
use serde::{Deserialize, Serialize};

/// Combined water reading for the primary body of water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterTemperature {
    /// Measured temperature.
    pub current: i32,
    /// Virtual heater setpoint.
    pub target: i32,
    /// Whether a physical heater is actively firing.
    pub heater_on: bool,
}

/// Anything that can address a piece of equipment.
///
/// Client operations accept `impl EquipmentId`, so callers pass either
/// a raw system id or a borrowed status row from the last telemetry
/// snapshot. Both spellings resolve to the same wire parameter.
pub trait EquipmentId {
    fn system_id(&self) -> i32;
}

impl EquipmentId for i32 {
    fn system_id(&self) -> i32 {
        *self
    }
}

impl<T: EquipmentId + ?Sized> EquipmentId for &T {
    fn system_id(&self) -> i32 {
        (**self).system_id()
    }
}

impl EquipmentId for FilterStatus {
    fn system_id(&self) -> i32 {
        self.system_id
    }
}

impl EquipmentId for VirtualHeaterStatus {
    fn system_id(&self) -> i32 {
        self.system_id
    }
}

impl EquipmentId for HeaterStatus {
    fn system_id(&self) -> i32 {
        self.system_id
    }
}

impl EquipmentId for ColorLogicLightStatus {
    fn system_id(&self) -> i32 {
        self.system_id
    }
}

/// Wire codes for `lightState`.
///
/// The transitional codes report as "not on": a light powering up is
/// not yet lit, and one powering down no longer is.
pub mod light_state {
    pub const OFF: i32 = 0;
    pub const POWERING_ON: i32 = 4;
    pub const ON: i32 = 6;
    pub const POWERING_OFF: i32 = 7;
}
