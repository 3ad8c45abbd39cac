// ── Telemetry cache & equipment index ──
//
// Both live behind the client facade and are rebuilt from whole
// snapshots. Neither is shared across tasks; the facade owns them and
// serializes access through `&mut self`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use omnilogic_api::telemetry::Telemetry;
use tokio::time::Instant;

/// Single-entry snapshot cache with a fixed validity window.
#[derive(Debug)]
pub(crate) struct TelemetryCache {
    entry: Option<(Arc<Telemetry>, Instant)>,
    validity: Duration,
}

impl TelemetryCache {
    pub(crate) fn new(validity: Duration) -> Self {
        Self {
            entry: None,
            validity,
        }
    }

    /// The cached snapshot, if one exists and is still inside the
    /// validity window. Age is measured from when it was stored.
    pub(crate) fn get(&self) -> Option<Arc<Telemetry>> {
        self.entry.as_ref().and_then(|(snapshot, fetched_at)| {
            (fetched_at.elapsed() < self.validity).then(|| Arc::clone(snapshot))
        })
    }

    pub(crate) fn store(&mut self, snapshot: Arc<Telemetry>) {
        self.entry = Some((snapshot, Instant::now()));
    }

    pub(crate) fn clear(&mut self) {
        self.entry = None;
    }
}

/// Equipment id to body-of-water id lookup.
///
/// The wire correlates equipment to bodies by position: the i-th filter
/// serves the i-th body, and likewise for heaters and lights. The index
/// flattens that into direct lookups, with each body also mapping to
/// itself.
#[derive(Debug, Default)]
pub(crate) struct EquipmentIndex {
    body_by_equipment: HashMap<i32, i32>,
}

impl EquipmentIndex {
    pub(crate) fn body_of(&self, equipment_id: i32) -> Option<i32> {
        self.body_by_equipment.get(&equipment_id).copied()
    }

    /// Replace the index with one derived from `telemetry`.
    ///
    /// A kind with fewer rows than there are bodies simply stops
    /// contributing; it never shifts later positions.
    pub(crate) fn rebuild(&mut self, telemetry: &Telemetry) {
        self.body_by_equipment.clear();
        for (i, body) in telemetry.bodies_of_water.iter().enumerate() {
            self.body_by_equipment.insert(body.system_id, body.system_id);
            if let Some(filter) = telemetry.filters.get(i) {
                self.body_by_equipment.insert(filter.system_id, body.system_id);
            }
            if let Some(virtual_heater) = telemetry.virtual_heaters.get(i) {
                self.body_by_equipment
                    .insert(virtual_heater.system_id, body.system_id);
            }
            if let Some(heater) = telemetry.heaters.get(i) {
                self.body_by_equipment.insert(heater.system_id, body.system_id);
            }
            if let Some(light) = telemetry.color_logic_lights.get(i) {
                self.body_by_equipment.insert(light.system_id, body.system_id);
            }
        }
    }
}
