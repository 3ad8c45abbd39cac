// ── Telemetry snapshot decoding ──
//
// `RequestTelemetryData` answers with a `STATUS` document: one
// `Backyard` element plus zero or more elements per equipment kind, all
// state carried as attributes. This module turns that document into
// typed rows.

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::error::Error;
use crate::xml::child_elements;

/// One full telemetry snapshot.
///
/// Collections preserve wire order. Equipment of different kinds
/// correlates to its body of water by position, so reordering a list
/// here would silently re-wire the backyard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub version: String,
    pub backyard: BackyardStatus,
    pub bodies_of_water: Vec<BodyOfWaterStatus>,
    pub filters: Vec<FilterStatus>,
    pub virtual_heaters: Vec<VirtualHeaterStatus>,
    pub heaters: Vec<HeaterStatus>,
    pub chlorinators: Vec<ChlorinatorStatus>,
    pub color_logic_lights: Vec<ColorLogicLightStatus>,
    pub csads: Vec<CsadStatus>,
    pub groups: Vec<GroupStatus>,
}

/// Site-wide status. Exactly one per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackyardStatus {
    pub system_id: i32,
    pub status_version: i32,
    pub air_temp: i32,
    pub status: i32,
    pub state: i32,
    pub msp_version: String,
    pub config_updated_time: String,
    pub datetime: String,
    pub message_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyOfWaterStatus {
    pub system_id: i32,
    pub flow: i32,
    pub water_temp: i32,
}

/// A pump circuit. `filter_speed` is a percentage, 0 when off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStatus {
    pub system_id: i32,
    pub valve_position: i32,
    pub filter_speed: i32,
    pub filter_state: i32,
    pub why_filter_is_on: i32,
    pub fp_override: i32,
    pub last_speed: i32,
}

/// The logical heater: setpoint and enablement for a body of water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHeaterStatus {
    pub system_id: i32,
    pub current_set_point: i32,
    pub enable: bool,
    pub solar_set_point: i32,
    pub mode: i32,
}

/// A physical heater unit behind a virtual heater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterStatus {
    pub system_id: i32,
    pub heater_state: i32,
    pub temp: i32,
    pub enable: bool,
    pub priority: i32,
    pub maintain_for: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChlorinatorStatus {
    pub system_id: i32,
    pub operating_mode: i32,
    pub timed_percent: i32,
    pub operating_state: i32,
    pub sc_mode: i32,
    pub chlr_error: i32,
    pub chlr_alert: i32,
    pub avg_salt_level: i32,
    pub instant_salt_level: i32,
    pub status: i32,
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorLogicLightStatus {
    pub system_id: i32,
    pub light_state: i32,
    pub current_show: i32,
    pub speed: i32,
    pub brightness: i32,
    pub special_effect: i32,
}

/// Chemistry sense-and-dispense unit. Probe readings come and go, so
/// every reading is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsadStatus {
    pub system_id: i32,
    pub ph: Option<String>,
    pub orp: Option<String>,
    pub status: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatus {
    pub system_id: i32,
    pub group_state: i32,
}

/// Decode a `STATUS` document into a [`Telemetry`] snapshot.
///
/// A kind with no elements decodes to an empty list. Missing or
/// malformed attributes fail with the path that was being read.
pub fn parse_telemetry(document: &Element) -> Result<Telemetry, Error> {
    if document.name != "STATUS" {
        return Err(Error::parse(
            "STATUS",
            format!("unexpected root element {:?}", document.name),
        ));
    }

    let backyard = child_elements(document, "Backyard")
        .first()
        .copied()
        .ok_or_else(|| Error::parse("STATUS/Backyard", "missing element"))
        .and_then(|el| parse_backyard(el, "STATUS/Backyard"))?;

    Ok(Telemetry {
        version: attr_string(document, "STATUS", "version")?,
        backyard,
        bodies_of_water: parse_kind(document, "BodyOfWater", parse_body_of_water)?,
        filters: parse_kind(document, "Filter", parse_filter)?,
        virtual_heaters: parse_kind(document, "VirtualHeater", parse_virtual_heater)?,
        heaters: parse_kind(document, "Heater", parse_heater)?,
        chlorinators: parse_kind(document, "Chlorinator", parse_chlorinator)?,
        color_logic_lights: parse_kind(document, "ColorLogic-Light", parse_light)?,
        csads: parse_kind(document, "CSAD", parse_csad)?,
        groups: parse_kind(document, "Group", parse_group)?,
    })
}

// Decodes every element of one kind, in wire order.
fn parse_kind<T>(
    root: &Element,
    name: &str,
    parse: impl Fn(&Element, &str) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    child_elements(root, name)
        .into_iter()
        .enumerate()
        .map(|(i, el)| parse(el, &format!("STATUS/{name}[{i}]")))
        .collect()
}

fn parse_backyard(el: &Element, path: &str) -> Result<BackyardStatus, Error> {
    Ok(BackyardStatus {
        system_id: attr_i32(el, path, "systemId")?,
        status_version: attr_i32(el, path, "statusVersion")?,
        air_temp: attr_i32(el, path, "airTemp")?,
        status: attr_i32(el, path, "status")?,
        state: attr_i32(el, path, "state")?,
        msp_version: attr_string(el, path, "mspVersion")?,
        config_updated_time: attr_string(el, path, "configUpdatedTime")?,
        datetime: attr_string(el, path, "datetime")?,
        message_version: attr_string(el, path, "messageVersion")?,
    })
}

fn parse_body_of_water(el: &Element, path: &str) -> Result<BodyOfWaterStatus, Error> {
    Ok(BodyOfWaterStatus {
        system_id: attr_i32(el, path, "systemId")?,
        flow: attr_i32(el, path, "flow")?,
        water_temp: attr_i32(el, path, "waterTemp")?,
    })
}

fn parse_filter(el: &Element, path: &str) -> Result<FilterStatus, Error> {
    Ok(FilterStatus {
        system_id: attr_i32(el, path, "systemId")?,
        valve_position: attr_i32(el, path, "valvePosition")?,
        filter_speed: attr_i32(el, path, "filterSpeed")?,
        filter_state: attr_i32(el, path, "filterState")?,
        why_filter_is_on: attr_i32(el, path, "whyFilterIsOn")?,
        fp_override: attr_i32(el, path, "fpOverride")?,
        last_speed: attr_i32(el, path, "lastSpeed")?,
    })
}

fn parse_virtual_heater(el: &Element, path: &str) -> Result<VirtualHeaterStatus, Error> {
    Ok(VirtualHeaterStatus {
        system_id: attr_i32(el, path, "systemId")?,
        current_set_point: attr_i32(el, path, "Current-Set-Point")?,
        enable: attr_yes_no(el, path, "enable")?,
        solar_set_point: attr_i32(el, path, "SolarSetPoint")?,
        mode: attr_i32(el, path, "Mode")?,
    })
}

fn parse_heater(el: &Element, path: &str) -> Result<HeaterStatus, Error> {
    Ok(HeaterStatus {
        system_id: attr_i32(el, path, "systemId")?,
        heater_state: attr_i32(el, path, "heaterState")?,
        temp: attr_i32(el, path, "temp")?,
        enable: attr_yes_no(el, path, "enable")?,
        priority: attr_i32(el, path, "priority")?,
        maintain_for: attr_i32(el, path, "maintainFor")?,
    })
}

fn parse_chlorinator(el: &Element, path: &str) -> Result<ChlorinatorStatus, Error> {
    Ok(ChlorinatorStatus {
        system_id: attr_i32(el, path, "systemId")?,
        operating_mode: attr_i32(el, path, "operatingMode")?,
        timed_percent: attr_i32(el, path, "Timed-Percent")?,
        operating_state: attr_i32(el, path, "operatingState")?,
        sc_mode: attr_i32(el, path, "scMode")?,
        chlr_error: attr_i32(el, path, "chlrError")?,
        chlr_alert: attr_i32(el, path, "chlrAlert")?,
        avg_salt_level: attr_i32(el, path, "avgSaltLevel")?,
        instant_salt_level: attr_i32(el, path, "instantSaltLevel")?,
        status: attr_i32(el, path, "status")?,
        enable: attr_bit(el, path, "enable")?,
    })
}

fn parse_light(el: &Element, path: &str) -> Result<ColorLogicLightStatus, Error> {
    Ok(ColorLogicLightStatus {
        system_id: attr_i32(el, path, "systemId")?,
        light_state: attr_i32(el, path, "lightState")?,
        current_show: attr_i32(el, path, "currentShow")?,
        speed: attr_i32(el, path, "speed")?,
        brightness: attr_i32(el, path, "brightness")?,
        special_effect: attr_i32(el, path, "specialEffect")?,
    })
}

fn parse_csad(el: &Element, path: &str) -> Result<CsadStatus, Error> {
    Ok(CsadStatus {
        system_id: attr_i32(el, path, "systemId")?,
        ph: attr_opt(el, "ph"),
        orp: attr_opt(el, "orp"),
        status: attr_opt(el, "status"),
        mode: attr_opt(el, "mode"),
    })
}

fn parse_group(el: &Element, path: &str) -> Result<GroupStatus, Error> {
    Ok(GroupStatus {
        system_id: attr_i32(el, path, "systemId")?,
        group_state: attr_i32(el, path, "groupState")?,
    })
}

// ── Attribute helpers ──

fn attr<'a>(el: &'a Element, path: &str, name: &str) -> Result<&'a str, Error> {
    el.attributes
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::parse(format!("{path}/@{name}"), "missing attribute"))
}

fn attr_string(el: &Element, path: &str, name: &str) -> Result<String, Error> {
    attr(el, path, name).map(str::to_owned)
}

fn attr_i32(el: &Element, path: &str, name: &str) -> Result<i32, Error> {
    let raw = attr(el, path, name)?;
    raw.trim()
        .parse()
        .map_err(|_| Error::parse(format!("{path}/@{name}"), format!("not an integer: {raw:?}")))
}

// Absent and empty both mean "no reading".
fn attr_opt(el: &Element, name: &str) -> Option<String> {
    el.attributes
        .get(name)
        .filter(|v| !v.is_empty())
        .cloned()
}

fn attr_yes_no(el: &Element, path: &str, name: &str) -> Result<bool, Error> {
    Ok(attr(el, path, name)?.eq_ignore_ascii_case("yes"))
}

fn attr_bit(el: &Element, path: &str, name: &str) -> Result<bool, Error> {
    Ok(attr(el, path, name)? == "1")
}
