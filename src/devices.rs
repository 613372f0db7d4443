//! Device type registry.
//!
//! Maps the device type names used in the `devices` section of the
//! configuration to the device implementation that handles them, together
//! with the extra constructor arguments that name implies.

use crate::error::{ConfigError, Result};
use serde::Serialize;
use std::fmt;

/// Device implementation behind a configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Dimmer,
    BatterySensor,
    FanLinc,
    IoLinc,
    KeypadLinc,
    Leak,
    Remote,
    Motion,
    Outlet,
    SmokeBridge,
    Switch,
    Thermostat,
}

impl DeviceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Dimmer => "Dimmer",
            DeviceKind::BatterySensor => "BatterySensor",
            DeviceKind::FanLinc => "FanLinc",
            DeviceKind::IoLinc => "IOLinc",
            DeviceKind::KeypadLinc => "KeypadLinc",
            DeviceKind::Leak => "Leak",
            DeviceKind::Remote => "Remote",
            DeviceKind::Motion => "Motion",
            DeviceKind::Outlet => "Outlet",
            DeviceKind::SmokeBridge => "SmokeBridge",
            DeviceKind::Switch => "Switch",
            DeviceKind::Thermostat => "Thermostat",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a constructor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(u32),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Int(n) => write!(f, "{}", n),
        }
    }
}

/// A named constructor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceArg {
    pub name: &'static str,
    pub value: ArgValue,
}

/// One registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceType {
    pub name: &'static str,
    pub kind: DeviceKind,
    pub args: &'static [DeviceArg],
}

const fn plain(name: &'static str, kind: DeviceKind) -> DeviceType {
    DeviceType {
        name,
        kind,
        args: &[],
    }
}

const KEYPAD_DIMMER: &[DeviceArg] = &[DeviceArg {
    name: "dimmer",
    value: ArgValue::Bool(true),
}];
const KEYPAD_SWITCH: &[DeviceArg] = &[DeviceArg {
    name: "dimmer",
    value: ArgValue::Bool(false),
}];
const FOUR_BUTTONS: &[DeviceArg] = &[DeviceArg {
    name: "num_button",
    value: ArgValue::Int(4),
}];
const EIGHT_BUTTONS: &[DeviceArg] = &[DeviceArg {
    name: "num_button",
    value: ArgValue::Int(8),
}];

/// Every known device type, in the order they are listed to users.
pub static DEVICE_TYPES: &[DeviceType] = &[
    plain("dimmer", DeviceKind::Dimmer),
    plain("battery_sensor", DeviceKind::BatterySensor),
    plain("fan_linc", DeviceKind::FanLinc),
    plain("io_linc", DeviceKind::IoLinc),
    DeviceType {
        name: "keypad_linc",
        kind: DeviceKind::KeypadLinc,
        args: KEYPAD_DIMMER,
    },
    DeviceType {
        name: "keypad_linc_sw",
        kind: DeviceKind::KeypadLinc,
        args: KEYPAD_SWITCH,
    },
    plain("leak", DeviceKind::Leak),
    DeviceType {
        name: "mini_remote4",
        kind: DeviceKind::Remote,
        args: FOUR_BUTTONS,
    },
    DeviceType {
        name: "mini_remote8",
        kind: DeviceKind::Remote,
        args: EIGHT_BUTTONS,
    },
    plain("motion", DeviceKind::Motion),
    plain("outlet", DeviceKind::Outlet),
    plain("smoke_bridge", DeviceKind::SmokeBridge),
    plain("switch", DeviceKind::Switch),
    plain("thermostat", DeviceKind::Thermostat),
];

/// Look up a device type by name, ignoring case.
pub fn find(name: &str) -> Result<&'static DeviceType> {
    let wanted = name.to_lowercase();
    DEVICE_TYPES
        .iter()
        .find(|d| d.name == wanted)
        .ok_or_else(|| ConfigError::UnknownDeviceType {
            name: name.to_string(),
            valid: names().collect::<Vec<_>>().join(", "),
        })
}

/// Registry names in listing order.
pub fn names() -> impl Iterator<Item = &'static str> {
    DEVICE_TYPES.iter().map(|d| d.name)
}
