// Device domain models: BLE scan results, registration and LED commands
use crate::domain::validation::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScannedDevice {
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub rssi: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    PlantSensor,
    SwitchBot(String),
    Unsupported,
}

impl ScannedDevice {
    pub fn kind(&self) -> DeviceKind {
        if self.device_type == "plant_sensor" {
            DeviceKind::PlantSensor
        } else if let Some(model) = self.device_type.strip_prefix("switchbot_") {
            DeviceKind::SwitchBot(model.to_string())
        } else {
            DeviceKind::Unsupported
        }
    }
}

/// Registration request for a scanned device.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewDevice {
    pub device_name: String,
    pub mac_address: String,
    pub device_type: String,
}

impl NewDevice {
    pub fn new(device_name: &str, mac_address: &str, device_type: &str) -> Result<Self, ValidationError> {
        let device_name = device_name.trim();
        if device_name.is_empty() {
            return Err(ValidationError::DeviceName);
        }
        Ok(Self {
            device_name: device_name.to_string(),
            mac_address: mac_address.to_string(),
            device_type: device_type.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#rrggbb`, `rrggbb` or `#rgb`.
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let double = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Some(Self {
                    r: double(0)?,
                    g: double(1)?,
                    b: double(2)?,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedCommand {
    pub device_id: String,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub brightness: u8,
    pub duration_ms: u32,
}

impl LedCommand {
    /// Validates the raw form values in the order the user sees the
    /// fields: brightness, duration, then colour.
    pub fn from_form(
        device_id: &str,
        hex_color: &str,
        brightness: &str,
        duration_ms: &str,
    ) -> Result<Self, ValidationError> {
        let brightness = brightness
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|b| (0..=100).contains(b))
            .ok_or(ValidationError::Brightness)?;
        let duration_ms = duration_ms
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|d| u32::try_from(d).ok())
            .ok_or(ValidationError::Duration)?;
        let rgb = Rgb::from_hex(hex_color).ok_or(ValidationError::Color)?;

        Ok(Self {
            device_id: device_id.to_string(),
            red: rgb.r,
            green: rgb.g,
            blue: rgb.b,
            brightness: brightness as u8,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(Rgb::from_hex("#ff0000"), Some(Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(Rgb::from_hex("00ff80"), Some(Rgb { r: 0, g: 255, b: 128 }));
        assert_eq!(Rgb::from_hex("#0f0"), Some(Rgb { r: 0, g: 255, b: 0 }));
        assert_eq!(Rgb::from_hex("#zz0000"), None);
        assert_eq!(Rgb::from_hex("#ff00"), None);
    }

    #[test]
    fn test_brightness_checked_first() {
        let result = LedCommand::from_form("d1", "#ff0000", "150", "1000");
        assert_eq!(result, Err(ValidationError::Brightness));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Brightness must be between 0 and 100."
        );
    }

    #[test]
    fn test_duration_and_color_rejections() {
        assert_eq!(
            LedCommand::from_form("d1", "#ff0000", "50", "-5"),
            Err(ValidationError::Duration)
        );
        assert_eq!(
            LedCommand::from_form("d1", "red", "50", "500"),
            Err(ValidationError::Color)
        );
    }

    #[test]
    fn test_valid_led_command() {
        let cmd = LedCommand::from_form("d1", "#3366ff", "80", "2000").unwrap();
        assert_eq!((cmd.red, cmd.green, cmd.blue), (0x33, 0x66, 0xff));
        assert_eq!(cmd.brightness, 80);
        assert_eq!(cmd.duration_ms, 2000);
    }

    #[test]
    fn test_device_kinds() {
        let device = |t: &str| ScannedDevice {
            name: "x".into(),
            address: "AA:BB".into(),
            device_type: t.into(),
            rssi: -60,
        };
        assert_eq!(device("plant_sensor").kind(), DeviceKind::PlantSensor);
        assert_eq!(
            device("switchbot_meter").kind(),
            DeviceKind::SwitchBot("meter".to_string())
        );
        assert_eq!(device("beacon").kind(), DeviceKind::Unsupported);
    }

    #[test]
    fn test_device_name_required() {
        assert_eq!(
            NewDevice::new("  ", "AA:BB", "plant_sensor"),
            Err(ValidationError::DeviceName)
        );
    }
}
