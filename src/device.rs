//! Insulin delivery devices (pens and cartridges)
//!
//! The catalog is static apart from one custom device per insulin kind whose
//! capacity the user types in. A custom capacity of 0 means "not set yet".

use log::debug;
use serde::Serialize;

use crate::error::GlucoTrackError;
use crate::insulin::InsulinKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryDevice {
    pub id: String,
    pub display_name: String,
    pub kind: InsulinKind,
    pub capacity_units: f64,
    pub color_token: String,
}

impl DeliveryDevice {
    fn new(id: &str, display_name: &str, kind: InsulinKind, capacity_units: f64, color_token: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            kind,
            capacity_units,
            color_token: color_token.to_string(),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id == custom_id(self.kind)
    }
}

fn custom_id(kind: InsulinKind) -> &'static str {
    match kind {
        InsulinKind::Rapid => "custom-rapid",
        InsulinKind::Long => "custom-long",
    }
}

/// (id, name, kind, capacity, colour) of the standard devices
const STANDARD: [(&str, &str, InsulinKind, f64, &str); 8] = [
    ("novorapid-flexpen", "NovoRapid FlexPen", InsulinKind::Rapid, 300.0, "orange"),
    ("humalog-kwikpen", "Humalog KwikPen", InsulinKind::Rapid, 300.0, "burgundy"),
    ("humalog-u200-kwikpen", "Humalog U-200 KwikPen", InsulinKind::Rapid, 600.0, "gold"),
    ("fiasp-flextouch", "Fiasp FlexTouch", InsulinKind::Rapid, 300.0, "yellow"),
    ("lantus-solostar", "Lantus SoloStar", InsulinKind::Long, 300.0, "purple"),
    ("toujeo-solostar", "Toujeo SoloStar", InsulinKind::Long, 450.0, "green"),
    ("tresiba-flextouch-u200", "Tresiba FlexTouch U-200", InsulinKind::Long, 600.0, "lime"),
    ("levemir-flexpen", "Levemir FlexPen", InsulinKind::Long, 300.0, "teal"),
];

const DEFAULT_RAPID: usize = 0;
const DEFAULT_LONG: usize = 4;

fn standard(index: usize) -> DeliveryDevice {
    let (id, name, kind, capacity, color) = STANDARD[index];
    DeliveryDevice::new(id, name, kind, capacity, color)
}

fn custom(kind: InsulinKind) -> DeliveryDevice {
    let name = match kind {
        InsulinKind::Rapid => "Custom rapid-acting",
        InsulinKind::Long => "Custom long-acting",
    };
    DeliveryDevice::new(custom_id(kind), name, kind, 0.0, "gray")
}

#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    devices: Vec<DeliveryDevice>,
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        let mut devices: Vec<DeliveryDevice> = (0..STANDARD.len()).map(standard).collect();
        devices.extend(InsulinKind::ALL.into_iter().map(custom));
        Self { devices }
    }
}

impl DeviceCatalog {
    pub fn devices(&self) -> &[DeliveryDevice] {
        &self.devices
    }

    pub fn get(&self, id: &str) -> Result<&DeliveryDevice, GlucoTrackError> {
        self.devices
            .iter()
            .find(|device| device.id == id)
            .ok_or_else(|| GlucoTrackError::UnknownDevice(id.to_string()))
    }

    pub fn for_kind(&self, kind: InsulinKind) -> impl Iterator<Item = &DeliveryDevice> {
        self.devices.iter().filter(move |device| device.kind == kind)
    }

    /// Set the capacity of the custom device for `kind`
    pub fn set_custom_capacity(&mut self, kind: InsulinKind, capacity_units: f64) -> Result<(), GlucoTrackError> {
        if !capacity_units.is_finite() || capacity_units < 0.0 {
            return Err(GlucoTrackError::InvalidUnits(capacity_units.to_string()));
        }
        let id = custom_id(kind);
        let device = self
            .devices
            .iter_mut()
            .find(|device| device.id == id)
            .ok_or_else(|| GlucoTrackError::UnknownDevice(id.to_string()))?;
        device.capacity_units = capacity_units;
        debug!("Custom {} capacity set to {} units", kind.label(), capacity_units);
        Ok(())
    }
}

/// The device chosen for each insulin kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSelection {
    pub rapid: DeliveryDevice,
    pub long: DeliveryDevice,
}

impl DeviceSelection {
    pub fn from_catalog(catalog: &DeviceCatalog, rapid_id: &str, long_id: &str) -> Result<Self, GlucoTrackError> {
        Ok(Self {
            rapid: Self::pick(catalog, rapid_id, InsulinKind::Rapid)?,
            long: Self::pick(catalog, long_id, InsulinKind::Long)?,
        })
    }

    fn pick(catalog: &DeviceCatalog, id: &str, kind: InsulinKind) -> Result<DeliveryDevice, GlucoTrackError> {
        let device = catalog.get(id)?;
        if device.kind != kind {
            return Err(GlucoTrackError::Config(format!(
                "device '{}' holds {} insulin, not {}",
                id,
                device.kind.label(),
                kind.label()
            )));
        }
        Ok(device.clone())
    }

    pub fn device(&self, kind: InsulinKind) -> &DeliveryDevice {
        match kind {
            InsulinKind::Rapid => &self.rapid,
            InsulinKind::Long => &self.long,
        }
    }
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self {
            rapid: standard(DEFAULT_RAPID),
            long: standard(DEFAULT_LONG),
        }
    }
}
