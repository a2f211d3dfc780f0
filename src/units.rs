//! Measurement units and conversion between unit systems.

use crate::config::UnitSystem;
use crate::constants::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => units::CELSIUS,
            TemperatureUnit::Fahrenheit => units::FAHRENHEIT,
        }
    }

    /// Unit written to the output for the requested unit system
    pub fn target(self, system: UnitSystem) -> Self {
        match system {
            UnitSystem::AsIs => self,
            UnitSystem::Metric => TemperatureUnit::Celsius,
            UnitSystem::Imperial => TemperatureUnit::Fahrenheit,
        }
    }

    pub fn convert(self, value: f64, to: TemperatureUnit) -> f64 {
        match (self, to) {
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => (value - 32.0) * 5.0 / 9.0,
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => value * 9.0 / 5.0 + 32.0,
            _ => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IlluminanceUnit {
    Lux,
    LumenPerSqFt,
}

impl IlluminanceUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            IlluminanceUnit::Lux => units::LUX,
            IlluminanceUnit::LumenPerSqFt => units::LUMEN_PER_SQ_FT,
        }
    }

    pub fn target(self, system: UnitSystem) -> Self {
        match system {
            UnitSystem::AsIs => self,
            UnitSystem::Metric => IlluminanceUnit::Lux,
            UnitSystem::Imperial => IlluminanceUnit::LumenPerSqFt,
        }
    }

    pub fn convert(self, value: f64, to: IlluminanceUnit) -> f64 {
        match (self, to) {
            (IlluminanceUnit::LumenPerSqFt, IlluminanceUnit::Lux) => {
                value * units::LUX_PER_LUMEN_SQ_FT
            }
            (IlluminanceUnit::Lux, IlluminanceUnit::LumenPerSqFt) => {
                value / units::LUX_PER_LUMEN_SQ_FT
            }
            _ => value,
        }
    }
}
