//! Normalized result of parsing one logger export.
//!
//! Every parser produces a [`ParsedLoggerData`]: an environment table of
//! sensor readings, an optional device-event table and a units table that
//! mirrors which measurement columns are populated.

use crate::constants::columns;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement variables a logger can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    Temp,
    RH,
    Illuminance,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Temp, Variable::RH, Variable::Illuminance];

    pub fn column_name(&self) -> &'static str {
        match self {
            Variable::Temp => columns::TEMP,
            Variable::RH => columns::RH,
            Variable::Illuminance => columns::ILLUMINANCE,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One sensor reading in the environment table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub timezone: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    /// Absent only for formats that carry no serial number
    pub logger_serial: Option<String>,
    pub temp: Option<f64>,
    pub rh: Option<f64>,
    pub illuminance: Option<f64>,
}

impl EnvironmentReading {
    pub fn value(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Temp => self.temp,
            Variable::RH => self.rh,
            Variable::Illuminance => self.illuminance,
        }
    }

    /// Rebuild the canonical timestamp from the decomposed columns
    pub fn recombined_timestamp(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Device-generated events recorded by HOBO loggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    HostConnected,
    CouplerDetached,
    CouplerAttached,
    EndOfFile,
    Stopped,
}

impl EventType {
    /// Match a header token against the vendor event vocabulary
    pub fn from_header(header: &str) -> Option<Self> {
        use crate::constants::hobo::EVENT_NAMES;
        let index = EVENT_NAMES.iter().position(|name| header.contains(name))?;
        Some(match index {
            0 => EventType::HostConnected,
            1 => EventType::CouplerDetached,
            2 => EventType::CouplerAttached,
            3 => EventType::EndOfFile,
            _ => EventType::Stopped,
        })
    }

    pub fn as_str(&self) -> &'static str {
        use crate::constants::hobo::EVENT_NAMES;
        match self {
            EventType::HostConnected => EVENT_NAMES[0],
            EventType::CouplerDetached => EVENT_NAMES[1],
            EventType::CouplerAttached => EVENT_NAMES[2],
            EventType::EndOfFile => EVENT_NAMES[3],
            EventType::Stopped => EVENT_NAMES[4],
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the device-event table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub timestamp: String,
    pub event_type: EventType,
    pub logger_serial: String,
}

/// Variable to unit mapping for the populated measurement columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsTable {
    entries: Vec<(Variable, String)>,
}

impl UnitsTable {
    /// Project the units of every variable populated in `readings`.
    ///
    /// `unit_of` supplies the unit actually written to the table, i.e. after
    /// any conversion.
    pub fn from_readings(
        readings: &[EnvironmentReading],
        unit_of: impl Fn(Variable) -> Option<String>,
    ) -> Self {
        let entries = Variable::ALL
            .into_iter()
            .filter(|variable| readings.iter().any(|r| r.value(*variable).is_some()))
            .filter_map(|variable| unit_of(variable).map(|unit| (variable, unit)))
            .collect();
        Self { entries }
    }

    pub fn unit(&self, variable: Variable) -> Option<&str> {
        self.entries
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|(_, unit)| unit.as_str())
    }

    pub fn contains(&self, variable: Variable) -> bool {
        self.unit(variable).is_some()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.entries.iter().map(|(v, _)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, &str)> + '_ {
        self.entries.iter().map(|(v, u)| (*v, u.as_str()))
    }
}

/// Normalized output of one parse call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLoggerData {
    environment_table: Vec<EnvironmentReading>,
    event_table: Option<Vec<DeviceEvent>>,
    units_table: UnitsTable,
    warnings: Vec<String>,
    file_metadata: Vec<(String, String)>,
}

impl ParsedLoggerData {
    pub(crate) fn new(
        environment_table: Vec<EnvironmentReading>,
        event_table: Option<Vec<DeviceEvent>>,
        units_table: UnitsTable,
    ) -> Self {
        Self {
            environment_table,
            event_table,
            units_table,
            warnings: Vec::new(),
            file_metadata: Vec::new(),
        }
    }

    pub(crate) fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub(crate) fn with_file_metadata(mut self, metadata: Vec<(String, String)>) -> Self {
        self.file_metadata = metadata;
        self
    }

    pub fn environment(&self) -> &[EnvironmentReading] {
        &self.environment_table
    }

    /// `None` when the format carries no device events
    pub fn events(&self) -> Option<&[DeviceEvent]> {
        self.event_table.as_deref()
    }

    pub fn units(&self) -> &UnitsTable {
        &self.units_table
    }

    /// Non-fatal anomalies met while parsing
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn file_metadata(&self) -> &[(String, String)] {
        &self.file_metadata
    }

    /// Environment table as a polars frame; unpopulated measurement columns are omitted
    pub fn environment_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.environment_table;
        let mut frame_columns = vec![
            Column::new(
                columns::YEAR.into(),
                rows.iter().map(|r| r.year).collect::<Vec<i32>>(),
            ),
            Column::new(
                columns::MONTH.into(),
                rows.iter().map(|r| r.month).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::DAY.into(),
                rows.iter().map(|r| r.day).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::HOUR.into(),
                rows.iter().map(|r| r.hour).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::MINUTE.into(),
                rows.iter().map(|r| r.minute).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::SECOND.into(),
                rows.iter().map(|r| r.second).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::TIMEZONE.into(),
                rows.iter().map(|r| r.timezone.clone()).collect::<Vec<String>>(),
            ),
            Column::new(
                columns::TIMESTAMP.into(),
                rows.iter().map(|r| r.timestamp.clone()).collect::<Vec<String>>(),
            ),
            Column::new(
                columns::LOGGER_SERIAL.into(),
                rows.iter()
                    .map(|r| r.logger_serial.clone())
                    .collect::<Vec<Option<String>>>(),
            ),
        ];

        for variable in self.units_table.variables() {
            frame_columns.push(Column::new(
                variable.column_name().into(),
                rows.iter()
                    .map(|r| r.value(variable))
                    .collect::<Vec<Option<f64>>>(),
            ));
        }

        Ok(DataFrame::new(frame_columns)?)
    }

    /// Event table as a polars frame, `None` when there is no event table
    pub fn event_dataframe(&self) -> Result<Option<DataFrame>> {
        let Some(events) = &self.event_table else {
            return Ok(None);
        };

        let frame = DataFrame::new(vec![
            Column::new(
                columns::TIMESTAMP.into(),
                events.iter().map(|e| e.timestamp.clone()).collect::<Vec<String>>(),
            ),
            Column::new(
                columns::EVENT_TYPE.into(),
                events
                    .iter()
                    .map(|e| e.event_type.as_str().to_string())
                    .collect::<Vec<String>>(),
            ),
            Column::new(
                columns::LOGGER_SERIAL.into(),
                events
                    .iter()
                    .map(|e| e.logger_serial.clone())
                    .collect::<Vec<String>>(),
            ),
        ])?;

        Ok(Some(frame))
    }

    pub fn units_dataframe(&self) -> Result<DataFrame> {
        let frame = DataFrame::new(vec![
            Column::new(
                columns::VARIABLE.into(),
                self.units_table
                    .iter()
                    .map(|(v, _)| v.column_name().to_string())
                    .collect::<Vec<String>>(),
            ),
            Column::new(
                columns::UNIT.into(),
                self.units_table
                    .iter()
                    .map(|(_, u)| u.to_string())
                    .collect::<Vec<String>>(),
            ),
        ])?;
        Ok(frame)
    }
}
