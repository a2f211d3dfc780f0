//! Vendor token vocabulary and fixed format constants.
//!
//! Every string the parsers match against a vendor export lives here so a
//! change in a vendor's output format is a one-place edit.

// =============================================================================
// Normalized column names
// =============================================================================

pub mod columns {
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
    pub const DAY: &str = "Day";
    pub const HOUR: &str = "Hour";
    pub const MINUTE: &str = "Minute";
    pub const SECOND: &str = "Second";
    pub const TIMEZONE: &str = "Timezone";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const LOGGER_SERIAL: &str = "LoggerSerial";
    pub const TEMP: &str = "Temp";
    pub const RH: &str = "RH";
    pub const ILLUMINANCE: &str = "Illuminance";
    pub const EVENT_TYPE: &str = "EventType";
    pub const VARIABLE: &str = "Variable";
    pub const UNIT: &str = "Unit";
}

/// Canonical output format of the `Timestamp` column
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Unit strings
// =============================================================================

pub mod units {
    pub const CELSIUS: &str = "°C";
    pub const FAHRENHEIT: &str = "°F";
    pub const PERCENT: &str = "%";
    pub const LUX: &str = "lux";
    pub const LUMEN_PER_SQ_FT: &str = "lum/ft²";

    /// 1 lum/ft² (foot-candle) expressed in lux
    pub const LUX_PER_LUMEN_SQ_FT: f64 = 10.763_910_416_7;
}

// =============================================================================
// HOBO CSV export
// =============================================================================

pub mod hobo {
    /// Serial number token in the column header line
    pub const SERIAL_PATTERN: &str = r"S/N:\s*(\d+)";

    /// GMT offset token in the column header line
    pub const GMT_OFFSET_PATTERN: &str = r"GMT\s*([+-])(\d{1,2})(?::?(\d{2}))?";

    /// Substring marking the timestamp column
    pub const TIMESTAMP_COLUMN: &str = "Date Time";

    pub const TEMP_COLUMN: &str = "Temp";
    pub const RH_COLUMN: &str = "RH";
    pub const INTENSITY_COLUMN: &str = "Intensity";

    /// Temperature unit substrings, checked in this order
    pub const FAHRENHEIT_PATTERN: &str = r"°\s*F|\*F|(?:^|[\s,])F(?:$|[\s)])";
    pub const CELSIUS_PATTERN: &str = r"°\s*C|\*C|(?:^|[\s,])C(?:$|[\s)])";

    /// Light intensity unit substrings, checked in this order
    pub const LUMEN_PATTERN: &str = r"(?i)lum/ft";
    pub const LUX_PATTERN: &str = r"(?i)\blux\b";

    /// Device event column names emitted by HOBOware
    pub const EVENT_NAMES: [&str; 5] = [
        "Host Connected",
        "Coupler Detached",
        "Coupler Attached",
        "End Of File",
        "Stopped",
    ];

    /// Number of lines before the bulk data rows
    pub const HEADER_LINES: usize = 2;
}

// =============================================================================
// Ink-Bird text export
// =============================================================================

pub mod inkbird {
    /// Lines before the first data row
    pub const PREAMBLE_LINES: usize = 14;

    /// 1-based line holding the column headers
    pub const HEADER_LINE: usize = 14;

    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub const TEMP_COLUMN: &str = "Temp";
    pub const HUMIDITY_COLUMN: &str = "Humidity";
}

// =============================================================================
// iButton exports
// =============================================================================

pub mod ibutton {
    /// Marks the start of one device's dump
    pub const START_MARKER: &str = "Date/time logger downloaded:";

    /// End markers, checked in this order
    pub const END_MARKERS: [&str; 2] = ["download complete", "-end-"];

    /// Lines between the end of one block and the next start marker
    pub const BLOCK_GAP_LINES: usize = 2;

    /// Serial number line in multi-logger dumps
    pub const MULTI_SERIAL_LABEL: &str = "Logger serial number";

    /// Serial number line in single-logger dumps
    pub const SINGLE_SERIAL_LABEL: &str = "Serial No";

    /// First data row in a multi-logger block: temperature and humidity
    pub const DATA_ROW_PATTERN: &str = r"-?\d+\.\d+\s*,\s*-?\d+\.\d+";

    /// Multi-logger timestamp formats, tried in this order
    pub const MULTI_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%m-%d-%Y %H:%M"];

    /// Human-readable timestamp leading a single-logger data row
    pub const READABLE_TIMESTAMP_PATTERN: &str = r"^\s*\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}";
    pub const READABLE_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

    /// Bare Excel serial date at the start of a data row
    pub const EXCEL_SERIAL_PATTERN: &str = r"^\s*\d+(?:\.\d+)?\s*,";

    /// Unit token of a humidity section in Hygrochron dumps (`%RH`)
    pub const HUMIDITY_UNIT: &str = "RH";

    pub const DEFAULT_TIMEZONE: &str = "UTC";
}

// =============================================================================
// Excel serial dates
// =============================================================================

pub mod excel {
    pub const SECONDS_PER_DAY: f64 = 86_400.0;

    /// Day zero of the 1900 date system (accounts for the 1900 leap-year bug)
    pub const EPOCH_1900: (i32, u32, u32) = (1899, 12, 30);

    /// Day zero of the 1904 date system
    pub const EPOCH_1904: (i32, u32, u32) = (1904, 1, 1);
}

// =============================================================================
// Batch processing
// =============================================================================

/// Upper bound on concurrently parsed files
pub const MAX_CONCURRENT_FILES: usize = 16;
