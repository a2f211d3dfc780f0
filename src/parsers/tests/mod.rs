//! Test fixtures for the vendor parsers
//!
//! Each helper returns a realistic export as text; `create_temp_file` puts it
//! on disk so the parsers run against real files.

use std::io::Write;
use tempfile::NamedTempFile;

use crate::models::ParsedLoggerData;

mod ibutton_single_tests;

/// HOBO pendant export with temperature, light and device event columns
pub fn create_hobo_csv() -> String {
    r##""Plot Title: Pendant 20381207 "
"#","Date Time, GMT-05:00","Temp, °F (LGR S/N: 20381207, SEN S/N: 20381207)","Intensity, lum/ft² (LGR S/N: 20381207, SEN S/N: 20381207)","Coupler Detached (LGR S/N: 20381207)","Coupler Attached (LGR S/N: 20381207)","Host Connected (LGR S/N: 20381207)","Stopped (LGR S/N: 20381207)","End Of File (LGR S/N: 20381207)"
1,06/03/21 02:00:00 PM,71.600,21.5,Logged,,,,
2,06/03/21 03:00:00 PM,68.000,10.0,,,,,
3,06/03/21 03:05:00 PM,,,,Logged,,,
4,06/03/21 04:00:00 PM,50.000,0.0,,,Logged,Logged,Logged"##
        .to_string()
}

/// HOBO export with temperature and humidity only, no event columns
pub fn create_hobo_csv_without_events() -> String {
    r##""Plot Title: 10524617"
"#","Date Time, GMT+05:00","Temp, °C (LGR S/N: 10524617, SEN S/N: 10524617)","RH, % (LGR S/N: 10524617, SEN S/N: 10524617)"
1,2021/01/15 23:30:00,12.5,80.1
2,2021/01/16 00:00:00,12.0,81.7
3,not a date,11.8,82.0
4,2021/01/16 01:00:00,11.5,"##
        .to_string()
}

/// Ink-Bird export: 13 lines of device preamble then the column header
pub fn create_inkbird_txt() -> String {
    let mut lines: Vec<String> = vec![
        "IBS-TH2 Data Export".to_string(),
        "Device Name: Greenhouse North".to_string(),
        "Firmware: 1.0.4".to_string(),
        "Record Interval: 00:10:00".to_string(),
    ];
    while lines.len() < 13 {
        lines.push(format!("Info line {}", lines.len() + 1));
    }
    lines.push("   Time                 Temperature_C    Humidity_%".to_string());
    lines.push("2021-05-01 12:00:00   23.4   45.6".to_string());
    lines.push("2021-05-01 12:10:00   23.6   45.1".to_string());
    lines.push("".to_string());
    lines.push("2021-05-01 12:20:00   23.9".to_string());
    lines.join("\n")
}

/// Two iButton blocks separated by a two-line gap, closed by `-end-`
pub fn create_ibutton_multi_txt() -> String {
    "Date/time logger downloaded:,2019-08-22 13:47:50
Logger serial number:,5D00-0000-4B6F-D241
Date/Time,Temperature,Humidity
2019-07-01 00:00:00,21.50,65.30
2019-07-01 01:00:00,21.00,66.10


Date/time logger downloaded:,2019-08-22 13:50:10
Logger serial number:,\"A300-0000-1C2D-9E41\"
Date/Time,Temperature,Humidity,Battery
07-01-2019 00:00,19.25,70.00,3.1
07-01-2019 01:00,19.00,71.50,3.1
07-01-2019 02:00,18.75,
-end-
"
    .to_string()
}

/// Single iButton dump with human-readable timestamps and mixed units
pub fn create_ibutton_single_readable_txt() -> String {
    "Date/time logger downloaded: 2019/08/22 13:47:50
Serial No: 21-0000-0F3A-8841
Mission start: logged every 60 minutes
Date/Time,Unit,Value,Humidity
2019/07/01 00:00:00,C,21.5,40.0
2019/07/01 01:00:00,F,71.6,41.0
2019/07/01 02:00:00,C,
Download complete
"
    .to_string()
}

/// Hygrochron dump: a temperature section followed by a `%RH` section
pub fn create_hygrochron_single_txt() -> String {
    "Date/time logger downloaded: 2019/08/22 13:47:50
Serial No: 21-0000-0F3A-8841
Date/Time,Unit,Value
2019/07/01 00:00:00,C,21.5
2019/07/01 01:00:00,C,21.0
Date/Time,Unit,Value
2019/07/01 00:00:00,%RH,65.3
2019/07/01 01:00:00,%RH,66.1
2019/07/01 02:00:00,%RH,66.8
-end-
"
    .to_string()
}

/// Single iButton dump re-saved from a spreadsheet: Excel serial timestamps
pub fn create_ibutton_single_excel_txt() -> String {
    "Date/time logger downloaded: 43699.57
Serial No,4C00000012345621
1.5,C,20.0
43647.25,C,21.0
-end-
"
    .to_string()
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{}", content).unwrap();
    temp_file
}

/// Every environment row's decomposed columns agree with its timestamp
pub fn assert_timestamps_consistent(data: &ParsedLoggerData) {
    for reading in data.environment() {
        assert_eq!(reading.recombined_timestamp(), reading.timestamp);
    }
}

/// Units table lists exactly the populated measurement columns
pub fn assert_units_mirror_columns(data: &ParsedLoggerData) {
    for variable in crate::models::Variable::ALL {
        let populated = data
            .environment()
            .iter()
            .any(|r| r.value(variable).is_some());
        assert_eq!(data.units().contains(variable), populated, "{}", variable);
    }
}
