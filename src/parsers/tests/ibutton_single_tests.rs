//! Tests for single-logger iButton dumps

use super::*;
use crate::config::{ExcelEpoch, IButtonConfig};
use crate::error::ReaderError;
use crate::models::Variable;
use crate::parsers::parse_ibutton_single;

#[test]
fn test_readable_timestamps_with_mixed_units() {
    let file = create_temp_file(&create_ibutton_single_readable_txt());
    let data = parse_ibutton_single(file.path(), &IButtonConfig::default()).unwrap();

    // The row without a temperature value is skipped
    let env = data.environment();
    assert_eq!(env.len(), 2);
    assert_eq!(env[0].timestamp, "2019-07-01 00:00:00");
    assert_eq!(env[0].temp, Some(21.5));
    assert_eq!(env[0].rh, Some(40.0));
    assert!((env[1].temp.unwrap() - 22.0).abs() < 1e-6);
    assert!(
        env.iter()
            .all(|r| r.logger_serial.as_deref() == Some("2100000F3A8841"))
    );
    assert!(env.iter().all(|r| r.timezone == "UTC"));

    assert_eq!(data.units().unit(Variable::Temp), Some("°C"));
    assert_eq!(data.units().unit(Variable::RH), Some("%"));
    assert!(data.warnings().is_empty());
    assert_timestamps_consistent(&data);
}

#[test]
fn test_humidity_section_merged_by_timestamp() {
    let file = create_temp_file(&create_hygrochron_single_txt());
    let data = parse_ibutton_single(file.path(), &IButtonConfig::default()).unwrap();

    let env = data.environment();
    assert_eq!(env.len(), 3);
    assert_eq!(env[0].timestamp, "2019-07-01 00:00:00");
    assert_eq!(env[0].temp, Some(21.5));
    assert_eq!(env[0].rh, Some(65.3));
    assert_eq!(env[1].temp, Some(21.0));
    assert_eq!(env[1].rh, Some(66.1));

    // Humidity without a matching temperature row stays a partial reading
    assert_eq!(env[2].timestamp, "2019-07-01 02:00:00");
    assert_eq!(env[2].temp, None);
    assert_eq!(env[2].rh, Some(66.8));

    assert_eq!(data.units().unit(Variable::Temp), Some("°C"));
    assert_eq!(data.units().unit(Variable::RH), Some("%"));
    assert!(data.warnings().is_empty());
    assert_units_mirror_columns(&data);
}

#[test]
fn test_unknown_unit_rows_are_dropped() {
    let content = create_hygrochron_single_txt().replace("%RH", "kPa");
    let file = create_temp_file(&content);
    let data = parse_ibutton_single(file.path(), &IButtonConfig::default()).unwrap();

    let env = data.environment();
    assert_eq!(env.len(), 2);
    assert!(env.iter().all(|r| r.rh.is_none()));
    assert_eq!(data.units().len(), 1);
    assert_eq!(data.warnings().len(), 1);
    assert!(data.warnings()[0].contains("kPa"));
}

#[test]
fn test_excel_serial_timestamps() {
    let file = create_temp_file(&create_ibutton_single_excel_txt());
    let data = parse_ibutton_single(file.path(), &IButtonConfig::default()).unwrap();

    let env = data.environment();
    assert_eq!(env.len(), 2);
    assert_eq!(env[0].timestamp, "1899-12-31 12:00:00");
    assert_eq!(env[1].timestamp, "2019-07-01 06:00:00");
    assert_eq!(env[0].logger_serial.as_deref(), Some("4C00000012345621"));

    // No humidity values anywhere, so only Temp has a unit
    assert_eq!(data.units().len(), 1);
    assert_units_mirror_columns(&data);
}

#[test]
fn test_excel_serial_with_1904_epoch() {
    let file = create_temp_file(&create_ibutton_single_excel_txt());
    let config = IButtonConfig::default().with_excel_epoch(ExcelEpoch::Epoch1904);
    let data = parse_ibutton_single(file.path(), &config).unwrap();

    assert_eq!(data.environment()[0].timestamp, "1904-01-02 12:00:00");
}

#[test]
fn test_missing_start_marker_reads_from_top() {
    let content = create_ibutton_single_readable_txt()
        .replace("Date/time logger downloaded: 2019/08/22 13:47:50", "Exported");
    let file = create_temp_file(&content);
    let data = parse_ibutton_single(file.path(), &IButtonConfig::default()).unwrap();

    assert_eq!(data.environment().len(), 2);
    assert_eq!(data.warnings().len(), 1);
}

#[test]
fn test_unrecognized_timestamps() {
    let content = "Date/time logger downloaded: yesterday
Serial No: 21-0000-0F3A-8841
July first,C,21.5
-end-
";
    let file = create_temp_file(content);
    let result = parse_ibutton_single(file.path(), &IButtonConfig::default());
    assert!(matches!(
        result,
        Err(ReaderError::UnrecognizedTimestamp { .. })
    ));
}

#[test]
fn test_missing_serial() {
    let content = create_ibutton_single_readable_txt().replace("Serial No: 21-0000-0F3A-8841", "");
    let file = create_temp_file(&content);
    let result = parse_ibutton_single(file.path(), &IButtonConfig::default());
    assert!(matches!(result, Err(ReaderError::MissingSerial { .. })));
}

#[test]
fn test_missing_end_marker() {
    let content = create_ibutton_single_excel_txt().replace("-end-", "");
    let file = create_temp_file(&content);
    let result = parse_ibutton_single(file.path(), &IButtonConfig::default());
    assert!(matches!(result, Err(ReaderError::MalformedFile { .. })));
}
