//! Integration tests for the public reader API
//!
//! Writes one export per vendor format into a temporary directory and drives
//! the parsers, the batch runner and the frame export end to end.

use microclimate_readers::batch::{discover_files, parse_files};
use microclimate_readers::config::{
    BatchConfig, HoboConfig, IButtonConfig, InkBirdConfig, UnitSystem,
};
use microclimate_readers::{LoggerFormat, ReaderError, Variable, environment_table};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HOBO_EXPORT: &str = r##""Plot Title: 20381207"
"#","Date Time, GMT-04:00","Temp, °F (LGR S/N: 20381207, SEN S/N: 20381207)","RH, % (LGR S/N: 20381207, SEN S/N: 20381207)","Coupler Attached (LGR S/N: 20381207)","End Of File (LGR S/N: 20381207)"
1,07/10/19 10:00:00 AM,77.000,55.2,,
2,07/10/19 10:15:00 AM,78.800,54.9,,
3,07/10/19 10:20:00 AM,,,Logged,
4,07/10/19 10:30:00 AM,80.600,53.1,,Logged
"##;

const IBUTTON_DUMP: &str = "Date/time logger downloaded: 2019/08/22 13:47:50
Serial No: 21-0000-0F3A-8841
2019/07/01 00:00:00,C,21.5
2019/07/01 01:00:00,C,21.0
-end-
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// HOBO export end to end, including metric conversion and frame export
///
/// Purpose: Validate the full HOBO pipeline through the public API
#[test]
fn test_hobo_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "pendant.csv", HOBO_EXPORT);

    let format = LoggerFormat::Hobo(HoboConfig::default().with_unit_system(UnitSystem::Metric));
    let data = format.parse(&path).unwrap();

    assert_eq!(data.environment().len(), 3);
    assert_eq!(data.environment()[0].timezone, "Etc/GMT-4");
    assert!((data.environment()[0].temp.unwrap() - 25.0).abs() < 1e-9);
    assert_eq!(data.units().unit(Variable::Temp), Some("°C"));
    assert_eq!(data.events().unwrap().len(), 2);

    let env = data.environment_dataframe().unwrap();
    assert_eq!(env.height(), 3);
    assert!(env.column("Illuminance").is_err());

    let events = data.event_dataframe().unwrap().unwrap();
    assert_eq!(events.height(), 2);

    let units = data.units_dataframe().unwrap();
    assert_eq!(units.height(), 2);

    // Type-erased access to the same result
    assert_eq!(environment_table(&data).unwrap().len(), 3);
}

#[test]
fn test_environment_table_type_mismatch() {
    let table = vec![("Temp".to_string(), "°C".to_string())];
    assert!(matches!(
        environment_table(&table),
        Err(ReaderError::TypeMismatch { .. })
    ));
}

#[test]
fn test_parse_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "pendant.csv", HOBO_EXPORT);
    let format = LoggerFormat::Hobo(HoboConfig::default());

    assert_eq!(format.parse(&path).unwrap(), format.parse(&path).unwrap());
}

#[test]
fn test_inkbird_requires_preamble() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "inkbird.txt", "Time Temperature Humidity\n");

    let result = LoggerFormat::InkBird(InkBirdConfig::new("UTC")).parse(&path);
    assert!(matches!(result, Err(ReaderError::MalformedFile { .. })));
}

/// Batch parsing keeps input order and isolates per-file failures
#[tokio::test]
async fn test_batch_parse_in_input_order() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..6 {
        write_file(temp_dir.path(), &format!("logger_{}.txt", i), IBUTTON_DUMP);
    }
    write_file(temp_dir.path(), "logger_9.txt", "truncated dump");

    let pattern = temp_dir.path().join("logger_*.txt");
    let files = discover_files(&pattern.to_string_lossy()).unwrap();
    assert_eq!(files.len(), 7);

    let (outcomes, stats) = parse_files(
        files.clone(),
        LoggerFormat::IButtonSingle(IButtonConfig::default()),
        &BatchConfig::default().with_max_concurrent_files(3),
    )
    .await
    .unwrap();

    let returned: Vec<_> = outcomes.iter().map(|o| o.path.clone()).collect();
    assert_eq!(returned, files);
    assert!(outcomes[..6].iter().all(|o| o.result.is_ok()));
    assert!(matches!(
        outcomes[6].result,
        Err(ReaderError::MalformedFile { .. })
    ));
    assert_eq!(stats.files_processed, 6);
    assert_eq!(stats.total_rows, 12);
}
