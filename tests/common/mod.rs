#![allow(dead_code)]

use std::path::PathBuf;

use home_monitor::pipeline::{Dataset, IngestOptions, ingest_csv};

pub const HEADER: &str = "Home_ID,DateTime,Temperature_C,Humidity_%,Light_Lux,Motion_Sensor,Room,Appliance_Usage_kWh,HVAC_Usage_kWh,Water_Heater_kWh";

/// Five valid rows out of order, plus one with an unparseable timestamp.
pub const SAMPLE_CSV: &str = "\
Home_ID,DateTime,Temperature_C,Humidity_%,Light_Lux,Motion_Sensor,Room,Appliance_Usage_kWh,HVAC_Usage_kWh,Water_Heater_kWh
H1,2024-01-02 09:00:00,21.5,45,300,Inactive,Kitchen,0.8,,
H1,2024-01-01 08:00:00,21.0,40,250,Active,Kitchen,1.2,,
H1,2024-01-01 08:30:00,19.0,55,100,Active,Bedroom,0.5,1.0,0.25
H1,not-a-date,20.0,50,100,Active,Bedroom,1,1,1
H1,2024-01-03 23:15:00,abc,60,,Inactive,Living Room,,2.0,
H1,2024-01-03 07:45:00,22.0,,400,Active,Living Room,0.3,,x
";

pub fn dataset_from(csv: &str) -> Dataset {
    ingest_csv(csv.as_bytes(), &IngestOptions::default()).expect("fixture should ingest")
}

pub fn sample_dataset() -> Dataset {
    dataset_from(SAMPLE_CSV)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Write `contents` to a unique file under the system temp dir.
pub fn write_temp_csv(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("home-monitor-{}.csv", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).expect("temp file should be writable");
    path
}
