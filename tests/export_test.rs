//! Tests for CSV export of filtered readings.
//!
//! Run with: cargo test --test export_test

mod common;

use home_monitor::pipeline::{self, CsvExporter, FilterCriteria, MotionFilter};

use common::{dataset_from, sample_dataset};

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn export_appends_derived_columns_in_input_order() {
    let dataset = sample_dataset();
    let view = pipeline::filter(
        &dataset,
        &FilterCriteria::all()
            .room("Kitchen")
            .motion(MotionFilter::Active),
    )
    .into_view()
    .unwrap();

    let exporter = CsvExporter::new(&dataset);
    let out = lines(&exporter.to_bytes(view.rows()).unwrap());

    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0],
        "Home_ID,DateTime,Temperature_C,Humidity_%,Light_Lux,Motion_Sensor,Room,\
         Appliance_Usage_kWh,HVAC_Usage_kWh,Water_Heater_kWh,Date,Hour,Total_Energy_kWh"
    );
    assert_eq!(
        out[1],
        "H1,2024-01-01 08:00:00,21.0,40.0,250.0,Active,Kitchen,1.2,,,2024-01-01,8,1.2"
    );
}

#[test]
fn export_rows_follow_view_order() {
    let dataset = sample_dataset();
    let view = pipeline::filter(&dataset, &FilterCriteria::all())
        .into_view()
        .unwrap();

    let exporter = CsvExporter::new(&dataset);
    let out = lines(&exporter.to_bytes(view.rows()).unwrap());

    assert_eq!(out.len(), 1 + dataset.len());
    let stamps: Vec<&str> = out[1..]
        .iter()
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    let mut sorted = stamps.clone();
    sorted.sort_unstable();
    assert_eq!(stamps, sorted);
}

#[test]
fn empty_selection_exports_header_only() {
    let dataset = sample_dataset();
    let exporter = CsvExporter::new(&dataset);

    let out = lines(&exporter.to_bytes(&[]).unwrap());
    assert_eq!(out.len(), 1);
    assert!(out[0].ends_with("Date,Hour,Total_Energy_kWh"));
}

#[test]
fn unknown_columns_are_carried_through() {
    let dataset = dataset_from(
        "Home_ID,Sensor_Batch,DateTime,Temperature_C,Humidity_%,Light_Lux,Motion_Sensor,Room,Appliance_Usage_kWh\n\
         H2,\"b-7, east\",2024-02-10 18:05:00,20.5,48,120,Inactive,Office,0.4\n",
    );
    let exporter = CsvExporter::new(&dataset);

    assert_eq!(
        exporter.header(),
        vec![
            "Home_ID",
            "Sensor_Batch",
            "DateTime",
            "Temperature_C",
            "Humidity_%",
            "Light_Lux",
            "Motion_Sensor",
            "Room",
            "Appliance_Usage_kWh",
            "Date",
            "Hour",
            "Total_Energy_kWh",
        ]
    );
    assert_eq!(
        exporter.record(&dataset.readings()[0]),
        vec![
            "H2",
            "b-7, east",
            "2024-02-10 18:05:00",
            "20.5",
            "48.0",
            "120.0",
            "Inactive",
            "Office",
            "0.4",
            "2024-02-10",
            "18",
            "0.4",
        ]
    );

    // Embedded commas are quoted on the way out
    let rows = exporter.rows_bytes(&[&dataset.readings()[0]]).unwrap();
    assert!(String::from_utf8(rows).unwrap().contains("\"b-7, east\""));
}

#[test]
fn derived_columns_in_input_are_not_duplicated() {
    let dataset = dataset_from(
        "Home_ID,DateTime,Temperature_C,Humidity_%,Light_Lux,Motion_Sensor,Room,Date,Hour,Total_Energy_kWh\n\
         H1,2024-01-01 06:00:00,18,50,0,Active,Hall,2024-01-01,6,2.5\n",
    );
    let exporter = CsvExporter::new(&dataset);
    let header = exporter.header();

    for derived in ["Date", "Hour", "Total_Energy_kWh"] {
        assert_eq!(header.iter().filter(|h| h.as_str() == derived).count(), 1);
    }
    let record = exporter.record(&dataset.readings()[0]);
    assert_eq!(record.len(), header.len());
    assert_eq!(record.last().map(String::as_str), Some("2.5"));
}

#[test]
fn missing_values_export_as_empty_cells() {
    let dataset = sample_dataset();
    let exporter = CsvExporter::new(&dataset);

    // Living Room at 23:15: temperature "abc", light blank, only HVAC present
    let late = dataset
        .readings()
        .iter()
        .find(|r| r.room == "Living Room" && r.hour == 23)
        .unwrap();
    assert_eq!(
        exporter.record(late).join(","),
        "H1,2024-01-03 23:15:00,,60.0,,Inactive,Living Room,,2.0,,2024-01-03,23,2.0"
    );
}

#[test]
fn fractional_seconds_survive_export() {
    let dataset = dataset_from(&format!(
        "{}\nH1,2024-01-01 08:00:00.500,21,40,250,Active,Kitchen,1.0,,\n",
        common::HEADER
    ));
    let exporter = CsvExporter::new(&dataset);

    assert_eq!(
        exporter.record(&dataset.readings()[0])[1],
        "2024-01-01 08:00:00.500"
    );
}
