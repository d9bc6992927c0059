use mushroom_segmenter::export::{CSV_HEADER, write_csv, write_csv_file, write_json, write_json_file};
use mushroom_segmenter::segmentation::Circle;
use serde_json::{Value, json};

fn sample() -> Vec<Circle> {
    vec![
        Circle {
            x: 10,
            y: 20,
            radius1: 15,
            radius2: 16,
        },
        Circle {
            x: 300,
            y: 7,
            radius1: 42,
            radius2: 40,
        },
    ]
}

#[test]
fn csv_has_header_and_one_row_per_circle() {
    let mut buf = Vec::new();
    write_csv(&sample(), &mut buf, true).expect("csv");
    let text = String::from_utf8(buf).expect("utf8");
    assert_eq!(text, "X,Y,Radius_1,Radius_2\n10,20,15,16\n300,7,42,40\n");
    assert_eq!(CSV_HEADER.join(","), text.lines().next().unwrap_or_default());
}

#[test]
fn csv_header_can_be_omitted() {
    let mut buf = Vec::new();
    write_csv(&sample()[..1], &mut buf, false).expect("csv");
    assert_eq!(String::from_utf8(buf).expect("utf8"), "10,20,15,16\n");
}

#[test]
fn empty_result_still_writes_header() {
    let mut buf = Vec::new();
    write_csv(&[], &mut buf, true).expect("csv");
    assert_eq!(String::from_utf8(buf).expect("utf8"), "X,Y,Radius_1,Radius_2\n");
}

#[test]
fn json_report_shape() {
    let mut buf = Vec::new();
    write_json(&sample(), &mut buf, None).expect("json");
    let value: Value = serde_json::from_slice(&buf).expect("parse");

    assert_eq!(value["count"], 2);
    assert_eq!(
        value["circles"][1],
        json!({ "x": 300, "y": 7, "radius_1": 42, "radius_2": 40 })
    );
    assert!(value.get("metadata").is_none());
}

#[test]
fn json_report_carries_metadata() {
    let meta = json!({ "input": "tray.png", "width": 640 });
    let mut buf = Vec::new();
    write_json(&[], &mut buf, Some(&meta)).expect("json");
    let value: Value = serde_json::from_slice(&buf).expect("parse");

    assert_eq!(value["count"], 0);
    assert_eq!(value["circles"], json!([]));
    assert_eq!(value["metadata"], meta);
}

#[test]
fn file_writers_create_missing_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("nested/out/results.csv");
    let json_path = dir.path().join("other/results.json");

    write_csv_file(&sample(), &csv_path, true).expect("csv file");
    write_json_file(&sample(), &json_path, None).expect("json file");

    let csv_text = std::fs::read_to_string(&csv_path).expect("read csv");
    assert_eq!(csv_text.lines().count(), 3);

    let json_text = std::fs::read_to_string(&json_path).expect("read json");
    assert!(json_text.ends_with('\n'));
    let parsed: Value = serde_json::from_str(&json_text).expect("parse");
    let circles: Vec<Circle> = serde_json::from_value(parsed["circles"].clone()).expect("circles");
    assert_eq!(circles, sample());
}
