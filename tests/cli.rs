mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::Value;

use common::{TestWorkspace, fixture_path};

fn dashboard_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sales-dashboard").expect("binary exists");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn retail_dir() -> String {
    fixture_path("retail").to_str().expect("utf-8 path").to_string()
}

#[test]
fn channels_csv_lists_every_weekday() {
    dashboard_cmd()
        .args([
            "--data-dir",
            &retail_dir(),
            "--format",
            "csv",
            "channels",
            "--store-type",
            "e-Shop",
        ])
        .assert()
        .success()
        .stdout(contains("section,key,series,value"))
        .stdout(contains("days,Monday,e-Shop,0"))
        .stdout(contains("days,Tuesday,e-Shop,281.5"))
        .stdout(contains("days,Thursday,e-Shop,88.4"))
        .stdout(contains("days,Sunday,e-Shop,0"));
}

#[test]
fn global_sales_json_contains_channel_and_country_series() {
    let output = dashboard_cmd()
        .args([
            "global-sales",
            "--start",
            "2013-01-20",
            "--end",
            "2013-02-05",
            "--data-dir",
            &retail_dir(),
            "--format",
            "json",
        ])
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["tab"], "global-sales");
    assert_eq!(json["range"]["start"], "2013-01-20");
    assert_eq!(json["revenue_by_channel"]["MBR"][0][0], "2013-01");
    assert_eq!(json["revenue_by_channel"]["MBR"][0][1], "36.3");
    assert_eq!(json["revenue_by_country"]["Germany"], "2210");
    assert!(json["revenue_by_country"].get("India").is_none());
}

#[test]
fn products_table_defaults_to_first_category() {
    dashboard_cmd()
        .args(["products", "--data-dir", &retail_dir()])
        .assert()
        .success()
        .stdout(contains("Revenue by subcategory: Clothing"))
        .stdout(contains("Kids"))
        .stdout(contains("Mens"));
}

#[test]
fn summary_reports_controls_and_matches() {
    let workspace = TestWorkspace::new();
    let report = workspace.path().join("summary.json");
    dashboard_cmd()
        .args([
            "summary",
            "--data-dir",
            &retail_dir(),
            "--format",
            "json",
            "-o",
            report.to_str().unwrap(),
        ])
        .assert()
        .success();
    let json: Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    assert_eq!(json["merge"]["rows"], 9);
    assert_eq!(json["merge"]["customer_matches"], 8);
    assert_eq!(json["options"]["store_types"][0], "e-Shop");
    assert_eq!(json["options"]["date_bounds"]["end"], "2013-03-02");
}

#[test]
fn layout_file_points_at_renamed_sources() {
    let workspace = TestWorkspace::new();
    let retail = fixture_path("retail");
    workspace.write(
        "layout.yml",
        &format!(
            "data_dir: {}\ncustomers: customers.csv\ntransactions_dir: transactions\n",
            retail.display()
        ),
    );
    dashboard_cmd()
        .args([
            "--layout",
            workspace.path().join("layout.yml").to_str().unwrap(),
            "channels",
            "--store-type",
            "MBR",
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(contains("days,Friday,MBR,12.1"))
        .stdout(contains("days,Sunday,MBR,36.3"));
}

#[test]
fn malformed_date_aborts_startup() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.write_dataset("0,X1,100,2013/13/45,4,1,1,10,1,11,MBR\n");
    dashboard_cmd()
        .args(["summary", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("part_1.csv").and(contains("not a date in DD-MM-YYYY or DD/MM/YYYY form")));
}

#[test]
fn missing_data_directory_is_reported() {
    let workspace = TestWorkspace::new();
    dashboard_cmd()
        .args([
            "summary",
            "--data-dir",
            workspace.path().join("absent").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}
