//! Tests for the extraction results.

use super::{
    Decompilation, Generator, HandlebarsReport, Json, Results, HTML_REPORT, JSON_REPORT,
};
use crate::{
    category::Category, decompression::UnpackStats, resources::CategoryCounts, Config,
};
use std::fs;

fn results(dir: &std::path::Path) -> Results {
    let package = dir.join("game.apk");
    fs::write(&package, b"not really a package").unwrap();
    let output = dir.join("extracted_game");
    fs::create_dir_all(output.join("textures")).unwrap();
    fs::write(output.join("textures/<bg>.png"), b"").unwrap();

    let mut results = Results::init(&package, &output).unwrap();
    let mut summary = CategoryCounts::new();
    let _ = summary.insert(Category::Textures, 1);
    let _ = summary.insert(Category::Audio, 0);
    results.set_summary(summary);
    results.set_unpack(UnpackStats {
        extracted: 3,
        skipped: 1,
    });
    results.set_decompiled(Decompilation::NotInstalled);
    results
}

#[test]
fn it_init() {
    let dir = tempfile::tempdir().unwrap();
    let results = results(dir.path());

    assert_eq!(results.apk_name(), "game.apk");
    assert_eq!(results.total_files(), 1);
    assert_eq!(results.category_count(Category::Textures), 1);
    assert_eq!(results.category_count(Category::Models), 0);

    assert!(Results::init(dir.path().join("missing.apk"), dir.path()).is_err());
}

#[test]
fn it_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let results = results(dir.path());

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["apk_name"], "game.apk");
    assert_eq!(json["summary"]["textures"], 1);
    assert_eq!(json["summary"]["audio"], 0);
    assert_eq!(json["unpack"]["skipped"], 1);
    assert_eq!(json["decompiled"], "not_installed");
    assert_eq!(json["tool_version"], env!("CARGO_PKG_VERSION"));
    assert!(json["extraction_date"].is_string());
    assert!(json["fingerprint"]["sha256"].is_string());
    assert!(json["nested_packages"].as_array().unwrap().is_empty());
}

#[test]
fn it_generate_report() {
    let dir = tempfile::tempdir().unwrap();
    let results = results(dir.path());

    let reports = results.generate_report(&Config::default());
    assert_eq!(reports.len(), 2);

    let output = dir.path().join("extracted_game");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(JSON_REPORT)).unwrap()).unwrap();
    assert_eq!(json["output_directory"], output.display().to_string());

    let html = fs::read_to_string(output.join(HTML_REPORT)).unwrap();
    assert!(html.contains("APK Extractor Report - game.apk"));
    assert!(html.contains("Textures: <strong>1</strong>"));
    assert!(html.contains("        &lt;bg&gt;.png"));
}

#[test]
fn it_generate_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let results = results(dir.path());
    let path = dir.path().join("extracted_game").join(JSON_REPORT);

    Json::new().generate(&Config::default(), &results).unwrap();

    // The whole report is on disk when the generator returns.
    let written = fs::read(&path).unwrap();
    assert_eq!(written, serde_json::to_vec_pretty(&results).unwrap());

    let missing = Results::init(dir.path().join("game.apk"), dir.path().join("missing")).unwrap();
    assert!(Json::new().generate(&Config::default(), &missing).is_err());
}

#[test]
fn it_render_custom_template() {
    let dir = tempfile::tempdir().unwrap();
    let results = results(dir.path());
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("report.hbs"),
        "{{apk_name}} {{total_files}} {{category_title \"unity_assets\"}}",
    )
    .unwrap();

    let report = HandlebarsReport::from_path(&templates).unwrap();
    assert_eq!(
        report.render(&results).unwrap(),
        "game.apk 1 Unity Assets"
    );
}
