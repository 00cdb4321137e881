use adscope_core::PriceBand;
use chrono::{NaiveDate, TimeZone, Utc};

use super::*;

fn raw_listing(title: &str, image_url: Option<&str>) -> RawListing {
    RawListing {
        title: title.to_owned(),
        price_text: "15 000 CFA".to_owned(),
        price_raw: Some("15000".to_owned()),
        location_text: "DKR, Plateau".to_owned(),
        image_url: image_url.map(str::to_owned),
        listing_url: Some("https://sn.coinafrique.com/annonce/x-1".to_owned()),
        source_category: "vetements-homme".to_owned(),
        page_index: 2,
        scraped_at: Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap(),
    }
}

fn clean_listing(title: &str) -> CleanListing {
    CleanListing {
        raw: raw_listing(title, None),
        price_value: 15_000,
        city: "Dakar".to_owned(),
        sub_category: "Shirts".to_owned(),
        price_band: PriceBand::Low,
        weekday: "Monday".to_owned(),
        hour_of_day: 10,
    }
}

fn render(format: ExportFormat, columns: &[Column], rows: &[Row<'_>]) -> String {
    let mut buf = Vec::new();
    write_export(&mut buf, format, columns, rows).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn resolve_columns_defaults() {
    assert_eq!(resolve_columns(&[], false).unwrap(), Column::ALL.to_vec());
    let raw = resolve_columns(&[], true).unwrap();
    assert!(raw.iter().all(|c| c.is_raw()));
    assert!(!raw.contains(&Column::City));
    assert!(raw.contains(&Column::PriceRaw));
}

#[test]
fn resolve_columns_keeps_order_and_drops_duplicates() {
    let names = vec![
        "city".to_owned(),
        " title ".to_owned(),
        "city".to_owned(),
        "price_value".to_owned(),
    ];
    assert_eq!(
        resolve_columns(&names, false).unwrap(),
        vec![Column::City, Column::Title, Column::PriceValue]
    );
}

#[test]
fn resolve_columns_rejects_unknown_name() {
    let err = resolve_columns(&["prix".to_owned()], false).unwrap_err();
    assert!(err.to_string().contains("unknown column 'prix'"));
}

#[test]
fn resolve_columns_rejects_derived_column_in_raw_mode() {
    let err = resolve_columns(&["price_band".to_owned()], true).unwrap_err();
    assert!(err.to_string().contains("only available for cleaned listings"));
}

#[test]
fn csv_starts_with_bom_and_preserves_accents() {
    let listing = clean_listing("Boubou brodé à la main");
    let out = render(
        ExportFormat::Csv,
        &[Column::Title, Column::PriceValue, Column::PriceBand],
        &[Row::Clean(&listing)],
    );
    assert!(out.starts_with('\u{feff}'));
    let body = out.trim_start_matches('\u{feff}');
    assert_eq!(
        body,
        "title,price_value,price_band\nBoubou brodé à la main,15000,Low\n"
    );
}

#[test]
fn csv_leaves_absent_values_blank() {
    let listing = raw_listing("Chemise", None);
    let out = render(
        ExportFormat::Csv,
        &[Column::Title, Column::ImageUrl, Column::PageIndex],
        &[Row::Raw(&listing)],
    );
    assert!(out.ends_with("Chemise,,2\n"), "got: {out:?}");
}

#[test]
fn json_array_keeps_column_order_and_non_ascii() {
    let listing = clean_listing("Robe pagne élégante");
    let out = render(
        ExportFormat::Json,
        &[Column::City, Column::Title, Column::Hour],
        &[Row::Clean(&listing)],
    );
    assert!(out.contains("élégante"));
    let city = out.find("\"city\"").unwrap();
    let title = out.find("\"title\"").unwrap();
    let hour = out.find("\"hour\"").unwrap();
    assert!(city < title && title < hour);

    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["hour"], 10);
    assert_eq!(parsed[0]["city"], "Dakar");
}

#[test]
fn jsonl_writes_one_object_per_line() {
    let a = raw_listing("Chemise", Some("https://images.coinafrique.com/1.jpg"));
    let b = raw_listing("Pantalon", None);
    let out = render(
        ExportFormat::Jsonl,
        &[Column::Title, Column::ImageUrl, Column::ScrapedAt],
        &[Row::Raw(&a), Row::Raw(&b)],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["title"], "Pantalon");
    assert!(second["image_url"].is_null());
    assert_eq!(second["scraped_at"], "2024-03-04T10:30:00+00:00");
}

#[test]
fn derived_columns_are_null_for_raw_rows() {
    let listing = raw_listing("Chemise", None);
    assert!(Row::Raw(&listing).value(Column::City).is_null());
    assert_eq!(Row::Raw(&listing).value(Column::PriceRaw), "15000");
}

#[test]
fn empty_csv_still_has_header() {
    let out = render(ExportFormat::Csv, &[Column::Title, Column::City], &[]);
    assert_eq!(out.trim_start_matches('\u{feff}'), "title,city\n");
}

#[test]
fn default_file_name_format() {
    let at = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 5, 7)
        .unwrap();
    assert_eq!(
        default_file_name("vetements-homme", at, ExportFormat::Jsonl),
        "vetements-homme_20240304_090507.jsonl"
    );
}

#[test]
fn format_from_path_extension() {
    assert_eq!(
        ExportFormat::from_path(Path::new("out/data.CSV")),
        Some(ExportFormat::Csv)
    );
    assert_eq!(
        ExportFormat::from_path(Path::new("data.ndjson")),
        Some(ExportFormat::Jsonl)
    );
    assert_eq!(ExportFormat::from_path(Path::new("data.xlsx")), None);
    assert_eq!(ExportFormat::from_path(Path::new("data")), None);
}
