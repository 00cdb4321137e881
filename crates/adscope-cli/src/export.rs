//! File export of raw or cleaned listings as CSV, JSON, or JSON lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use adscope_core::{CleanListing, RawListing};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// UTF-8 byte order mark; lets spreadsheet tools detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Jsonl => "jsonl",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "jsonl" | "ndjson" => Some(ExportFormat::Jsonl),
            _ => None,
        }
    }
}

/// Exportable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    PriceText,
    PriceRaw,
    PriceValue,
    Location,
    City,
    SubCategory,
    PriceBand,
    SourceCategory,
    PageIndex,
    ScrapedAt,
    Weekday,
    Hour,
    ImageUrl,
    ListingUrl,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Title,
        Column::PriceText,
        Column::PriceRaw,
        Column::PriceValue,
        Column::Location,
        Column::City,
        Column::SubCategory,
        Column::PriceBand,
        Column::SourceCategory,
        Column::PageIndex,
        Column::ScrapedAt,
        Column::Weekday,
        Column::Hour,
        Column::ImageUrl,
        Column::ListingUrl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::PriceText => "price_text",
            Column::PriceRaw => "price_raw",
            Column::PriceValue => "price_value",
            Column::Location => "location",
            Column::City => "city",
            Column::SubCategory => "sub_category",
            Column::PriceBand => "price_band",
            Column::SourceCategory => "source_category",
            Column::PageIndex => "page_index",
            Column::ScrapedAt => "scraped_at",
            Column::Weekday => "weekday",
            Column::Hour => "hour",
            Column::ImageUrl => "image_url",
            Column::ListingUrl => "listing_url",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// `true` for columns present on raw listings.
    pub fn is_raw(self) -> bool {
        !matches!(
            self,
            Column::PriceValue
                | Column::City
                | Column::SubCategory
                | Column::PriceBand
                | Column::Weekday
                | Column::Hour
        )
    }

    fn raw_columns() -> Vec<Column> {
        Self::ALL.into_iter().filter(|c| c.is_raw()).collect()
    }
}

/// Resolves a user column selection, keeping the given order.
///
/// An empty selection means every column available in the chosen mode.
///
/// # Errors
///
/// Returns an error naming the first unknown column, or the first derived
/// column requested for a raw export.
pub fn resolve_columns(names: &[String], raw: bool) -> anyhow::Result<Vec<Column>> {
    if names.is_empty() {
        return Ok(if raw {
            Column::raw_columns()
        } else {
            Column::ALL.to_vec()
        });
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let column = Column::from_name(name).ok_or_else(|| {
            let known: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
            anyhow::anyhow!("unknown column '{name}'; expected one of: {}", known.join(", "))
        })?;
        if raw && !column.is_raw() {
            anyhow::bail!("column '{name}' is only available for cleaned listings");
        }
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    Ok(columns)
}

/// One exportable row.
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Raw(&'a RawListing),
    Clean(&'a CleanListing),
}

impl<'a> Row<'a> {
    fn raw(self) -> &'a RawListing {
        match self {
            Row::Raw(raw) => raw,
            Row::Clean(clean) => &clean.raw,
        }
    }

    fn clean(self) -> Option<&'a CleanListing> {
        match self {
            Row::Raw(_) => None,
            Row::Clean(clean) => Some(clean),
        }
    }

    /// Value of `column`; `Null` for absent optional fields and for derived
    /// columns on raw rows.
    pub fn value(self, column: Column) -> Value {
        let raw = self.raw();
        let clean = self.clean();
        match column {
            Column::Title => Value::from(raw.title.as_str()),
            Column::PriceText => Value::from(raw.price_text.as_str()),
            Column::PriceRaw => opt_str(raw.price_raw.as_deref()),
            Column::PriceValue => clean.map_or(Value::Null, |c| Value::from(c.price_value)),
            Column::Location => Value::from(raw.location_text.as_str()),
            Column::City => clean.map_or(Value::Null, |c| Value::from(c.city.as_str())),
            Column::SubCategory => {
                clean.map_or(Value::Null, |c| Value::from(c.sub_category.as_str()))
            }
            Column::PriceBand => clean.map_or(Value::Null, |c| Value::from(c.price_band.as_str())),
            Column::SourceCategory => Value::from(raw.source_category.as_str()),
            Column::PageIndex => Value::from(raw.page_index),
            Column::ScrapedAt => Value::from(raw.scraped_at.to_rfc3339()),
            Column::Weekday => clean.map_or(Value::Null, |c| Value::from(c.weekday.as_str())),
            Column::Hour => clean.map_or(Value::Null, |c| Value::from(c.hour_of_day)),
            Column::ImageUrl => opt_str(raw.image_url.as_deref()),
            Column::ListingUrl => opt_str(raw.listing_url.as_deref()),
        }
    }
}

fn opt_str(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}

fn csv_cell(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Serializes a row as a JSON object with keys in column order.
struct RowView<'a> {
    row: Row<'a>,
    columns: &'a [Column],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column.name(), &self.row.value(*column))?;
        }
        map.end()
    }
}

/// Writes `rows` to `writer`.
///
/// # Errors
///
/// Returns an error if writing or serialization fails.
pub fn write_export<W: Write>(
    mut writer: W,
    format: ExportFormat,
    columns: &[Column],
    rows: &[Row<'_>],
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => {
            writer.write_all(UTF8_BOM)?;
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer.write_record(columns.iter().map(|c| c.name()))?;
            for row in rows {
                csv_writer.write_record(columns.iter().map(|c| csv_cell(row.value(*c))))?;
            }
            csv_writer.flush()?;
        }
        ExportFormat::Json => {
            let views: Vec<RowView<'_>> = rows
                .iter()
                .map(|row| RowView { row: *row, columns })
                .collect();
            serde_json::to_writer_pretty(&mut writer, &views)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        ExportFormat::Jsonl => {
            for row in rows {
                serde_json::to_writer(&mut writer, &RowView { row: *row, columns })?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Writes `rows` to a new file at `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_to_path(
    path: &Path,
    format: ExportFormat,
    columns: &[Column],
    rows: &[Row<'_>],
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", parent.display()))?;
    }
    let file = File::create(path)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", path.display()))?;
    write_export(BufWriter::new(file), format, columns, rows)
}

/// `<stem>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_file_name(stem: &str, at: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "{stem}_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
