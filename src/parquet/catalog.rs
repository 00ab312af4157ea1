//! Save a raster catalog to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, BooleanBuilder, Date32Builder, Int32Builder, StringBuilder, UInt32Builder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::catalog::CatalogEntry;

// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn save_catalog(entries: &[CatalogEntry], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("file_name", DataType::Utf8, false),
        Field::new("full_path", DataType::Utf8, false),
        Field::new("variable", DataType::Utf8, true),
        Field::new("temporal_kind", DataType::Utf8, true),
        Field::new("resolution", DataType::Utf8, true),
        Field::new("status", DataType::Utf8, true),
        Field::new("date", DataType::Date32, true),
        Field::new("day", DataType::UInt32, true),
        Field::new("month", DataType::UInt32, true),
        Field::new("year", DataType::Int32, true),
        Field::new("parsable", DataType::Boolean, false),
        Field::new("parse_failure", DataType::Utf8, true),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let rows = entries.len();
    let mut file_names = StringBuilder::with_capacity(rows, rows * 48);
    let mut full_paths = StringBuilder::with_capacity(rows, rows * 96);
    let mut variables = StringBuilder::with_capacity(rows, rows * 6);
    let mut kinds = StringBuilder::with_capacity(rows, rows * 16);
    let mut resolutions = StringBuilder::with_capacity(rows, rows * 4);
    let mut statuses = StringBuilder::with_capacity(rows, rows * 12);
    let mut dates = Date32Builder::with_capacity(rows);
    let mut days = UInt32Builder::with_capacity(rows);
    let mut months = UInt32Builder::with_capacity(rows);
    let mut years = Int32Builder::with_capacity(rows);
    let mut parsables = BooleanBuilder::with_capacity(rows);
    let mut failures = StringBuilder::with_capacity(rows, rows * 32);

    for entry in entries {
        let md = &entry.metadata;
        let details = md.date_details();

        file_names.append_value(&entry.file_name);
        full_paths.append_value(entry.full_path.to_string_lossy());
        variables.append_option(md.variable());
        kinds.append_option(md.temporal_kind().map(|k| k.as_str()));
        resolutions.append_option(md.resolution().map(|r| r.as_str()));
        statuses.append_option(md.status().map(|s| s.as_str()));
        dates.append_option(md.date().map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE));
        days.append_option(details.and_then(|d| d.day()));
        months.append_option(details.and_then(|d| d.month()));
        years.append_option(details.and_then(|d| d.year()));
        parsables.append_value(md.is_parsable());
        failures.append_option(md.parse_failure().map(|f| f.to_string()));
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(file_names.finish()),
        Arc::new(full_paths.finish()),
        Arc::new(variables.finish()),
        Arc::new(kinds.finish()),
        Arc::new(resolutions.finish()),
        Arc::new(statuses.finish()),
        Arc::new(dates.finish()),
        Arc::new(days.finish()),
        Arc::new(months.finish()),
        Arc::new(years.finish()),
        Arc::new(parsables.finish()),
        Arc::new(failures.finish()),
    ];

    let batch = RecordBatch::try_new(schema, columns)?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
