use std::path::Path;

use anyhow::Context;
use fs_err::File;
use log::info;
use rust_xlsxwriter::Workbook;

use crate::{
    config::{OutputConfig, OutputFormat},
    fs_util::write_json_pretty,
    schema::{Column, Record},
};

/// Writes the header row followed by one row per record, in the given order.
pub fn write(records: &[Record], output: &OutputConfig) -> anyhow::Result<()> {
    let path = &output.path;
    let format = output.resolved_format();
    let result = match format {
        OutputFormat::Xlsx => write_xlsx(records, path, &output.sheet_name),
        OutputFormat::Csv => write_csv(records, path),
        OutputFormat::Json => write_json_pretty(path, &records),
    };
    result.with_context(|| format!("While saving {} records to {path:?}", records.len()))?;
    info!("Saved {} records to {path:?} as {format:?}", records.len());
    Ok(())
}

pub fn write_xlsx(records: &[Record], path: &Path, sheet_name: &str) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;
    for (col, label) in (0..).zip(Column::labels()) {
        worksheet.write_string(0, col, label)?;
    }
    for (row, record) in (1..).zip(records) {
        for (col, cell) in (0..).zip(record.cells()) {
            worksheet.write_string(row, col, cell)?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

pub fn write_csv(records: &[Record], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record(Column::labels())?;
    for record in records {
        writer.write_record(record.cells())?;
    }
    writer.flush()?;
    Ok(())
}
