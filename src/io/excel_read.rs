use std::collections::HashMap;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::model::{ChannelGroup, TIME_COLUMN, TimeSeriesTable};

/// Rows shown when previewing the imported data.
const PREVIEW_ROWS: usize = 5;

/// Reads the linear and rotational acceleration tables from the first sheet
/// of a drop tower workbook.
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn read_tables(path: &Path) -> Result<(TimeSeriesTable, TimeSeriesTable)> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_first_sheet(&mut workbook)?;
    let (linear, rotational) = tables_from_range(&range)?;

    info!(
        rows = linear.len(),
        "check data being imported:\n{}\n{}",
        linear.head(PREVIEW_ROWS),
        rotational.head(PREVIEW_ROWS)
    );
    Ok((linear, rotational))
}

fn read_first_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
) -> Result<Range<DataType>> {
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ToolError::InvalidWorkbook("workbook contains no sheets".into()))?;
    debug!(sheet = %name, "reading worksheet");
    let range_result = workbook
        .worksheet_range(&name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Splits a sheet into the two tables. The first row holds the headers.
pub fn tables_from_range(range: &Range<DataType>) -> Result<(TimeSeriesTable, TimeSeriesTable)> {
    let headers: HashMap<String, usize> = match range.rows().next() {
        Some(first_row) => first_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| (cell_to_string(Some(cell)).trim().to_string(), idx))
            .collect(),
        None => HashMap::new(),
    };

    let required = std::iter::once(TIME_COLUMN)
        .chain(ChannelGroup::ALL.into_iter().flat_map(ChannelGroup::columns));
    let missing: Vec<String> = required
        .filter(|name| !headers.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::MissingColumns(missing));
    }

    let time_idx = headers[TIME_COLUMN];
    let mut tables = ChannelGroup::ALL.map(|group| {
        let indices = group.columns().map(|name| headers[name]);
        (TimeSeriesTable::new(group), indices)
    });

    for (row_idx, row) in range.rows().enumerate().skip(1) {
        let time_cell = row.get(time_idx);
        if is_blank(time_cell) {
            continue;
        }
        let time = cell_to_number(time_cell, TIME_COLUMN, row_idx)?;

        for (table, indices) in &mut tables {
            let mut values = [f64::NAN; 3];
            for (slot, (col_idx, name)) in values
                .iter_mut()
                .zip(indices.iter().zip(table.group.columns()))
            {
                *slot = cell_to_number(row.get(*col_idx), name, row_idx)?;
            }
            table.push_row(time, values);
        }
    }

    let [(linear, _), (rotational, _)] = tables;
    debug!(
        linear_rows = linear.len(),
        rotational_rows = rotational.len(),
        "tables extracted"
    );
    Ok((linear, rotational))
}

fn cell_to_number(cell: Option<&DataType>, column: &str, row: usize) -> Result<f64> {
    let invalid = |value: String| ToolError::InvalidCell {
        column: column.to_string(),
        row: row + 1,
        value,
    };
    match cell {
        Some(DataType::Float(value)) => Ok(*value),
        Some(DataType::Int(value)) => Ok(*value as f64),
        Some(DataType::String(value)) if value.trim().is_empty() => Ok(f64::NAN),
        Some(DataType::String(value)) => value.trim().parse().map_err(|_| invalid(value.clone())),
        Some(DataType::Empty) | None => Ok(f64::NAN),
        Some(other) => Err(invalid(other.to_string())),
    }
}

fn is_blank(cell: Option<&DataType>) -> bool {
    match cell {
        Some(DataType::Empty) | None => true,
        Some(DataType::String(value)) => value.trim().is_empty(),
        Some(_) => false,
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
