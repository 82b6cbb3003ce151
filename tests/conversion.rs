use std::fs;
use std::path::Path;

use drop_tower_k::ToolError;
use drop_tower_k::config::ConversionConfig;
use drop_tower_k::convert;
use drop_tower_k::io::excel_read;
use drop_tower_k::model::{LINEAR_COLUMNS, ROTATIONAL_COLUMNS, TIME_COLUMN};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn all_columns() -> Vec<&'static str> {
    let mut columns = vec![TIME_COLUMN];
    columns.extend(LINEAR_COLUMNS);
    columns.extend(ROTATIONAL_COLUMNS);
    columns
}

/// Writes a single-sheet workbook with the given headers and numeric rows.
fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<f64>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *header)
            .expect("header written");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_number((row_idx + 1) as u32, col_idx as u16, *value)
                .expect("cell written");
        }
    }
    workbook.save(path).expect("workbook saved");
}

fn config_in(dir: &Path) -> ConversionConfig {
    let mut config = ConversionConfig {
        output: dir.join("acceleration.k"),
        ..ConversionConfig::default()
    };
    config.plot.enabled = false;
    config
}

fn sample_rows() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.0, 0.1, 0.2, 0.3, 0.4, 0.5],
        vec![1.0, 1.5, 1.1, 1.2, 1.3, 1.4, 1.5],
        vec![2.0, -2.25, 2.1, 2.2, 2.3, 2.4, 2.5],
    ]
}

#[test]
fn workbook_converts_to_keyword_file() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    write_workbook(&xlsx_path, &all_columns(), &sample_rows());
    let config = config_in(temp_dir.path());

    let report = convert::workbook_to_keyword(&xlsx_path, 1000, &config).expect("conversion");
    assert_eq!(report.samples, 3);
    assert_eq!(report.end_time, 2.0);
    assert!(report.figures.is_empty());

    let written = fs::read_to_string(&config.output).expect("keyword file read");
    let lines: Vec<&str> = written.lines().collect();

    assert_eq!(lines[0], "*CONTROL_TERMINATION");
    assert_eq!(
        lines[2],
        "       2.0         0       0.0       0.01.000000E8         0"
    );
    assert_eq!(
        lines[5],
        "      1000         1         1         1       1.0         01.00000E28       0.0"
    );
    assert_eq!(&lines[11..14], &[
        "                 0.0                 0.0",
        "                 1.0                 1.5",
        "                 2.0               -2.25",
    ]);
    assert_eq!(
        lines
            .iter()
            .filter(|line| **line == "*DEFINE_CURVE_TITLE")
            .count(),
        6
    );
    assert_eq!(lines.last(), Some(&"*END"));

    // Every data row is exactly two 20 character fields.
    let data_rows = lines
        .iter()
        .filter(|line| line.starts_with("     ") && line.len() == 40);
    assert_eq!(data_rows.count(), 18);
}

#[test]
fn missing_column_fails_before_output_is_created() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    let headers: Vec<&str> = all_columns()
        .into_iter()
        .filter(|name| *name != "aac_z(rad/ms^2)")
        .collect();
    let rows: Vec<Vec<f64>> = sample_rows()
        .into_iter()
        .map(|mut row| {
            row.pop();
            row
        })
        .collect();
    write_workbook(&xlsx_path, &headers, &rows);
    let config = config_in(temp_dir.path());

    let error = convert::workbook_to_keyword(&xlsx_path, 1, &config).expect_err("load fails");

    assert!(matches!(
        error,
        ToolError::MissingColumns(ref missing) if missing == &["aac_z(rad/ms^2)"]
    ));
    assert!(!config.output.exists());
}

#[test]
fn termination_time_is_rounded_to_nine_decimals() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    let rows = vec![
        vec![0.0; 7],
        vec![0.1234567891234, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    ];
    write_workbook(&xlsx_path, &all_columns(), &rows);
    let config = config_in(temp_dir.path());

    convert::workbook_to_keyword(&xlsx_path, 5, &config).expect("conversion");

    let written = fs::read_to_string(&config.output).expect("keyword file read");
    let termination = written.lines().nth(2).expect("termination card");
    assert_eq!(&termination[..11], "0.123456789");
    assert!(written.contains("        0.1234567891                 1.0\n"));
}

#[test]
fn scale_factors_apply_per_table() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    write_workbook(&xlsx_path, &all_columns(), &sample_rows());
    let config = ConversionConfig {
        linear_scale: 1000.0,
        ..config_in(temp_dir.path())
    };

    convert::workbook_to_keyword(&xlsx_path, 1, &config).expect("conversion");

    let written = fs::read_to_string(&config.output).expect("keyword file read");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[12], "                 1.0              1500.0");
    assert_eq!(lines[13], "                 2.0             -2250.0");
    // Rotational values are left untouched.
    assert!(written.contains("                 1.0                 1.5\n"));
}

#[test]
fn loader_reads_named_columns_from_first_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    write_workbook(&xlsx_path, &all_columns(), &sample_rows());

    let (linear, rotational) = excel_read::read_tables(&xlsx_path).expect("tables read");

    assert_eq!(linear.time, vec![0.0, 1.0, 2.0]);
    assert_eq!(linear.channels[1].values, vec![0.1, 1.1, 2.1]);
    assert_eq!(rotational.channels[2].values, vec![0.5, 1.5, 2.5]);
}

#[test]
fn figures_are_written_next_to_keyword_file() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    write_workbook(&xlsx_path, &all_columns(), &sample_rows());
    let mut config = config_in(temp_dir.path());
    config.plot.enabled = true;
    config.plot.directory = temp_dir.path().to_path_buf();
    config.plot.dpi = 100;

    let report = convert::workbook_to_keyword(&xlsx_path, 1, &config).expect("conversion");

    let svg_path = temp_dir.path().join("acc.svg");
    let png_path = temp_dir.path().join("acc.png");
    assert_eq!(report.figures, vec![svg_path.clone(), png_path.clone()]);
    for path in [&svg_path, &png_path] {
        let metadata = fs::metadata(path).expect("figure exists");
        assert!(metadata.len() > 0, "{} is empty", path.display());
    }
    assert!(config.output.exists());
}

#[test]
fn workbook_without_samples_fails_before_figures_are_written() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("drop.xlsx");
    write_workbook(&xlsx_path, &all_columns(), &[]);
    let mut config = config_in(temp_dir.path());
    config.plot.enabled = true;
    config.plot.directory = temp_dir.path().to_path_buf();

    let error = convert::workbook_to_keyword(&xlsx_path, 1, &config).expect_err("no samples");

    assert!(matches!(error, ToolError::EmptyTable(_)));
    assert!(!temp_dir.path().join("acc.svg").exists());
    assert!(!temp_dir.path().join("acc.png").exists());
    assert!(!config.output.exists());
}
