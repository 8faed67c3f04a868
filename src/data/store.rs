use std::path::Path;

use super::model::{Column, Dataset};
use crate::error::StoreError;

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: a header row naming the columns, then one row per task.
/// Every row must have as many fields as the header. Column types are inferred
/// per column (see [`Column::from_raw`]); rows are indexed in file order.
pub fn load_csv(path: &Path) -> Result<Dataset, StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        if record.len() != headers.len() {
            return Err(StoreError::RaggedRow {
                path: path.to_path_buf(),
                row: row_no + 1,
                expected: headers.len(),
                found: record.len(),
            });
        }
        for (col_idx, value) in record.iter().enumerate() {
            raw[col_idx].push(value.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| Column::from_raw(name, values))
        .collect();

    let dataset = Dataset::new(columns).map_err(|source| StoreError::Dataset {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.column_names(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Overwrite `path` with the whole dataset, creating parent directories first.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<(), StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(dataset.columns().iter().map(|c| c.name.as_str()))
        .map_err(csv_err)?;
    for pos in 0..dataset.len() {
        writer
            .write_record(dataset.row(pos).map(|v| v.to_csv_field()))
            .map_err(csv_err)?;
    }
    writer.flush()?;

    log::info!("Saved {} rows to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, ColumnType, Edit};
    use std::fs;

    const SAMPLE: &str = "\
State,Users,Notes,Pages,Legacy URL
Backlog,Jim,,3,https://example.org/a/b
Done,Sarah P,\"Moved, checked\",12,https://example.org/c
In Progress,,needs images,4.5,https://example.org/d/e/f
";

    #[test]
    fn load_infers_types_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, SAMPLE).unwrap();

        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column_names(),
            vec!["State", "Users", "Notes", "Pages", "Legacy URL"]
        );
        assert_eq!(ds.column("Pages").unwrap().dtype, ColumnType::Number);
        assert_eq!(ds.column("Notes").unwrap().values[0], CellValue::Null);
        assert_eq!(
            ds.column("Notes").unwrap().values[1],
            CellValue::from("Moved, checked")
        );
        assert_eq!(ds.index(), &[0, 1, 2]);
    }

    #[test]
    fn save_then_load_round_trips_cell_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, SAMPLE).unwrap();
        let ds = load_csv(&path).unwrap();

        let copy = dir.path().join("nested").join("folder").join("out.csv");
        save_csv(&ds, &copy).unwrap();
        let reloaded = load_csv(&copy).unwrap();
        assert_eq!(reloaded, ds);
        assert_eq!(fs::read_to_string(&copy).unwrap(), SAMPLE);
    }

    #[test]
    fn numeric_field_text_survives_save() {
        const PADDED: &str = "Jira Epic,Version,State\n007,1.50,Done\n042,2.10,Backlog\n";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, PADDED).unwrap();

        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.column("Version").unwrap().dtype, ColumnType::Number);
        save_csv(&ds, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), PADDED);
    }

    #[test]
    fn save_overwrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, SAMPLE).unwrap();
        let mut ds = load_csv(&path).unwrap();
        ds.apply_edit(&Edit {
            index: 0,
            column: "State".into(),
            text: "Done".into(),
        })
        .unwrap();
        save_csv(&ds.take(&[0]), &path).unwrap();

        let reloaded = load_csv(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.column("State").unwrap().values[0], CellValue::from("Done"));
    }

    #[test]
    fn ragged_rows_are_rejected_with_row_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "State,Users\nDone,Jim\nBacklog\n").unwrap();
        match load_csv(&path) {
            Err(StoreError::RaggedRow { row, expected, found, .. }) => {
                assert_eq!((row, expected, found), (2, 2, 1));
            }
            other => panic!("expected ragged row error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.csv");
        fs::write(&path, "State,State\nDone,Done\n").unwrap();
        assert!(matches!(load_csv(&path), Err(StoreError::Dataset { .. })));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_csv(&dir.path().join("absent.csv")).is_err());
    }
}
