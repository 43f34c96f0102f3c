use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::DatasetError;

use super::{Dataset, Field, Record};

/// Loads a dataset from a file with a header row.
///
/// # Errors
///
/// Returns an error when the file cannot be read, a required field is
/// missing or blank, or no usable record remains.
pub fn load_dataset_file(
    name: &str,
    path: &Path,
    required: &[Field],
) -> Result<Dataset, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|err| DatasetError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    load_dataset(name, content.as_bytes(), required)
}

/// Loads a dataset from any reader yielding delimited text with a header row.
/// The delimiter is `;` when the header contains one, `,` otherwise.
///
/// # Errors
///
/// Returns an error when the content is not valid delimited text, a required
/// field is missing or blank, or no usable record remains.
pub fn load_dataset<R>(name: &str, mut source: R, required: &[Field]) -> Result<Dataset, DatasetError>
where
    R: Read,
{
    let mut content = String::new();
    source
        .read_to_string(&mut content)
        .map_err(|err| DatasetError::Parse {
            dataset: name.to_owned(),
            source: csv::Error::from(err),
        })?;

    let header_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| DatasetError::Empty {
            dataset: name.to_owned(),
        })?;
    let delimiter = detect_delimiter(header_line);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| DatasetError::Parse {
            dataset: name.to_owned(),
            source: err,
        })?
        .iter()
        .map(clean)
        .collect();

    for field in required {
        if let Field::Named(column) = field
            && !headers
                .iter()
                .any(|header| header.eq_ignore_ascii_case(column))
        {
            return Err(DatasetError::MissingColumn {
                dataset: name.to_owned(),
                field: (*column).to_owned(),
            });
        }
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|err| DatasetError::Parse {
            dataset: name.to_owned(),
            source: err,
        })?;
        let values: Vec<String> = row.iter().map(clean).collect();
        if values.iter().all(String::is_empty) {
            continue;
        }
        let line = row.position().map_or(0, csv::Position::line);

        let fields = values
            .into_iter()
            .enumerate()
            .map(|(position, value)| {
                let header = headers
                    .get(position)
                    .cloned()
                    .unwrap_or_else(|| format!("column{}", position));
                (header, value)
            })
            .collect();
        let record = Record::new(fields);

        for field in required {
            let present = record.field(*field).is_some_and(|value| !value.is_empty());
            if !present {
                return Err(DatasetError::MalformedRecord {
                    dataset: name.to_owned(),
                    line,
                    field: describe(*field, &headers),
                });
            }
        }
        records.push(record);
    }

    debug!("Loaded {} records into dataset '{}'", records.len(), name);
    Dataset::new(name, records).ok_or_else(|| DatasetError::Empty {
        dataset: name.to_owned(),
    })
}

fn detect_delimiter(header: &str) -> u8 {
    if header.contains(';') { b';' } else { b',' }
}

fn clean(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_owned()
}

fn describe(field: Field, headers: &[String]) -> String {
    match field {
        Field::Named(name) => name.to_owned(),
        Field::Position(position) => headers
            .get(position)
            .cloned()
            .unwrap_or_else(|| format!("column{}", position)),
    }
}
