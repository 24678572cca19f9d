use crate::error::LoadError;
use crate::types::{RawRow, WeatherRecord};
use crate::util::{parse_date_safe, parse_numeric, NumericField};
use bzip2::read::MultiBzDecoder;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns the NOAA export must provide. `BGN_DATE` is optional.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "EVTYPE",
    "FATALITIES",
    "INJURIES",
    "PROPDMG",
    "PROPDMGEXP",
    "CROPDMG",
    "CROPDMGEXP",
];

const MAX_WARNING_SAMPLES: usize = 20;

/// A numeric cell that could not be read and was counted as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCoercionWarning {
    /// 1-based data row, header excluded.
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub coerced_fields: usize,
    /// First few coercion warnings; `coerced_fields` has the full count.
    pub warnings: Vec<FieldCoercionWarning>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl LoadReport {
    fn numeric(&mut self, row: usize, column: &'static str, raw: Option<&str>) -> Option<f64> {
        match parse_numeric(raw) {
            NumericField::Invalid => {
                let value = raw.unwrap_or_default().to_string();
                debug!(row, column, value = %value, "unparseable numeric field counted as 0");
                self.coerced_fields += 1;
                if self.warnings.len() < MAX_WARNING_SAMPLES {
                    self.warnings.push(FieldCoercionWarning { row, column, value });
                }
                None
            }
            field => field.value(),
        }
    }

    fn observe_date(&mut self, date: NaiveDate) {
        self.first_date = Some(self.first_date.map_or(date, |d| d.min(date)));
        self.last_date = Some(self.last_date.map_or(date, |d| d.max(date)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    Plain,
    Gzip,
    Bzip2,
}

impl Compression {
    fn detect(magic: &[u8]) -> Self {
        if magic.starts_with(b"BZh") {
            Compression::Bzip2
        } else if magic.starts_with(&[0x1f, 0x8b]) {
            Compression::Gzip
        } else {
            Compression::Plain
        }
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>, LoadError> {
    let open_err = |source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let mut reader = BufReader::new(file);
    let compression = Compression::detect(reader.fill_buf().map_err(open_err)?);
    debug!(path = %path.display(), ?compression, "opened input");
    Ok(match compression {
        Compression::Plain => Box::new(reader),
        Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
        Compression::Bzip2 => Box::new(MultiBzDecoder::new(reader)),
    })
}

/// Load the storm event table at `path`, decompressing gzip or bzip2 input
/// transparently.
pub fn load_records(path: &Path) -> Result<(Vec<WeatherRecord>, LoadReport), LoadError> {
    let input = open_input(path)?;
    read_records(input, path)
}

/// Read records from an already-open (and already-decompressed) stream.
/// `path` only labels errors.
pub fn read_records<R: Read>(
    input: R,
    path: &Path,
) -> Result<(Vec<WeatherRecord>, LoadReport), LoadError> {
    let read_err = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);

    // Byte records: only the cells `RawRow` reads are decoded, and those
    // lossily, so stray bytes in free-text columns such as REMARKS are inert.
    let headers = rdr.byte_headers().map_err(read_err)?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == col.as_bytes()))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let mut report = LoadReport::default();
    let mut records: Vec<WeatherRecord> = Vec::new();

    for (idx, result) in rdr.byte_records().enumerate() {
        let row_no = idx + 1;
        report.total_rows += 1;
        let decoded = match result {
            Ok(record) => record.deserialize::<RawRow>(Some(&headers)),
            Err(e) if e.is_io_error() => return Err(read_err(e)),
            Err(e) => Err(e),
        };
        let row = match decoded {
            Ok(r) => r,
            Err(e) => {
                warn!(row = row_no, error = %e, "skipping undecodable row");
                report.skipped_rows += 1;
                continue;
            }
        };

        let begin_date = parse_date_safe(row.begin_date.as_deref());
        if let Some(date) = begin_date {
            report.observe_date(date);
        }

        let fatalities = report.numeric(row_no, "FATALITIES", row.fatalities.as_deref());
        let injuries = report.numeric(row_no, "INJURIES", row.injuries.as_deref());
        let property_damage_base =
            report.numeric(row_no, "PROPDMG", row.property_damage.as_deref());
        let crop_damage_base = report.numeric(row_no, "CROPDMG", row.crop_damage.as_deref());

        records.push(WeatherRecord {
            event_type: row.event_type.unwrap_or_default(),
            begin_date,
            fatalities,
            injuries,
            property_damage_base,
            property_damage_magnitude: row.property_damage_exp.unwrap_or_default(),
            crop_damage_base,
            crop_damage_magnitude: row.crop_damage_exp.unwrap_or_default(),
        });
    }

    if report.coerced_fields > 0 {
        warn!(
            coerced_fields = report.coerced_fields,
            "numeric fields could not be parsed and were counted as 0"
        );
    }
    info!(
        path = %path.display(),
        rows = report.total_rows,
        loaded = records.len(),
        skipped = report.skipped_rows,
        "loaded storm events"
    );
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
\"STATE__\",\"BGN_DATE\",\"EVTYPE\",\"FATALITIES\",\"INJURIES\",\"PROPDMG\",\"PROPDMGEXP\",\"CROPDMG\",\"CROPDMGEXP\"
1.00,4/18/1950 0:00:00,\"TORNADO\",0.00,15.00,25.00,\"K\",0.00,\"\"
1.00,11/15/1951 0:00:00,\"TSTM WIND\",,2,2.5,\"M\",1,\"K\"
13.00,6/3/1995 0:00:00,\"FLOOD\",3,n/a,1,\"B\",,
";

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_plain_csv() {
        let file = write_temp(SAMPLE.as_bytes());
        let (records, report) = load_records(file.path()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.skipped_rows, 0);

        let tornado = &records[0];
        assert_eq!(tornado.event_type, "TORNADO");
        assert_eq!(tornado.injuries, Some(15.0));
        assert_eq!(tornado.property_damage_magnitude, "K");
        assert_eq!(tornado.crop_damage_magnitude, "");

        let wind = &records[1];
        assert_eq!(wind.fatalities, None);
        assert_eq!(wind.property_damage_base, Some(2.5));
    }

    #[test]
    fn test_unparseable_numeric_is_counted_not_fatal() {
        let file = write_temp(SAMPLE.as_bytes());
        let (records, report) = load_records(file.path()).unwrap();

        assert_eq!(records[2].injuries, None);
        assert_eq!(report.coerced_fields, 1);
        assert_eq!(
            report.warnings,
            vec![FieldCoercionWarning {
                row: 3,
                column: "INJURIES",
                value: "n/a".to_string()
            }]
        );
    }

    #[test]
    fn test_date_span() {
        let file = write_temp(SAMPLE.as_bytes());
        let (_, report) = load_records(file.path()).unwrap();
        assert_eq!(report.first_date, NaiveDate::from_ymd_opt(1950, 4, 18));
        assert_eq!(report.last_date, NaiveDate::from_ymd_opt(1995, 6, 3));
    }

    #[test]
    fn test_gzip_and_bzip2_match_plain() {
        let (plain, _) = load_records(write_temp(SAMPLE.as_bytes()).path()).unwrap();

        let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        gz.write_all(SAMPLE.as_bytes()).unwrap();
        let gz_file = write_temp(&gz.finish().unwrap());
        let (from_gz, _) = load_records(gz_file.path()).unwrap();

        let mut bz = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        bz.write_all(SAMPLE.as_bytes()).unwrap();
        let bz_file = write_temp(&bz.finish().unwrap());
        let (from_bz, _) = load_records(bz_file.path()).unwrap();

        assert_eq!(plain, from_gz);
        assert_eq!(plain, from_bz);
    }

    #[test]
    fn test_event_type_is_not_trimmed_or_folded() {
        let csv = "EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP\n\
                   \" Tornado \",1,0,0,,0,\n";
        let (records, _) = read_records(csv.as_bytes(), Path::new("inline.csv")).unwrap();
        assert_eq!(records[0].event_type, " Tornado ");
        assert_eq!(records[0].begin_date, None);
    }

    #[test]
    fn test_column_order_and_extra_columns_are_free() {
        let csv = "CROPDMGEXP,REMARKS,CROPDMG,PROPDMGEXP,PROPDMG,INJURIES,FATALITIES,EVTYPE\n\
                   M,none,2,B,1,4,5,FLOOD\n";
        let (records, _) = read_records(csv.as_bytes(), Path::new("inline.csv")).unwrap();
        let flood = &records[0];
        assert_eq!(flood.event_type, "FLOOD");
        assert_eq!(flood.fatalities, Some(5.0));
        assert_eq!(flood.injuries, Some(4.0));
        assert_eq!(flood.property_damage_magnitude, "B");
        assert_eq!(flood.crop_damage_base, Some(2.0));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = load_records(Path::new("/nonexistent/storm.csv.bz2")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/storm.csv.bz2"));
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let csv = "EVTYPE,FATALITIES,INJURIES,PROPDMG\nHAIL,0,0,1\n";
        let err = read_records(csv.as_bytes(), Path::new("partial.csv")).unwrap_err();
        match err {
            LoadError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["PROPDMGEXP", "CROPDMG", "CROPDMGEXP"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_is_missing_columns() {
        let err = read_records(&b""[..], Path::new("empty.csv")).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns { .. }));
    }

    #[test]
    fn test_corrupt_bzip2_is_read_error() {
        let file = write_temp(b"BZh9 definitely not a bzip2 stream");
        let err = load_records(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_invalid_utf8_in_unread_column_keeps_row() {
        let mut bytes =
            b"EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP,REMARKS\n".to_vec();
        bytes.extend_from_slice(b"HEAT,583,0,0,,0,,caf\xe9 closed\n");
        bytes.extend_from_slice(b"HAIL,2,0,0,,0,,ok\n");
        let (records, report) = read_records(bytes.as_slice(), Path::new("latin1.csv")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(records[0].event_type, "HEAT");
        assert_eq!(records[0].fatalities, Some(583.0));

        let rows = crate::reports::health_impact(&records, 15);
        assert_eq!(rows[0].event_type, "HEAT");
        assert_eq!(rows[0].value, 583.0);
    }

    #[test]
    fn test_invalid_utf8_in_event_type_is_replaced() {
        let mut bytes =
            b"EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP\n".to_vec();
        bytes.extend_from_slice(b"HAIL\xff,1,0,0,,0,\n");
        bytes.extend_from_slice(b"HAIL,2,0,0,,0,\n");
        let (records, report) = read_records(bytes.as_slice(), Path::new("bad.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(records[0].event_type, "HAIL\u{FFFD}");
        assert_eq!(records[0].fatalities, Some(1.0));
        assert_eq!(records[1].event_type, "HAIL");
    }

    #[test]
    fn test_detect_compression() {
        assert_eq!(Compression::detect(b"BZh91AY&SY"), Compression::Bzip2);
        assert_eq!(Compression::detect(&[0x1f, 0x8b, 0x08]), Compression::Gzip);
        assert_eq!(Compression::detect(b"EVTYPE,"), Compression::Plain);
        assert_eq!(Compression::detect(b""), Compression::Plain);
    }
}
