//! Transaction CSV loader with encoding and delimiter auto-detection.
//!
//! Turns the exported order/seller/product table into a [`Dataset`].
//! Loading fails fast: a missing column or a malformed timestamp or price
//! aborts the load with the offending line.
//!
//! # Column resolution
//!
//! Each required column is looked up by exact name first, then by its
//! merge-suffixed variants (`price_x`, `order_approved_at_y`, ...), which is
//! how the joined export names columns that existed in more than one
//! source table.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DatasetError, DatasetResult};
use crate::models::{Dataset, LoadInfo, Transaction};

pub const COL_ORDER_ID: &str = "order_id";
pub const COL_APPROVED_AT: &str = "order_approved_at";
pub const COL_PRICE: &str = "price";
pub const COL_CATEGORY: &str = "product_category_name";
pub const COL_SELLER_ID: &str = "seller_id";
pub const COL_SELLER_STATE: &str = "seller_state";
pub const COL_SELLER_CITY: &str = "seller_city";

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_ORDER_ID,
    COL_APPROVED_AT,
    COL_PRICE,
    COL_CATEGORY,
    COL_SELLER_ID,
    COL_SELLER_STATE,
    COL_SELLER_CITY,
];

/// Largest accepted absolute price. Keeps every revenue sum far below
/// `Decimal::MAX`.
pub static MAX_PRICE: Lazy<Decimal> = Lazy::new(|| Decimal::from(1_000_000_000_000_000_i64));

static MERGE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<base>.+)_[xy]$").expect("static regex"));

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Latin-1 is decoded as windows-1252, its WHATWG superset. Other labels go
/// through `encoding_rs`; unrecognised ones fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> DatasetResult<String> {
    let content = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(content.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Defaults to `,` when the header holds none of the candidates.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse an approval timestamp. Bare dates are taken as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Parse a price cell. Empty cells count as zero.
pub fn parse_price(value: &str) -> Option<Decimal> {
    if value.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Load a transaction CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let dataset = salesdash::load_dataset("main_data.csv")?;
/// println!("{} rows, encoding {}", dataset.len(), dataset.info().encoding);
/// ```
pub fn load_dataset<P: AsRef<Path>>(path: P) -> DatasetResult<Dataset> {
    let bytes = std::fs::read(path.as_ref())?;
    load_bytes(&bytes)
}

/// Load transaction CSV bytes with auto-detection of encoding and delimiter.
pub fn load_bytes(bytes: &[u8]) -> DatasetResult<Dataset> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_transactions(&content, delimiter, encoding)
}

/// Parse decoded CSV content with an explicit delimiter.
pub fn parse_transactions(
    content: &str,
    delimiter: char,
    encoding: String,
) -> DatasetResult<Dataset> {
    if content.trim().is_empty() {
        return Err(DatasetError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter)
        .map_err(|_| DatasetError::Encoding(format!("non-ASCII delimiter '{}'", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut transactions = Vec::new();
    let mut skipped_rows = 0;

    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.len() > headers.len() {
            return Err(DatasetError::FieldCount {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        match columns.parse_row(&record, line)? {
            Some(tx) => transactions.push(tx),
            None => skipped_rows += 1,
        }
    }

    let info = LoadInfo {
        encoding,
        delimiter,
        headers,
        row_count: transactions.len(),
        skipped_rows,
    };

    Ok(Dataset::new(transactions, info))
}

/// Find the index of `name` in `headers`, accepting merge suffixes.
pub fn resolve_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name).or_else(|| {
        headers.iter().position(|h| {
            MERGE_SUFFIX
                .captures(h)
                .is_some_and(|caps| &caps["base"] == name)
        })
    })
}

/// Header positions of the required columns.
struct ColumnMap {
    order_id: usize,
    approved_at: usize,
    price: usize,
    category: usize,
    seller_id: usize,
    seller_state: usize,
    seller_city: usize,
    names: Vec<String>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> DatasetResult<Self> {
        let find = |name: &str| {
            resolve_column(headers, name).ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            order_id: find(COL_ORDER_ID)?,
            approved_at: find(COL_APPROVED_AT)?,
            price: find(COL_PRICE)?,
            category: find(COL_CATEGORY)?,
            seller_id: find(COL_SELLER_ID)?,
            seller_state: find(COL_SELLER_STATE)?,
            seller_city: find(COL_SELLER_CITY)?,
            names: headers.to_vec(),
        })
    }

    /// Parse one record. `Ok(None)` when the row has no approval timestamp.
    fn parse_row(&self, record: &csv::StringRecord, line: usize) -> DatasetResult<Option<Transaction>> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let raw_ts = cell(self.approved_at);
        if raw_ts.is_empty() {
            return Ok(None);
        }
        let order_approved_at = parse_timestamp(raw_ts).ok_or_else(|| {
            DatasetError::invalid_value(
                line,
                &self.names[self.approved_at],
                raw_ts,
                "not a timestamp",
            )
        })?;

        let raw_price = cell(self.price);
        let price = parse_price(raw_price).ok_or_else(|| {
            DatasetError::invalid_value(line, &self.names[self.price], raw_price, "not a decimal")
        })?;
        if price.abs() > *MAX_PRICE {
            return Err(DatasetError::invalid_value(
                line,
                &self.names[self.price],
                raw_price,
                "price out of range",
            ));
        }

        let category = cell(self.category);

        Ok(Some(Transaction {
            order_id: cell(self.order_id).to_string(),
            order_approved_at,
            price,
            product_category_name: (!category.is_empty()).then(|| category.to_string()),
            seller_id: cell(self.seller_id).to_string(),
            seller_state: cell(self.seller_state).to_string(),
            seller_city: cell(self.seller_city).to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "order_id,order_approved_at,price,product_category_name,seller_id,seller_state,seller_city";

    fn parse(csv: &str) -> DatasetResult<Dataset> {
        load_bytes(csv.as_bytes())
    }

    #[test]
    fn test_simple_csv() {
        let csv = format!(
            "{}\no1,2023-01-01 10:15:00,10.50,toys,S1,SP,sao paulo\no2,2023-01-02 08:00:00,20,books,S2,RJ,rio de janeiro\n",
            HEADER
        );
        let dataset = parse(&csv).unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.transactions()[0];
        assert_eq!(first.order_id, "o1");
        assert_eq!(first.price, Decimal::new(1050, 2));
        assert_eq!(first.product_category_name.as_deref(), Some("toys"));
        assert_eq!(first.seller_city, "sao paulo");
        assert_eq!(dataset.info().delimiter, ',');
        assert_eq!(dataset.info().row_count, 2);
    }

    #[test]
    fn test_merge_suffixed_columns() {
        let csv = "order_id,order_approved_at_y,price_x,product_category_name,seller_id_x,seller_state,seller_city\n\
                   o1,2023-03-04 09:00:00,15.00,food,S9,MG,belo horizonte\n";
        let dataset = parse(csv).unwrap();

        assert_eq!(dataset.len(), 1);
        let tx = &dataset.transactions()[0];
        assert_eq!(tx.seller_id, "S9");
        assert_eq!(tx.price, Decimal::new(1500, 2));
    }

    #[test]
    fn test_resolve_column_prefers_exact() {
        let headers: Vec<String> = ["price_x", "price"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resolve_column(&headers, "price"), Some(1));
        assert_eq!(resolve_column(&headers, "seller_id"), None);
    }

    #[test]
    fn test_missing_column() {
        let csv = "order_id,order_approved_at,price,product_category_name,seller_id,seller_state\n";
        let err = parse(csv).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "seller_city"));
    }

    #[test]
    fn test_invalid_timestamp() {
        let csv = format!("{}\no1,yesterday,10,toys,S1,SP,sao paulo\n", HEADER);
        let err = parse(&csv).unwrap_err();
        match err {
            DatasetError::InvalidValue { line, column, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "order_approved_at");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_price() {
        let csv = format!("{}\no1,2023-01-01 00:00:00,ten,toys,S1,SP,sao paulo\n", HEADER);
        let err = parse(&csv).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_missing_timestamp_skipped() {
        let csv = format!(
            "{}\no1,,10,toys,S1,SP,sao paulo\no2,2023-01-01 00:00:00,5,toys,S1,SP,sao paulo\n",
            HEADER
        );
        let dataset = parse(&csv).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.info().skipped_rows, 1);
    }

    #[test]
    fn test_empty_category_is_none() {
        let csv = format!("{}\no1,2023-01-01 00:00:00,10,,S1,SP,sao paulo\n", HEADER);
        let dataset = parse(&csv).unwrap();
        assert_eq!(dataset.transactions()[0].product_category_name, None);
    }

    #[test]
    fn test_quoted_field_with_delimiter() {
        let csv = format!(
            "{}\no1,2023-01-01 00:00:00,10,\"cama, mesa e banho\",S1,SP,sao paulo\n",
            HEADER
        );
        let dataset = parse(&csv).unwrap();
        assert_eq!(
            dataset.transactions()[0].product_category_name.as_deref(),
            Some("cama, mesa e banho")
        );
    }

    #[test]
    fn test_extra_field_row_rejected() {
        let csv = format!(
            "{}\no1,2023-01-01 10:00:00,10,toys,S1,SP,sao paulo\no2,2023-01-01 10:00:00,10,cama, mesa,S1,SP,sao paulo\n",
            HEADER
        );
        let err = parse(&csv).unwrap_err();
        match err {
            DatasetError::FieldCount { line, expected, found } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 7);
                assert_eq!(found, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_reads_missing_cells_as_empty() {
        let csv = format!("{}\no1,2023-01-01 10:00:00,10,toys,S1\n", HEADER);
        let dataset = parse(&csv).unwrap();
        let tx = &dataset.transactions()[0];
        assert_eq!(tx.seller_id, "S1");
        assert_eq!(tx.seller_state, "");
        assert_eq!(tx.seller_city, "");
    }

    #[test]
    fn test_huge_price_rejected() {
        let csv = format!("{}\no1,2023-01-01 00:00:00,5e28,toys,S1,SP,sao paulo\n", HEADER);
        let err = parse(&csv).unwrap_err();
        match err {
            DatasetError::InvalidValue { column, message, .. } => {
                assert_eq!(column, "price");
                assert_eq!(message, "price out of range");
            }
            other => panic!("unexpected error: {other}"),
        }

        let csv = format!("{}\no1,2023-01-01 00:00:00,1e6,toys,S1,SP,sao paulo\n", HEADER);
        let dataset = parse(&csv).unwrap();
        assert_eq!(dataset.transactions()[0].price, Decimal::from(1_000_000));
    }

    #[test]
    fn test_semicolon_file() {
        let csv = format!(
            "{}\no1;2023-01-01;10;toys;S1;SP;sao paulo\n",
            HEADER.replace(',', ";")
        );
        let dataset = parse(&csv).unwrap();
        assert_eq!(dataset.info().delimiter, ';');
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        assert_eq!(parse_timestamp("2023-05-06 07:08:09"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-06T07:08:09"), Some(expected));
        assert!(parse_timestamp("2023-05-06 07:08:09.250").is_some());
        assert_eq!(
            parse_timestamp("2023-05-06"),
            NaiveDate::from_ymd_opt(2023, 5, 6).map(|d| d.and_time(NaiveTime::MIN))
        );
        assert_eq!(parse_timestamp("06/05/2023"), None);
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse("").unwrap_err(), DatasetError::EmptyFile));
        assert!(matches!(parse("\n\n").unwrap_err(), DatasetError::EmptyFile));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let dataset = parse(&format!("{}\n", HEADER)).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.info().headers.len(), 7);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "São" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0xE3, 0x6F];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "São");

        // 0xA4 is the currency sign in latin-1, the euro sign only in latin-9
        assert_eq!(decode_content(&[0xA4], "iso-8859-1").unwrap(), "¤");
        assert_eq!(decode_content(&[0xA4], "iso-8859-15").unwrap(), "€");
    }

    #[test]
    fn test_unknown_encoding_falls_back_to_utf8() {
        let decoded = decode_content("Sé".as_bytes(), "x-no-such-charset").unwrap();
        assert_eq!(decoded, "Sé");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "o1,2023-01-01 10:00:00,10,toys,S1,SP,sao paulo").unwrap();
        file.flush().unwrap();

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_dataset("/nonexistent/main_data.csv").unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
