//! Load market data from CSV
//!
//! Columns: `kind,name,start,end,value`
//!
//! | kind    | name       | start        | end        |
//! |---------|------------|--------------|------------|
//! | `fixing`| index name | accrual start| accrual end|
//! | `fx`    | `EUR/USD`  | spot date    | (empty)    |
//! | `quote` | quote name | quote date   | (empty)    |
//!
//! Dates are `dd/MM/yyyy`; values are decimal strings.

use csv::{Reader, Trim};
use rust_decimal::Decimal;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use crate::currency::Currency;
use crate::expression::ObservableKey;
use crate::temporal::parse_date;
use super::fixings::FixingTable;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    kind: String,
    name: String,
    start: String,
    #[serde(default)]
    end: String,
    value: String,
}

impl CsvRow {
    fn to_entry(self) -> Result<(ObservableKey, Decimal), Box<dyn Error>> {
        let value = Decimal::from_str(&self.value)
            .map_err(|e| format!("Invalid value '{}' for {}: {}", self.value, self.name, e))?;

        let key = match self.kind.to_ascii_lowercase().as_str() {
            "fixing" => ObservableKey::Fixing {
                index: self.name,
                start: parse_date(&self.start)?,
                end: parse_date(&self.end)?,
            },
            "fx" => {
                let (base, quote) = self
                    .name
                    .split_once('/')
                    .ok_or_else(|| format!("FX pair must be BASE/QUOTE, got: {}", self.name))?;
                ObservableKey::FxSpot {
                    base: Currency::from_str(base)?,
                    quote: Currency::from_str(quote)?,
                    on: parse_date(&self.start)?,
                }
            }
            "quote" => ObservableKey::Quote {
                name: self.name,
                on: parse_date(&self.start)?,
            },
            other => return Err(format!("Unknown observable kind: {}", other).into()),
        };

        Ok((key, value))
    }
}

fn read_table<R: std::io::Read>(mut reader: Reader<R>) -> Result<FixingTable, Box<dyn Error>> {
    let mut table = FixingTable::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let (key, value) = row.to_entry()?;
        if let Some(previous) = table.insert(key.clone(), value) {
            return Err(format!("Duplicate market data for {} ({} and {})", key, previous, value).into());
        }
    }

    Ok(table)
}

/// Load market data from a CSV file
pub fn load_fixings<P: AsRef<Path>>(path: P) -> Result<FixingTable, Box<dyn Error>> {
    let reader = csv::ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    read_table(reader)
}

/// Load market data from any reader (e.g., string buffer, network stream)
pub fn load_fixings_from_reader<R: std::io::Read>(reader: R) -> Result<FixingTable, Box<dyn Error>> {
    let csv_reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    read_table(csv_reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = "\
kind,name,start,end,value
fixing,LIBOR,01/07/2015,01/10/2015,0.0031
fx,EUR/USD,01/04/2015,,1.0765
quote,VIX,01/04/2015,,15.29
";

    fn d(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_load_fixings_from_reader() {
        let table = load_fixings_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);

        let libor = ObservableKey::Fixing { index: "LIBOR".to_string(), start: d(1, 7, 2015), end: d(1, 10, 2015) };
        assert_eq!(table.get(&libor), Some(dec!(0.0031)));

        let spot = ObservableKey::FxSpot { base: Currency::EUR, quote: Currency::USD, on: d(1, 4, 2015) };
        assert_eq!(table.get(&spot), Some(dec!(1.0765)));
    }

    #[test]
    fn test_rejects_bad_rows() {
        let unknown_kind = "kind,name,start,end,value\nswap,X,01/01/2015,,1\n";
        assert!(load_fixings_from_reader(unknown_kind.as_bytes()).is_err());

        let bad_pair = "kind,name,start,end,value\nfx,EURUSD,01/01/2015,,1\n";
        assert!(load_fixings_from_reader(bad_pair.as_bytes()).is_err());

        let bad_date = "kind,name,start,end,value\nquote,VIX,2015-01-01,,1\n";
        assert!(load_fixings_from_reader(bad_date.as_bytes()).is_err());

        let duplicate = "kind,name,start,end,value\nquote,VIX,01/01/2015,,1\nquote,VIX,01/01/2015,,2\n";
        assert!(load_fixings_from_reader(duplicate.as_bytes()).is_err());
    }
}
