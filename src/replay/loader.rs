//! Load election logs from CSV
//!
//! Columns: `actor,action,date` with dates as `dd/MM/yyyy`, one election per
//! row in the order they were made.

use csv::{Reader, Trim};
use std::error::Error;
use std::path::Path;

use crate::contract::Party;
use crate::temporal::parse_date;
use super::runner::ElectionStep;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    actor: String,
    action: String,
    date: String,
}

impl CsvRow {
    fn to_step(self) -> Result<ElectionStep, Box<dyn Error>> {
        if self.actor.is_empty() {
            return Err("Election row has no actor".into());
        }
        if self.action.is_empty() {
            return Err(format!("Election by {} has no action label", self.actor).into());
        }
        Ok(ElectionStep {
            actor: Party::new(&self.actor),
            label: self.action,
            at: parse_date(&self.date)?,
        })
    }
}

fn read_steps<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<ElectionStep>, Box<dyn Error>> {
    let mut steps = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        steps.push(row.to_step()?);
    }

    Ok(steps)
}

/// Load an election log from a CSV file
pub fn load_election_log<P: AsRef<Path>>(path: P) -> Result<Vec<ElectionStep>, Box<dyn Error>> {
    let reader = csv::ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    read_steps(reader)
}

/// Load an election log from any reader
pub fn load_election_log_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ElectionStep>, Box<dyn Error>> {
    let csv_reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    read_steps(csv_reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_election_log() {
        let log = "actor,action,date\nacmeCorp, exercise ,15/03/2015\nhighStreetBank,proceed,02/04/2015\n";
        let steps = load_election_log_from_reader(log.as_bytes()).unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].actor, Party::new("acmeCorp"));
        assert_eq!(steps[0].label, "exercise");
        assert_eq!(steps[1].at, parse_date("02/04/2015").unwrap());
    }

    #[test]
    fn test_rejects_malformed_rows() {
        assert!(load_election_log_from_reader("actor,action,date\nacmeCorp,,01/01/2015\n".as_bytes()).is_err());
        assert!(load_election_log_from_reader("actor,action,date\nacmeCorp,cancel,2015/01/01\n".as_bytes()).is_err());
    }
}
