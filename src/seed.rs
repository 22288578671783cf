use crate::{
  error::{Error, ErrorKind, Result},
  schema::{NewSpot, NewSurfer},
  store::{self, Store},
};
use rusqlite::Connection;

const SURFERS: &[(&str, &str)] = &[
  ("Farid", "farid.doe@example.com"),
  ("Oscar", "oscar.doe@example.com"),
];

const SPOTS: &[(&str, f64, f64)] = &[
  ("Lane", 36.9517, -122.0263),
  ("Natural Bridges", 36.9503, -122.0575),
];

enum Record {
  Surfer(NewSurfer),
  Spot(NewSpot),
}

impl std::fmt::Display for Record {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Record::Surfer(s) => write!(f, "surfer {} <{}>", s.name, s.email),
      Record::Spot(s) => write!(f, "spot {}", s.name),
    }
  }
}

fn records() -> Result<Vec<Record>> {
  let mut records = vec![];
  for (name, email) in SURFERS {
    records.push(Record::Surfer(NewSurfer::new(name, email)?));
  }
  for (name, lat, long) in SPOTS {
    records.push(Record::Spot(NewSpot {
      latitude: Some(*lat),
      longitude: Some(*long),
      ..NewSpot::new(name)?
    }));
  }
  Ok(records)
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Report {
  pub inserted: usize,
  pub skipped: usize,
  pub failed: usize,
  pub aborted: bool,
}

/// Inserts the reference surfers and spots that are not there yet.
/// Never fails: problems end up in the log and the report.
pub fn run(store: &Store) -> Report {
  let mut report = Report::default();

  let records = match records() {
    Ok(records) => records,
    Err(e) => {
      log::error!("seed: invalid reference data: {}", e);
      report.aborted = true;
      return report;
    }
  };
  let mut db = match store.conn() {
    Ok(db) => db,
    Err(e) => {
      log::error!("seed: aborted, {}", e);
      report.aborted = true;
      return report;
    }
  };

  for record in &records {
    match insert(&mut db, record) {
      Ok(()) => report.inserted += 1,
      Err(Error(ErrorKind::UniquenessConflict(_), _)) => {
        log::info!("seed: skipping duplicate {}", record);
        report.skipped += 1;
      }
      Err(e) => {
        log::warn!("seed: failed to insert {}: {}", record, e);
        report.failed += 1;
      }
    }
  }

  log::info!(
    "seed: {} inserted, {} skipped, {} failed",
    report.inserted,
    report.skipped,
    report.failed
  );
  report
}

/// One transaction per record; dropping it uncommitted rolls back.
fn insert(db: &mut Connection, record: &Record) -> Result<()> {
  let transaction = db.transaction()?;
  match record {
    Record::Surfer(surfer) => store::insert_surfer(&transaction, surfer).map(drop)?,
    Record::Spot(spot) => store::insert_spot(&transaction, spot).map(drop)?,
  }
  transaction.commit()?;
  Ok(())
}
