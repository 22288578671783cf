use crate::error::Result;
use rusqlite::Connection;

const CREATE_TABLES: &str = "
  create table if not exists `surfer` (
    `id`    integer primary key autoincrement,
    `name`  text not null,
    `email` text not null,
    constraint `unique_name_email` unique (`name`, `email`)
  );

  create table if not exists `spot` (
    `id`   integer primary key autoincrement,
    `name` text not null unique
  );

  create table if not exists `surfsession` (
    `id`        integer primary key autoincrement,
    `timestamp` text not null default current_timestamp,
    `crowd`     integer check (`crowd` between 1 and 5),
    `wind`      integer check (`wind` between 1 and 5),
    `waves`     integer check (`waves` between 1 and 5),
    `surfer_id` integer references `surfer` (`id`),
    `spot_id`   integer references `spot` (`id`)
  );

  create index if not exists `surfsession_timestamp` on `surfsession` (`timestamp`);
";

/// Optional columns added to `spot` after the first release.
const SPOT_COLUMNS: &[(&str, &str)] = &[
  ("latitude", "real"),
  ("longitude", "real"),
  ("image_path", "text"),
  ("description", "text"),
];

/// Brings any existing store up to the current shape. Safe to run on every start.
pub fn run(db: &Connection) -> Result<()> {
  db.execute_batch(CREATE_TABLES)?;

  for (column, kind) in SPOT_COLUMNS {
    if add_column(db, "spot", column, kind)? {
      log::info!("migration: added column spot.{}", column);
    } else {
      log::debug!("migration: column spot.{} already exists", column);
    }
  }
  Ok(())
}

/// `Ok(false)` when the column is already present.
fn add_column(db: &Connection, table: &str, column: &str, kind: &str) -> Result<bool> {
  match db.execute(&format!("alter table `{}` add column `{}` {}", table, column, kind), []) {
    Ok(_) => Ok(true),
    Err(rusqlite::Error::SqliteFailure(_, Some(ref msg))) if msg.contains("duplicate column name") => Ok(false),
    Err(e) => Err(e.into()),
  }
}
