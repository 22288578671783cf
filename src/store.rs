use crate::{
  config::Config,
  error::{self, Error, ErrorKind, Result},
  migration,
  schema::{NewSession, NewSpot, NewSurfer, SessionFilter, Spot, SurfSession, Surfer},
};
use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};
use std::time::Duration;

pub type Conn = PooledConnection<SqliteConnectionManager>;

/// Name shown for an identifier that doesn't resolve.
pub const UNKNOWN: &str = "Unknown";

/// Data access over a single sqlite file. Every call checks a connection out of
/// the pool and hands it back when the guard drops.
#[derive(Clone)]
pub struct Store {
  pool: Pool<SqliteConnectionManager>,
}

impl Store {
  pub fn open(config: &Config) -> Result<Store> {
    let manager = SqliteConnectionManager::file(&config.server.db_path).with_init(|db| {
      db.busy_timeout(Duration::from_secs(5))?;
      db.execute_batch("pragma foreign_keys = on;")
    });
    let pool = Pool::builder()
      .max_size(config.server.pool_size.max(1))
      .connection_timeout(Duration::from_millis(config.server.connection_timeout_ms.max(1)))
      .build(manager)?;
    Ok(Store { pool })
  }

  pub fn conn(&self) -> Result<Conn> {
    Ok(self.pool.get()?)
  }

  pub fn migrate(&self) -> Result<()> {
    let db = self.conn()?;
    migration::run(&db)
  }

  pub fn list_surfers(&self) -> Result<Vec<Surfer>> {
    let db = self.conn()?;
    let mut stmt = db.prepare("select `id`, `name`, `email` from `surfer`")?;
    let surfers = stmt
      .query_map(params![], |row| {
        Ok(Surfer {
          id: row.get(0)?,
          name: row.get(1)?,
          email: row.get(2)?,
        })
      })?
      .collect::<rusqlite::Result<_>>()?;
    Ok(surfers)
  }

  pub fn list_spots(&self) -> Result<Vec<Spot>> {
    let db = self.conn()?;
    let mut stmt = db.prepare(
      "select `id`,
              `name`,
              `latitude`,
              `longitude`,
              `image_path`,
              `description`
         from `spot`",
    )?;
    let spots = stmt
      .query_map(params![], |row| {
        Ok(Spot {
          id: row.get(0)?,
          name: row.get(1)?,
          latitude: row.get(2)?,
          longitude: row.get(3)?,
          image_path: row.get(4)?,
          description: row.get(5)?,
        })
      })?
      .collect::<rusqlite::Result<_>>()?;
    Ok(spots)
  }

  /// Most recent first.
  pub fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<SurfSession>> {
    let db = self.conn()?;
    let mut stmt = db.prepare(
      "select `id`,
              `timestamp`,
              `crowd`,
              `wind`,
              `waves`,
              `surfer_id`,
              `spot_id`
         from `surfsession`
        where (:surfer_id is null or `surfer_id` = :surfer_id)
          and (:spot_id is null or `spot_id` = :spot_id)
        order by `timestamp` desc, `id` desc",
    )?;
    let sessions = stmt
      .query_map(
        named_params! {
          ":surfer_id": filter.surfer_id,
          ":spot_id": filter.spot_id,
        },
        session_from_row,
      )?
      .collect::<rusqlite::Result<_>>()?;
    Ok(sessions)
  }

  pub fn get_surfer_name(&self, id: Option<i64>) -> Result<String> {
    let db = self.conn()?;
    surfer_name(&db, id)
  }

  pub fn get_spot_name(&self, id: Option<i64>) -> Result<String> {
    let db = self.conn()?;
    spot_name(&db, id)
  }

  /// Stores `session` with a server-assigned id and timestamp.
  pub fn create_session(&self, session: &NewSession) -> Result<SurfSession> {
    let db = self.conn()?;
    insert_session(&db, session, Utc::now())
  }

  pub fn insert_surfer(&self, surfer: &NewSurfer) -> Result<Surfer> {
    let db = self.conn()?;
    insert_surfer(&db, surfer)
  }

  pub fn insert_spot(&self, spot: &NewSpot) -> Result<Spot> {
    let db = self.conn()?;
    insert_spot(&db, spot)
  }
}

fn session_from_row(row: &Row) -> rusqlite::Result<SurfSession> {
  Ok(SurfSession {
    id: row.get(0)?,
    timestamp: row.get(1)?,
    crowd: row.get(2)?,
    wind: row.get(3)?,
    waves: row.get(4)?,
    surfer_id: row.get(5)?,
    spot_id: row.get(6)?,
  })
}

fn name_of(db: &Connection, sql: &str, id: Option<i64>) -> Result<String> {
  let id = match id {
    Some(id) => id,
    None => return Ok(UNKNOWN.to_string()),
  };
  Ok(
    db.query_row(sql, params![id], |row| row.get::<_, String>(0))
      .optional()?
      .unwrap_or_else(|| UNKNOWN.to_string()),
  )
}

/// Resolves on a caller-held connection, for use inside row loops.
pub fn surfer_name(db: &Connection, id: Option<i64>) -> Result<String> {
  name_of(db, "select `name` from `surfer` where `id` = :id", id)
}

pub fn spot_name(db: &Connection, id: Option<i64>) -> Result<String> {
  name_of(db, "select `name` from `spot` where `id` = :id", id)
}

pub(crate) fn insert_session(db: &Connection, session: &NewSession, timestamp: DateTime<Utc>) -> Result<SurfSession> {
  let res = db.execute(
    "insert into `surfsession` (
      `timestamp`,
      `crowd`,
      `wind`,
      `waves`,
      `surfer_id`,
      `spot_id`
    ) values (
      :timestamp,
      :crowd,
      :wind,
      :waves,
      :surfer_id,
      :spot_id
    )",
    named_params! {
      ":timestamp": timestamp,
      ":crowd": session.crowd,
      ":wind": session.wind,
      ":waves": session.waves,
      ":surfer_id": session.surfer_id,
      ":spot_id": session.spot_id,
    },
  );
  match res {
    Ok(_) => (),
    Err(ref e) if error::is_foreign_key_violation(e) => {
      return Err(Error::from_kind(ErrorKind::Validation(format!(
        "surfer {} or spot {} does not exist",
        session.surfer_id, session.spot_id
      ))))
    }
    Err(e) => return Err(e.into()),
  }

  Ok(SurfSession {
    id: db.last_insert_rowid(),
    timestamp,
    crowd: session.crowd,
    wind: session.wind,
    waves: session.waves,
    surfer_id: Some(session.surfer_id),
    spot_id: Some(session.spot_id),
  })
}

fn conflict(e: rusqlite::Error, what: String) -> Error {
  if error::is_unique_violation(&e) {
    Error::from_kind(ErrorKind::UniquenessConflict(what))
  } else {
    e.into()
  }
}

pub fn insert_surfer(db: &Connection, surfer: &NewSurfer) -> Result<Surfer> {
  db.execute(
    "insert into `surfer` (`name`, `email`) values (:name, :email)",
    named_params! {
      ":name": surfer.name,
      ":email": surfer.email,
    },
  )
  .map_err(|e| conflict(e, format!("surfer {} <{}>", surfer.name, surfer.email)))?;

  Ok(Surfer {
    id: db.last_insert_rowid(),
    name: surfer.name.clone(),
    email: surfer.email.clone(),
  })
}

pub fn insert_spot(db: &Connection, spot: &NewSpot) -> Result<Spot> {
  db.execute(
    "insert into `spot` (
      `name`,
      `latitude`,
      `longitude`,
      `image_path`,
      `description`
    ) values (
      :name,
      :latitude,
      :longitude,
      :image_path,
      :description
    )",
    named_params! {
      ":name": spot.name,
      ":latitude": spot.latitude,
      ":longitude": spot.longitude,
      ":image_path": spot.image_path,
      ":description": spot.description,
    },
  )
  .map_err(|e| conflict(e, format!("spot {}", spot.name)))?;

  Ok(Spot {
    id: db.last_insert_rowid(),
    name: spot.name.clone(),
    latitude: spot.latitude,
    longitude: spot.longitude,
    image_path: spot.image_path.clone(),
    description: spot.description.clone(),
  })
}
