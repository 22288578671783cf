use crate::error::{ErrorKind, Result};
use chrono::{DateTime, Utc};
use error_chain::bail;
use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use strum_macros::{Display, EnumIter, FromRepr};

/// Shared by the crowd, wind and waves ratings; stored as 1..=5.
#[repr(u8)]
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, EnumIter, FromRepr)]
pub enum Rating {
  #[strum(serialize = "AWFUL")]
  Awful = 1,
  #[strum(serialize = "BAD")]
  Bad = 2,
  #[strum(serialize = "GOOD")]
  Good = 3,
  #[strum(serialize = "GREAT")]
  Great = 4,
  #[strum(serialize = "EPIC")]
  Epic = 5,
}

impl Rating {
  pub fn value(self) -> u8 {
    self as u8
  }

  /// Form input: absent or empty means no rating.
  pub fn parse_field(field: &str, raw: Option<&str>) -> Result<Option<Rating>> {
    let raw = match raw.map(str::trim) {
      None | Some("") => return Ok(None),
      Some(raw) => raw,
    };
    match raw.parse::<u8>().ok().and_then(Rating::from_repr) {
      Some(rating) => Ok(Some(rating)),
      None => Err(ErrorKind::Validation(format!("{} must be a rating between 1 and 5, got {:?}", field, raw)).into()),
    }
  }
}

impl ToSql for Rating {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(self.value() as i64))
  }
}

impl FromSql for Rating {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    let raw = value.as_i64()?;
    u8::try_from(raw)
      .ok()
      .and_then(Rating::from_repr)
      .ok_or(FromSqlError::OutOfRange(raw))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surfer {
  pub id: i64,
  pub name: String,
  pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
  pub id: i64,
  pub name: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub image_path: Option<String>,
  pub description: Option<String>,
}

/// A stored session. The surfer and spot columns are nullable in storage,
/// while [`NewSession`] always supplies both.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfSession {
  pub id: i64,
  pub timestamp: DateTime<Utc>,
  pub crowd: Option<Rating>,
  pub wind: Option<Rating>,
  pub waves: Option<Rating>,
  pub surfer_id: Option<i64>,
  pub spot_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSurfer {
  pub name: String,
  pub email: String,
}

impl NewSurfer {
  pub fn new(name: &str, email: &str) -> Result<NewSurfer> {
    lazy_static! {
      static ref REG_EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }

    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
      bail!(ErrorKind::Validation("surfer name must not be empty".into()));
    }
    if !REG_EMAIL.is_match(email) {
      bail!(ErrorKind::Validation(format!("{:?} is not a valid email address", email)));
    }
    Ok(NewSurfer {
      name: name.to_string(),
      email: email.to_string(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSpot {
  pub name: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub image_path: Option<String>,
  pub description: Option<String>,
}

impl NewSpot {
  pub fn new(name: &str) -> Result<NewSpot> {
    let name = name.trim();
    if name.is_empty() {
      bail!(ErrorKind::Validation("spot name must not be empty".into()));
    }
    Ok(NewSpot {
      name: name.to_string(),
      ..Default::default()
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
  pub surfer_id: i64,
  pub spot_id: i64,
  pub crowd: Option<Rating>,
  pub wind: Option<Rating>,
  pub waves: Option<Rating>,
}

impl NewSession {
  pub fn from_form(
    surfer_id: Option<&str>,
    spot_id: Option<&str>,
    crowd: Option<&str>,
    wind: Option<&str>,
    waves: Option<&str>,
  ) -> Result<NewSession> {
    Ok(NewSession {
      surfer_id: required_id("surfer_id", surfer_id)?,
      spot_id: required_id("spot_id", spot_id)?,
      crowd: Rating::parse_field("crowd", crowd)?,
      wind: Rating::parse_field("wind", wind)?,
      waves: Rating::parse_field("waves", waves)?,
    })
  }
}

/// Both constraints are AND-ed; `None` leaves that dimension open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionFilter {
  pub surfer_id: Option<i64>,
  pub spot_id: Option<i64>,
}

impl SessionFilter {
  pub fn from_query(surfer_id: Option<&str>, spot_id: Option<&str>) -> Result<SessionFilter> {
    Ok(SessionFilter {
      surfer_id: optional_id("surfer_id", surfer_id)?,
      spot_id: optional_id("spot_id", spot_id)?,
    })
  }
}

fn optional_id(field: &str, raw: Option<&str>) -> Result<Option<i64>> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(raw) => match raw.parse::<i64>() {
      Ok(id) => Ok(Some(id)),
      Err(_) => Err(ErrorKind::Validation(format!("{} must be an integer, got {:?}", field, raw)).into()),
    },
  }
}

fn required_id(field: &str, raw: Option<&str>) -> Result<i64> {
  match optional_id(field, raw)? {
    Some(id) => Ok(id),
    None => Err(ErrorKind::Validation(format!("{} is required", field)).into()),
  }
}
