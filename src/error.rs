use actix_web::{http::StatusCode, HttpResponse};
use error_chain::error_chain;
use rusqlite::ffi;

error_chain! {
  foreign_links {
    RusqliteError(rusqlite::Error);
    IoError(std::io::Error);
    TomlError(toml::de::Error);
  }

  errors {
    Validation(msg: String) {
      description("invalid input")
      display("invalid input: {}", msg)
    }
    UniquenessConflict(what: String) {
      description("uniqueness constraint violated")
      display("already exists: {}", what)
    }
    StoreUnavailable(msg: String) {
      description("data store unavailable")
      display("data store unavailable: {}", msg)
    }
    RouteNotFound
  }
}

impl From<r2d2::Error> for Error {
  fn from(e: r2d2::Error) -> Self {
    Error::from_kind(ErrorKind::StoreUnavailable(e.to_string()))
  }
}

impl From<actix_web::error::BlockingError> for Error {
  fn from(e: actix_web::error::BlockingError) -> Self {
    Error::from_kind(ErrorKind::StoreUnavailable(e.to_string()))
  }
}

/// Sqlite extended result code of a failed statement, if any.
pub fn sqlite_code(e: &rusqlite::Error) -> Option<std::os::raw::c_int> {
  match e {
    rusqlite::Error::SqliteFailure(err, _) => Some(err.extended_code),
    _ => None,
  }
}

pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  sqlite_code(e) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
  sqlite_code(e) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

pub fn display(error: &Error) -> String {
  match error.kind() {
    ErrorKind::RouteNotFound => "".to_string(),
    _ => {
      let mut msg = "Error:\n".to_string();
      error
        .iter()
        .enumerate()
        .for_each(|(index, error)| msg.push_str(&format!("└> {} - {}\n", index, error)));

      if let Some(backtrace) = error.backtrace() {
        msg.push_str(&format!("\n{:?}", backtrace));
      }
      log::error!("{}", msg);
      msg
    }
  }
}

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.kind() {
      ErrorKind::RouteNotFound => StatusCode::NOT_FOUND,
      ErrorKind::Validation(_) => StatusCode::BAD_REQUEST,
      ErrorKind::UniquenessConflict(_) => StatusCode::CONFLICT,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self.kind() {
      ErrorKind::RouteNotFound => HttpResponse::NotFound().finish(),
      ErrorKind::Validation(_) | ErrorKind::UniquenessConflict(_) => {
        log::warn!("rejected request: {}", self);
        HttpResponse::build(self.status_code())
          .content_type("text/plain; charset=utf-8")
          .body(self.to_string())
      }
      _ => HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body({
          let msg = display(self);
          if cfg!(debug_assertions) {
            msg
          } else {
            "".to_string()
          }
        }),
    }
  }
}
