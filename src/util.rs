use crate::schema::Rating;
use actix_web::{http::header, HttpResponse};
use chrono::{DateTime, Local, Utc};

pub fn format_timestamp(timestamp: &DateTime<Utc>, format: &str) -> String {
  timestamp.with_timezone(&Local).format(format).to_string()
}

pub fn format_rating(rating: Option<Rating>) -> String {
  rating.map_or("-".into(), |x| x.to_string())
}

/// 303, so a reload after a form post doesn't resubmit it.
pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location))
    .finish()
}
