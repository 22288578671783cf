use crate::{
  error::Result,
  schema::NewSession,
  util,
  web::{self, LogSessionForm, DB},
};
use actix_web::HttpResponse;

pub const SUCCESS_LOCATION: &str = "/?success=Session%20logged%20successfully";

///log_session
pub async fn log_session(form: LogSessionForm, db_pool: DB) -> Result<HttpResponse> {
  let session = NewSession::from_form(
    form.surfer_id.as_deref(),
    form.spot_id.as_deref(),
    form.crowd.as_deref(),
    form.wind.as_deref(),
    form.waves.as_deref(),
  )?;

  let (created, surfer, spot) = web::block(db_pool, move |store| {
    let created = store.create_session(&session)?;
    let surfer = store.get_surfer_name(created.surfer_id)?;
    let spot = store.get_spot_name(created.spot_id)?;
    Ok((created, surfer, spot))
  })
  .await?;
  log::info!("logged session #{} ({} at {})", created.id, surfer, spot);

  Ok(util::redirect(SUCCESS_LOCATION))
}
