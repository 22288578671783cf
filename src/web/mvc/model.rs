#![allow(non_camel_case_types)]
use crate::{
  error::Result,
  schema::{Rating, SessionFilter},
  store,
  web::{self, Config, HomeQuery, DB},
};
use chrono::{DateTime, Utc};
use maud::Markup;

pub struct Model {
  db_pool: DB,
  config: Config,
}

impl Model {
  pub fn new(db_pool: DB, config: Config) -> Model {
    Model { db_pool, config }
  }

  pub fn title(&self) -> &str {
    &self.config.web.title
  }

  pub async fn m_home(&self, query: HomeQuery) -> Result<Markup> {
    type Session = home_Session;

    let filter = SessionFilter::from_query(query.surfer_id.as_deref(), query.spot_id.as_deref())?;

    let (surfers, spots, sessions) = web::block(self.db_pool.clone(), move |store| -> Result<_> {
      let surfers = store.list_surfers()?;
      let spots = store.list_spots()?;
      let sessions = store.list_sessions(&filter)?;

      // one connection for every name lookup in the table
      let db = store.conn()?;
      let sessions = sessions
        .into_iter()
        .map(|s| -> Result<Session> {
          Ok(Session {
            timestamp: s.timestamp,
            surfer: store::surfer_name(&db, s.surfer_id)?,
            spot: store::spot_name(&db, s.spot_id)?,
            crowd: s.crowd,
            wind: s.wind,
            waves: s.waves,
          })
        })
        .collect::<Result<Vec<_>>>()?;

      Ok((surfers, spots, sessions))
    })
    .await?;

    let success = query.success.filter(|msg| !msg.is_empty());
    self.v_home(&surfers, &spots, &sessions, filter, success.as_deref())
  }

  pub async fn m_log(&self) -> Result<Markup> {
    let (surfers, spots) = web::block(self.db_pool.clone(), |store| -> Result<_> {
      Ok((store.list_surfers()?, store.list_spots()?))
    })
    .await?;

    self.v_log(&surfers, &spots)
  }
}

pub struct home_Session {
  pub timestamp: DateTime<Utc>,
  pub surfer: String,
  pub spot: String,
  pub crowd: Option<Rating>,
  pub wind: Option<Rating>,
  pub waves: Option<Rating>,
}
