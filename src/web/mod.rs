use crate::{config, error, store::Store};
use actix_files::NamedFile;
use actix_web::{get, guard, middleware, post, web, App, HttpResponse, HttpServer, Result};
use serde::Deserialize;

mod mvc;

pub type DB = web::Data<Store>;
pub type Config = web::Data<config::Config>;

/*
 * wrapper over actix_web::web::block
 * sqlite calls are blocking, so run them on the thread pool with a handle on the store
 */
pub async fn block<F, I>(store: DB, f: F) -> error::Result<I>
where
  F: FnOnce(&Store) -> error::Result<I> + Send + 'static,
  I: Send + 'static,
{
  web::block(move || f(&store)).await?
}

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
  pub surfer_id: Option<String>,
  pub spot_id: Option<String>,
  pub success: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSessionForm {
  pub surfer_id: Option<String>,
  pub spot_id: Option<String>,
  pub crowd: Option<String>,
  pub wind: Option<String>,
  pub waves: Option<String>,
}

fn html(markup: maud::Markup) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("text/html; charset=utf-8")
    .body(markup.into_string())
}

#[get("/")]
async fn sv_home(query: web::Query<HomeQuery>, db: DB, config: Config) -> Result<HttpResponse, error::Error> {
  let t0 = std::time::Instant::now();

  let res = mvc::model::Model::new(db, config).m_home(query.into_inner()).await.map(html)?;

  log::debug!("profiling: {:?}", t0.elapsed());
  Ok(res)
}

#[get("/log")]
async fn sv_log(db: DB, config: Config) -> Result<HttpResponse, error::Error> {
  let t0 = std::time::Instant::now();

  let res = mvc::model::Model::new(db, config).m_log().await.map(html)?;

  log::debug!("profiling: {:?}", t0.elapsed());
  Ok(res)
}

#[post("/log_session")]
async fn sv_log_session(form: web::Form<LogSessionForm>, db: DB) -> Result<HttpResponse, error::Error> {
  let t0 = std::time::Instant::now();

  let res = mvc::controller::log_session(form.into_inner(), db).await?;

  log::debug!("profiling: {:?}", t0.elapsed());
  Ok(res)
}

#[get("/favicon.ico")]
async fn sv_favicon(config: Config) -> Result<NamedFile, error::Error> {
  match NamedFile::open_async(config.web.static_dir.join("favicon.ico")).await {
    Ok(file) => Ok(file),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(error::ErrorKind::RouteNotFound.into()),
    Err(e) => Err(e.into()),
  }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
  cfg
    .service(sv_home)
    .service(sv_log)
    .service(sv_log_session)
    .service(sv_favicon);
}

/// Default service for the `App`: 404 for GET, 405 otherwise.
pub fn fallback() -> actix_web::Resource {
  // 404 for GET request
  web::resource("")
    .route(web::get().to(|| async { HttpResponse::NotFound().finish() }))
    // all requests that are not `GET`
    .route(
      web::route()
        .guard(guard::Not(guard::Get()))
        .to(|| async { HttpResponse::MethodNotAllowed().finish() }),
    )
}

pub async fn init(config: config::Config, store: Store) -> error::Result<()> {
  let db = web::Data::new(store);
  let data_config = web::Data::new(config.clone());

  let server = HttpServer::new(move || {
    App::new()
      .app_data(db.clone())
      .app_data(data_config.clone())
      .wrap(middleware::Logger::default())
      .configure(routes)
      .default_service(fallback())
  });

  log::info!("listening on {}", config.server.bind_addr);
  if let Some(path) = config.server.bind_addr.strip_prefix("unix:") {
    #[cfg(unix)]
    {
      server.bind_uds(path)?.run().await?;
    }
    #[cfg(not(unix))]
    {
      let _ = path;
      error_chain::bail!("Unix sockets are not available for this target");
    }
  } else {
    server.bind(config.server.bind_addr.as_str())?.run().await?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{schema::SessionFilter, seed, store::tests::temp_store};
  use actix_web::{http::header, http::StatusCode, test};
  use tempfile::TempDir;

  async fn app(
    dir: &TempDir,
    store: Store,
  ) -> impl actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error> {
    let mut config = config::Config::with_db_path(dir.path().join("surf.db"));
    config.web.static_dir = dir.path().to_path_buf();
    test::init_service(
      App::new()
        .app_data(web::Data::new(store))
        .app_data(web::Data::new(config))
        .configure(routes)
        .default_service(fallback()),
    )
    .await
  }

  fn seeded() -> (TempDir, Store) {
    let (dir, store) = temp_store();
    seed::run(&store);
    (dir, store)
  }

  async fn body_of(
    app: &impl actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error>,
    uri: &str,
  ) -> (StatusCode, String) {
    let resp = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, String::from_utf8(body.to_vec()).unwrap())
  }

  #[actix_rt::test]
  async fn home_lists_filters_and_sessions() {
    let (dir, store) = seeded();
    store
      .create_session(&crate::schema::NewSession::from_form(Some("1"), Some("2"), None, None, Some("5")).unwrap())
      .unwrap();
    let app = app(&dir, store).await;

    let (status, body) = body_of(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("All Surfers"));
    assert!(body.contains("Farid"));
    assert!(body.contains("Natural Bridges"));
    assert!(body.contains("EPIC"));
    assert!(!body.contains(r#"<div class="success-banner">"#));

    let (_, body) = body_of(&app, "/?surfer_id=2").await;
    assert!(!body.contains("EPIC"));
    assert!(body.contains(r#"<option value="2" selected="">Oscar</option>"#));
  }

  #[actix_rt::test]
  async fn home_shows_success_banner() {
    let (dir, store) = seeded();
    let app = app(&dir, store).await;
    let (_, body) = body_of(&app, "/?success=Session%20logged%20successfully").await;
    assert!(body.contains(r#"<div class="success-banner">Session logged successfully</div>"#));

    let (_, body) = body_of(&app, "/?success=").await;
    assert!(!body.contains(r#"<div class="success-banner">"#));
  }

  #[actix_rt::test]
  async fn home_rejects_malformed_filter() {
    let (dir, store) = seeded();
    let app = app(&dir, store).await;
    let (status, _) = body_of(&app, "/?spot_id=lane").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[actix_rt::test]
  async fn log_form_offers_every_choice() {
    let (dir, store) = seeded();
    let app = app(&dir, store).await;
    let (status, body) = body_of(&app, "/log").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/log_session""#));
    assert!(body.contains("Oscar"));
    assert!(body.contains("Lane"));
    for name in ["crowd", "wind", "waves"] {
      assert!(body.contains(&format!(r#"name="{}""#, name)));
    }
    assert_eq!(body.matches(r#"<option value="5">EPIC</option>"#).count(), 3);
  }

  #[actix_rt::test]
  async fn log_session_redirects_and_stores() {
    let (dir, store) = seeded();
    let app = app(&dir, store.clone()).await;

    let req = test::TestRequest::post()
      .uri("/log_session")
      .set_form([("surfer_id", "1"), ("spot_id", "1"), ("crowd", ""), ("waves", "5")])
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
      resp.headers().get(header::LOCATION).unwrap(),
      mvc::controller::SUCCESS_LOCATION
    );

    let sessions = store.list_sessions(&SessionFilter::default()).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].waves, Some(crate::schema::Rating::Epic));
    assert_eq!(sessions[0].crowd, None);
    assert_eq!(sessions[0].wind, None);
  }

  #[actix_rt::test]
  async fn log_session_requires_ids() {
    let (dir, store) = seeded();
    let app = app(&dir, store.clone()).await;

    for form in [vec![("spot_id", "1")], vec![("surfer_id", "x"), ("spot_id", "1")], vec![("surfer_id", "1"), ("spot_id", "1"), ("wind", "7")]] {
      let req = test::TestRequest::post().uri("/log_session").set_form(form).to_request();
      let resp = test::call_service(&app, req).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
    assert!(store.list_sessions(&SessionFilter::default()).unwrap().is_empty());
  }

  #[::core::prelude::v1::test]
  fn shipped_favicon_is_an_icon() {
    let icon = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/data/static/favicon.ico")).unwrap();
    assert!(icon.len() > 6);
    // reserved 0, type 1 (icon), at least one image
    assert_eq!(&icon[..4], b"\0\0\x01\0");
    assert!(u16::from_le_bytes([icon[4], icon[5]]) >= 1);
  }

  #[actix_rt::test]
  async fn favicon_and_fallbacks() {
    let (dir, store) = seeded();
    std::fs::write(dir.path().join("favicon.ico"), b"\0\0\x01\0").unwrap();
    let app = app(&dir, store).await;

    let (status, _) = body_of(&app, "/favicon.ico").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = body_of(&app, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri("/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
  }
}
