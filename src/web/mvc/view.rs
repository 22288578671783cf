use super::model::{self, Model as View};
use crate::{
  error::Result,
  schema::{Rating, SessionFilter, Spot, Surfer},
  util,
};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use strum::IntoEnumIterator;

const STYLE: &str = "
  body { font-family: sans-serif; max-width: 1000px; margin: 0 auto; padding: 20px; }
  h1 a { text-decoration: none; color: inherit; }
  .success-banner { background: #d4edda; color: #155724; padding: 12px; border-radius: 4px; }
  .filters { display: flex; gap: 20px; margin: 20px 0; }
  table { width: 100%; border-collapse: collapse; }
  th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
";

impl View {
  pub fn v_root(&self, heading: &str, body: Markup) -> Result<Markup> {
    Ok(html! {
      (DOCTYPE)
      html lang="en" {
        head {
          meta http-equiv="Content-Type" content="text/html; charset=utf-8";
          meta name="viewport" content="width=device-width";
          link rel="icon" type="image/x-icon" href="/favicon.ico";

          title { (self.title()) }

          style { (PreEscaped(STYLE)) }
        }
        body {
          h1 { a href="/" { "🏄 " (heading) } }
          (body)
        }
      }
    })
  }

  pub fn v_home(
    &self,
    surfers: &[Surfer],
    spots: &[Spot],
    sessions: &[model::home_Session],
    filter: SessionFilter,
    success: Option<&str>,
  ) -> Result<Markup> {
    let body = html! {
      @if let Some(success) = success {
        .success-banner { (success) }
      }

      form.filters method="get" action="/" {
        .filter-group {
          label for="surfer_id" { "Surfer" }
          select id="surfer_id" name="surfer_id" onchange="this.form.submit()" {
            option value="" { "All Surfers" }
            @for surfer in surfers {
              (mar_option(surfer.id, &surfer.name, filter.surfer_id))
            }
          }
        }
        .filter-group {
          label for="spot_id" { "Spot" }
          select id="spot_id" name="spot_id" onchange="this.form.submit()" {
            option value="" { "All Spots" }
            @for spot in spots {
              (mar_option(spot.id, &spot.name, filter.spot_id))
            }
          }
        }
        noscript { button type="submit" { "Filter" } }
      }

      table {
        thead {
          tr {
            th { "Date" }
            th { "Surfer" }
            th { "Spot" }
            th { "Crowd" }
            th { "Wind" }
            th { "Waves" }
          }
        }
        tbody {
          @for session in sessions {
            tr {
              td { (util::format_timestamp(&session.timestamp, "%Y-%m-%d %H:%M")) }
              td { (session.surfer) }
              td { (session.spot) }
              td { (util::format_rating(session.crowd)) }
              td { (util::format_rating(session.wind)) }
              td { (util::format_rating(session.waves)) }
            }
          }
        }
      }

      .nav-links {
        a href="/log" { "Log New Session" }
      }
    };

    self.v_root(self.title(), body)
  }

  pub fn v_log(&self, surfers: &[Surfer], spots: &[Spot]) -> Result<Markup> {
    let body = html! {
      form action="/log_session" method="post" {
        div {
          label for="surfer" { "Surfer" }
          select id="surfer" name="surfer_id" required="" {
            option value="" { "Select a surfer" }
            @for surfer in surfers {
              option value=(surfer.id) { (surfer.name) }
            }
          }
        }
        div {
          label for="spot" { "Spot" }
          select id="spot" name="spot_id" required="" {
            option value="" { "Select a spot" }
            @for spot in spots {
              option
                value=(spot.id)
                title=[spot.description.as_deref()]
                data-lat=[spot.latitude]
                data-lon=[spot.longitude]
                data-image=[spot.image_path.as_deref()]
                { (spot.name) }
            }
          }
        }
        (mar_rating("crowd", "Crowd", "How was the crowd?"))
        (mar_rating("wind", "Wind", "How was the wind?"))
        (mar_rating("waves", "Waves", "How were the waves?"))
        button type="submit" { "Log Session" }
      }
    };

    self.v_root("Log Surf Session", body)
  }
}

fn mar_option(id: i64, name: &str, selected: Option<i64>) -> Markup {
  html! {
    @if selected == Some(id) {
      option value=(id) selected="" { (name) }
    } @else {
      option value=(id) { (name) }
    }
  }
}

fn mar_rating(name: &str, label: &str, prompt: &str) -> Markup {
  html! {
    div {
      label for=(name) { (label) }
      select id=(name) name=(name) {
        option value="" { (prompt) }
        @for rating in Rating::iter() {
          option value=(rating.value()) { (rating.to_string()) }
        }
      }
    }
  }
}
