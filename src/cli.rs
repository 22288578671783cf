use crate::{
  config,
  error::{ErrorKind, Result},
  schema::{NewSpot, NewSurfer},
  seed,
  store::Store,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "surflog", about = "Log surf sessions per surfer and spot")]
pub struct Cli {
  /// config file
  #[arg(short, long, default_value = config::DEFAULT_PATH)]
  pub config: PathBuf,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// migrate, seed and run the web server (default)
  Serve,
  /// bring the data file up to the current schema
  Migrate,
  /// insert the reference surfers and spots
  Seed,
  /// register a new surfer
  AddSurfer {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    email: String,
  },
  /// register a new spot
  AddSpot {
    #[arg(short, long)]
    name: String,
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    description: Option<String>,
  },
}

pub fn parse() -> Cli {
  Cli::parse()
}

/// Runs a maintenance command. `Ok(true)` means the server should start.
pub fn run(command: &Command, store: &Store) -> Result<bool> {
  match command {
    Command::Serve => return Ok(true),

    Command::Migrate => store.migrate()?,

    Command::Seed => {
      store.migrate()?;
      let report = seed::run(store);
      println!(
        "inserted {}, skipped {}, failed {}, aborted {}",
        report.inserted, report.skipped, report.failed, report.aborted
      );
      if report.aborted {
        return Err(ErrorKind::StoreUnavailable("seeding aborted".into()).into());
      }
    }

    Command::AddSurfer { name, email } => {
      store.migrate()?;
      let surfer = store.insert_surfer(&NewSurfer::new(name, email)?)?;
      println!("surfer #{} {} <{}>", surfer.id, surfer.name, surfer.email);
    }

    Command::AddSpot {
      name,
      lat,
      lon,
      image,
      description,
    } => {
      store.migrate()?;
      let spot = store.insert_spot(&NewSpot {
        latitude: *lat,
        longitude: *lon,
        image_path: image.clone(),
        description: description.clone(),
        ..NewSpot::new(name)?
      })?;
      println!("spot #{} {}", spot.id, spot.name);
    }
  };
  Ok(false)
}
