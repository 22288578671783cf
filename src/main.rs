mod cli;
mod config;
mod error;
mod migration;
mod schema;
mod seed;
mod store;
mod util;
mod web;

use std::process::exit;

#[actix_rt::main]
async fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,actix_web=info")).init();

  if let Err(e) = run().await {
    error::display(&e);
    exit(1);
  }
}

async fn run() -> error::Result<()> {
  let args = cli::parse();
  let config = config::load(&args.config)?;

  let store = store::Store::open(&config)?;

  let command = args.command.unwrap_or(cli::Command::Serve);
  if !cli::run(&command, &store)? {
    return Ok(());
  }

  store.migrate()?;
  seed::run(&store);

  web::init(config, store).await
}
