pub mod controller;
pub mod model;
mod view;
