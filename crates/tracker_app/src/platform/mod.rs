mod app;
mod cli;
mod config;
mod logging;
mod render;

pub(crate) use app::run_app;
