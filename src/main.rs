mod cards;
mod cli;
mod config;
mod constants;
mod error;
mod game;
mod logging;
mod merge;
mod movie;
mod reconcile;
mod render;
mod session;
mod shuffle;
mod slideshow;
mod storage;

use std::process;

fn main() {
    process::exit(cli::run_cli());
}
