#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

mod cli;
mod config_doc;
mod discover;
mod error;
mod layout;
mod log_utils;
mod process;
mod relocate;
mod samples;
mod threads;
mod version;

fn main() -> anyhow::Result<()> {
    let cfg = cli::handle_cli()?;
    process::run_setup(&cfg)
}
