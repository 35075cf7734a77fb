use clap::Parser;
use log::{warn, LevelFilter};
use std::error::Error;
use std::process::exit;

mod args;
mod datasets;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = datasets::run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured ({:?}): {}", e.kind(), e);
        let mut source = e.source();
        while let Some(s) = source {
            eprintln!("  caused by: {}", s);
            source = s.source();
        }
        exit(1);
    }
}
