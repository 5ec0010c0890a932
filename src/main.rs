use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use youku2coco::{process_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dirname = PathBuf::from(&args.youku_dir);
    if !dirname.exists() {
        error!("The specified youku_dir does not exist: {}", args.youku_dir);
        return ExitCode::FAILURE;
    }

    info!(
        "Starting Youku to COCO conversion of the {} split...",
        args.split.name()
    );

    match process_dataset(&args) {
        Ok(coco) => {
            info!(
                "COCO conversion completed: {} images, {} annotations.",
                coco.images.len(),
                coco.annotations.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
