use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use image::{DynamicImage, ImageFormat};
use log::{info, warn, LevelFilter};
use maze::{
    util::{paint_path, parse_img},
    BfsSolver, Maze, Palette,
};

/// Finds the shortest way from the start pixel to the finish pixel of a maze image and draws it
/// onto a copy of the image.
#[derive(Parser, Debug)]
#[command(name = "maze", version, about)]
struct Args {
    /// Maze image to solve (bmp, png, ...)
    source: PathBuf,

    /// Where to save the solved image
    destination: PathBuf,

    /// JSON file overriding the wall, open, start, finish and path colours
    #[arg(long, value_name = "FILE")]
    palette: Option<PathBuf>,

    /// Log more details, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: &Args) -> Result<(), anyhow::Error> {
    let palette = match &args.palette {
        Some(path) => Palette::load(path)?,
        None => Palette::default(),
    };

    let img = image::open(&args.source)
        .with_context(|| format!("Failed to open {}", args.source.display()))?;
    info!(
        "loaded {}x{} image from {}",
        img.width(),
        img.height(),
        args.source.display()
    );

    let maze = parse_img(&img, &palette)?;
    info!(
        "solving from {} to {}",
        maze.start().point,
        maze.finish().point
    );

    let path = maze.solve(&BfsSolver)?;
    if path.is_empty() {
        warn!("no path between the start and the finish");
    } else {
        info!("found a path of {} steps", path.edges());
    }

    let solved = DynamicImage::ImageRgba8(paint_path(&img, &path, palette.path));
    // jpeg can not store an alpha channel
    let solved = match ImageFormat::from_path(&args.destination) {
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(solved.to_rgb8()),
        _ => solved,
    };
    solved
        .save(&args.destination)
        .with_context(|| format!("Failed to save {}", args.destination.display()))?;

    println!();
    println!("Completed:");
    println!("=========");
    if path.is_empty() {
        println!(
            "No path from start to finish, '{}' is an unmarked copy",
            args.destination.display()
        );
    } else {
        println!("See '{}' for solution", args.destination.display());
    }
    println!();

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!();
            println!("ERROR:");
            println!("======");
            println!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
