use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image_classifier::{
    client::{describe_error, render_prediction, DemoClient, DEFAULT_API_URL},
    config::DEFAULT_BIND_ADDR,
    image::{ImageLoader, ImagePreprocessor, ImageTransforms, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH},
    Classifier, Config, RandomClassifier,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-classifier")]
#[command(about = "Image Classification CLI - a tool for image preprocessing and classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Fixed seed for the random classifier
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the class of an image
    Predict {
        /// Path to the image file
        image_path: PathBuf,
    },
    /// Resize an image to the given dimensions
    Resize {
        /// Path to the input image file
        image_path: PathBuf,
        /// Target width in pixels
        #[arg(allow_negative_numbers = true)]
        width: i64,
        /// Target height in pixels
        #[arg(allow_negative_numbers = true)]
        height: i64,
        /// Path to save the resized image
        output_path: PathBuf,
    },
    /// Preprocess an image (convert to RGB and resize)
    Preprocess {
        /// Path to the input image file
        image_path: PathBuf,
        /// Path to save the preprocessed image
        output_path: PathBuf,
        /// Target width
        #[arg(long, default_value_t = DEFAULT_TARGET_WIDTH, allow_negative_numbers = true)]
        width: i64,
        /// Target height
        #[arg(long, default_value_t = DEFAULT_TARGET_HEIGHT, allow_negative_numbers = true)]
        height: i64,
    },
    /// Convert an image to RGB mode
    ToRgb {
        /// Path to the input image file
        image_path: PathBuf,
        /// Path to save the RGB image
        output_path: PathBuf,
    },
    /// Show size and color mode of an image
    Info {
        /// Path to the image file
        image_path: PathBuf,
    },
    /// Start the HTTP API
    Serve {
        /// Server bind address
        #[arg(long, default_value = DEFAULT_BIND_ADDR)]
        bind: String,

        /// Number of worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Enable development mode
        #[arg(long)]
        dev: bool,
    },
    /// Send an image to a running API as JPEG and show the predicted class
    Demo {
        /// Path to the image file
        image_path: PathBuf,

        /// Base URL of the API
        #[arg(long, default_value = DEFAULT_API_URL)]
        api_url: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(cli.log_level.as_deref().unwrap_or(default_level));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Predict { image_path } => {
            let image = ImageLoader::from_path(&image_path)?;
            let classifier = RandomClassifier::from_seed(cli.seed);
            let predicted_class = classifier.classify(&image)?;
            println!("Predicted class: {}", predicted_class);
        }
        Commands::Resize {
            image_path,
            width,
            height,
            output_path,
        } => {
            let image = ImageLoader::from_path(&image_path)?;
            let resized = ImageTransforms::resize(&image, width, height)?;
            ImageLoader::save(&resized, &output_path)?;
            println!(
                "Image resized to {}x{} and saved to {}",
                width,
                height,
                output_path.display()
            );
        }
        Commands::Preprocess {
            image_path,
            output_path,
            width,
            height,
        } => {
            let image = ImageLoader::from_path(&image_path)?;
            let preprocessed = ImagePreprocessor::preprocess(&image, width, height)?;
            ImageLoader::save(&preprocessed, &output_path)?;
            println!(
                "Image preprocessed (RGB, {}x{}) and saved to {}",
                width,
                height,
                output_path.display()
            );
        }
        Commands::ToRgb {
            image_path,
            output_path,
        } => {
            let image = ImageLoader::from_path(&image_path)?;
            let rgb = ImageTransforms::to_canonical_color(&image)?;
            ImageLoader::save(&rgb, &output_path)?;
            println!("Image converted to RGB and saved to {}", output_path.display());
        }
        Commands::Info { image_path } => {
            let image = ImageLoader::from_path(&image_path)?;
            let info = ImageTransforms::inspect(&image)?;
            println!("Image information:");
            println!("  Size: {}x{}", info.width, info.height);
            println!("  Mode: {}", info.mode);
        }
        Commands::Serve { bind, workers, dev } => {
            let config = Config::new(bind, workers, dev, cli.seed)?;
            tracing::info!("Starting image classification service...");
            tracing::info!("Bind address: {}", config.bind_addr);
            tracing::info!("Worker threads: {}", config.workers);

            runtime(config.workers)?.block_on(image_classifier::web::serve(config))?;
        }
        Commands::Demo {
            image_path,
            api_url,
        } => {
            let image = ImageLoader::from_path(&image_path)?;
            let client = DemoClient::new(&api_url)?;
            match runtime(1)?.block_on(client.predict(&image)) {
                Ok(response) => println!("{}", render_prediction(&response)),
                Err(err) => anyhow::bail!("{}", describe_error(&err)),
            }
        }
    }

    Ok(())
}

fn runtime(workers: usize) -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")
}
