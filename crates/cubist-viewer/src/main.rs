mod config;
mod viewer;

use std::process::ExitCode;

use anyhow::Result;
use cubist_engine::animation::CancelToken;
use cubist_engine::assets::{ImageLoader, ImageSet, PendingImages};
use cubist_engine::device::GpuInit;
use cubist_engine::logging::{LoggingConfig, init_logging};
use cubist_engine::scene::{Scene, SceneConfig, TEXTURE_KEY};
use cubist_engine::window::{Runtime, RuntimeConfig};

use config::{Command, USAGE, ViewerConfig};
use viewer::ViewerApp;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = match ViewerConfig::from_args(std::env::args().skip(1))? {
        Command::Run(config) => config,
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    log::info!("starting {} variant", config.variant);

    let images = if config.variant.needs_texture() {
        ImageLoader::new()
            .with(TEXTURE_KEY, &config.image_path)
            .spawn()?
    } else {
        PendingImages::ready(ImageSet::new())
    };

    let cancel = CancelToken::new();
    let scene = Scene::new(
        SceneConfig {
            variant: config.variant,
            cancel: cancel.clone(),
            ..SceneConfig::default()
        },
        images,
    );

    let runtime = RuntimeConfig {
        cancel,
        ..RuntimeConfig::default()
    };

    let app = Runtime::run(runtime, GpuInit::default(), ViewerApp::new(scene))?;
    match app.into_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
