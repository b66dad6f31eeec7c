// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod app;
mod assets;
mod config;
mod controls;
mod layers;
mod map;
mod ui;

use clap::Parser;
use eframe::egui;
use log::{info, warn};
use mimalloc::MiMalloc;

use assets::{AssetLoader, AssetRoot, DiskCache};
use config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Environmental layer map viewer
#[derive(Parser, Debug)]
#[command(name = "envatlas-desktop", version)]
struct Args {
    /// Directory or http(s) base URL for raster and GeoJSON assets
    #[arg(long)]
    asset_root: Option<String>,

    /// Overwrite the configuration file with defaults
    #[arg(long, default_value_t = false)]
    reset_config: bool,

    /// Print the configuration file path and exit
    #[arg(long, default_value_t = false)]
    print_config_path: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let config = if args.reset_config {
        info!("Resetting configuration to defaults");
        AppConfig::reset()?
    } else {
        AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load configuration, using defaults: {e}");
            AppConfig::default()
        })
    };

    let asset_root = AssetRoot::parse(args.asset_root.as_deref().unwrap_or(&config.asset_root));
    info!("Asset root: {asset_root:?}");

    let cache = match DiskCache::in_user_cache() {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!("Asset cache unavailable: {e}");
            None
        }
    };
    let loader = AssetLoader::new(asset_root, cache)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("EnvAtlas Desktop"),
        ..Default::default()
    };

    info!("Starting EnvAtlas Desktop...");
    eframe::run_native(
        "EnvAtlas Desktop",
        options,
        Box::new(move |cc| Ok(Box::new(app::EnvAtlasApp::new(cc, config, loader)))),
    )?;

    Ok(())
}
