//! `farm-assets [--config FILE] [PATH...]`
//!
//! Preloads the given logical paths, or the whole dashboard catalog when none
//! are given, and prints whether each one resolved to a real asset or to a
//! placeholder. Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, bail};
use farm_assets::{LoaderConfig, ModelLoader};

struct Args {
    config: Option<String>,
    paths: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args {
        config: None,
        paths: Vec::new(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let file = args.next().context("--config expects a file")?;
                parsed.config = Some(file);
            }
            "--help" | "-h" => {
                println!("usage: farm-assets [--config FILE] [PATH...]");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown flag {flag}"),
            _ => parsed.paths.push(arg),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(file) => LoaderConfig::from_file(file)?,
        None => LoaderConfig::default(),
    }
    .with_env_overrides()?;
    log::info!("loading assets from {}", config.asset_root.display());

    let loader = ModelLoader::from_config(config);
    let preloader = loader.preloader();
    let report = if args.paths.is_empty() {
        preloader.preload_defaults().await
    } else {
        preloader.preload_all(args.paths).await
    };

    for (path, status) in report.iter() {
        let label = if status.ok { "asset" } else { "placeholder" };
        println!("{label:<12} {path}");
    }
    Ok(())
}
