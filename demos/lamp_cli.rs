//! CLI application for controlling a GyverLamp.
//!
//! Run with: cargo run --example lamp_cli -- --help

use clap::{Parser, Subcommand};
use gyverlamp_rs::{HueSaturation, Lamp, LampConfig, PollOutcome, TurnOnRequest};

#[derive(Parser)]
#[command(name = "lamp-cli")]
#[command(about = "Control a GyverLamp from the command line", long_about = None)]
struct Cli {
    /// Host name or IP address of the lamp
    #[arg(short = 'H', long, global = true)]
    host: Option<String>,

    /// JSON configuration file (same keys as the host integration)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the lamp and print its state
    Status,

    /// Turn the lamp on, optionally changing attributes
    On {
        /// Brightness (1-255)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=255))]
        brightness: Option<u8>,

        /// Effect name, or a raw command token
        #[arg(short, long)]
        effect: Option<String>,

        /// Hue in degrees (0-360), requires --saturation
        #[arg(long, requires = "saturation")]
        hue: Option<f64>,

        /// Saturation in percent (0-100), requires --hue
        #[arg(long, requires = "hue")]
        saturation: Option<f64>,
    },

    /// Turn the lamp off
    Off,

    /// List configured effects
    Effects,

    /// Poll once and print diagnostics
    Diagnostics,
}

fn load_config(cli: &Cli) -> Result<LampConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => LampConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => {
            let host = cli
                .host
                .as_deref()
                .ok_or("A host is required. Use --host <HOST> or --config <FILE>")?;
            LampConfig::new(host)
        }
    };
    if let (Some(host), Some(_)) = (&cli.host, &cli.config) {
        config.host = host.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let mut lamp = Lamp::connect(&config).await?;

    match cli.command {
        Commands::Status => match lamp.poll().await {
            PollOutcome::Updated { .. } => {
                let state = lamp.state();
                println!("{} ({})", lamp.name(), lamp.address());
                println!("  Power: {}", if state.is_on() { "ON" } else { "OFF" });
                println!("  Brightness: {}", state.brightness());
                println!("  Hue: {:.1}", state.hue());
                println!("  Saturation: {:.1}%", state.saturation());
                println!("  Effect: {}", state.effect().unwrap_or("-"));
            }
            PollOutcome::Failed { error, .. } => eprintln!("Error getting status: {}", error),
        },

        Commands::On {
            brightness,
            effect,
            hue,
            saturation,
        } => {
            // The lamp only skips P_ON when the mirror says it is already on.
            lamp.poll().await;

            let mut request = TurnOnRequest::new();
            if let Some(b) = brightness {
                request.brightness(b);
            }
            if let Some(e) = &effect {
                request.effect(e);
            }
            if let (Some(h), Some(s)) = (hue, saturation) {
                let hs = HueSaturation::create(h, s)
                    .ok_or("Hue must be within 0-360 and saturation within 0-100")?;
                request.hue_saturation(&hs);
            }

            match lamp.turn_on(&request).await {
                Ok(()) => println!("Lamp turned ON"),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Commands::Off => match lamp.turn_off().await {
            Ok(()) => println!("Lamp turned OFF"),
            Err(e) => eprintln!("Error: {}", e),
        },

        Commands::Effects => {
            let registry = lamp.registry();
            for name in lamp.effect_list() {
                let id = registry.resolve(name)?;
                let marker = if registry.random_ids().contains(&id) { "*" } else { " " };
                println!("{marker} {id:>3}  {name}");
            }
        }

        Commands::Diagnostics => {
            lamp.poll().await;
            println!("{}", serde_json::to_string_pretty(&lamp.diagnostics())?);
        }
    }

    Ok(())
}
