use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use nanoleaf_twin_lib::control_interface::{ControlInterface, DEFAULT_PORT};
use nanoleaf_twin_lib::digital_twin::{DigitalTwin, SyncOptions, TempOptions};
use nanoleaf_twin_lib::effects::{DisplayCommand, EffectsClient};
use nanoleaf_twin_lib::layout::LayoutClient;
use nanoleaf_twin_lib::led::color::Rgb;
use nanoleaf_twin_lib::rhythm::RhythmClient;
use nanoleaf_twin_lib::state::StateClient;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    handle_cli(cli).await
}

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(
    name = "nanoleaf_twin",
    about = "Per-panel control of Nanoleaf light panels",
    version
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Supported output formats for structured responses.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Plain text format.
    Plaintext,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

/// Subcommands available for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Subcommand for operations that require device communication
    #[clap(name = "device-call")]
    DeviceCall {
        /// Host name or IP address of the Nanoleaf controller
        #[clap(long, env = "NANOLEAF_HOST")]
        host: String,

        /// Port of the Nanoleaf OpenAPI
        #[clap(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Auth token obtained by pairing with the controller
        #[clap(long, env = "NANOLEAF_TOKEN", hide_env_values = true)]
        token: String,

        /// Request timeout in milliseconds
        #[clap(long = "timeout", value_parser = parse_duration, default_value = "5000")]
        timeout: Duration,

        #[clap(subcommand)]
        action: DeviceAction,
    },
}

fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let millis = s
        .parse::<u64>()
        .map_err(|_| "could not parse duration in milliseconds")?;
    Ok(Duration::from_millis(millis))
}

/// A `PANEL_ID=COLOR` assignment, e.g. `12=#FF9900` or `12=orange`.
#[derive(Clone, Copy, Debug)]
pub struct PanelColor {
    pub panel_id: u32,
    pub color: Rgb,
}

fn parse_panel_color(s: &str) -> Result<PanelColor, String> {
    let (id, color) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PANEL_ID=COLOR, got {:?}", s))?;
    let panel_id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid panel id {:?}: {}", id, e))?;
    let color = Rgb::from_name_or_hex(color).map_err(|e| e.to_string())?;
    Ok(PanelColor { panel_id, color })
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    Rgb::from_name_or_hex(s).map_err(|e| e.to_string())
}

/// Actions available under the `device-call` subcommand
#[derive(Subcommand)]
pub enum DeviceAction {
    /// Print the device's information
    #[clap(name = "print-config")]
    PrintConfig {
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,
    },
    /// Lists the stored effects.
    #[clap(name = "list-effects")]
    ListEffects,
    /// Gets the currently selected effect.
    #[clap(name = "get-effect")]
    GetEffect,
    /// Selects a stored effect by name.
    #[clap(name = "select-effect")]
    SelectEffect { name: String },
    /// Fetches the panel positions.
    #[clap(name = "get-positions")]
    GetPositions {
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,
    },
    /// Gets the global orientation in degrees.
    #[clap(name = "get-orientation")]
    GetOrientation,
    /// Sets the global orientation in degrees (clamped to 0..360).
    #[clap(name = "set-orientation")]
    SetOrientation {
        #[clap(allow_negative_numbers = true)]
        angle: i64,
    },
    /// Prints the rhythm module status.
    #[clap(name = "rhythm-info")]
    RhythmInfo {
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,
    },
    /// Sets the rhythm audio source: 0, 1, microphone, mic or aux.
    #[clap(name = "set-rhythm-mode")]
    SetRhythmMode { mode: String },
    /// Turns the device on.
    #[clap(name = "turn-on")]
    TurnOn,
    /// Turns the device off.
    #[clap(name = "turn-off")]
    TurnOff,
    /// Sets the global brightness (0-100).
    #[clap(name = "set-brightness")]
    SetBrightness {
        #[clap(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,

        /// Fade time in seconds
        #[clap(long)]
        duration: Option<u32>,
    },
    /// Prints the panel ids in scene order.
    #[clap(name = "twin-ids")]
    TwinIds,
    /// Paints panels with a static scene.
    #[clap(name = "paint")]
    Paint {
        /// Panel colors as PANEL_ID=COLOR, COLOR being #RRGGBB or a color name
        #[clap(long = "color", value_parser = parse_panel_color)]
        colors: Vec<PanelColor>,

        /// Color for every panel not given with --color
        #[clap(long, value_parser = parse_color)]
        all: Option<Rgb>,

        /// Transition time in milliseconds
        #[clap(long, default_value_t = 10)]
        transition: u32,

        /// Brightness overlay in percent
        #[clap(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: Option<u8>,

        /// `displayTemp` shows the scene without replacing the current effect
        #[clap(long, value_enum, default_value_t = DisplayCommand::Display)]
        command: DisplayCommand,

        /// Only send the panels given with --color
        #[clap(long)]
        only_listed: bool,
    },
    /// Shows panel colors temporarily, then restores the previous effect.
    #[clap(name = "blink")]
    Blink {
        /// Panel colors as PANEL_ID=COLOR, COLOR being #RRGGBB or a color name
        #[clap(long = "color", value_parser = parse_panel_color, required = true)]
        colors: Vec<PanelColor>,

        /// How long the colors stay up, in milliseconds
        #[clap(long, value_parser = parse_duration, default_value = "2000")]
        duration: Duration,

        /// Transition time in milliseconds
        #[clap(long, default_value_t = 60)]
        transition: u32,

        /// Brightness overlay in percent
        #[clap(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: Option<u8>,
    },
}

fn print_structured<T: Serialize + std::fmt::Debug>(value: &T, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Plaintext => println!("{:#?}", value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

async fn handle_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::DeviceCall {
            host,
            port,
            token,
            timeout,
            action,
        } => {
            let control = ControlInterface::with_timeout(&host, port, &token, timeout)
                .await
                .with_context(|| format!("Failed to connect to {}:{}", host, port))?;
            handle_device_action(control, action).await?;
        }
    }

    Ok(())
}

async fn handle_device_action(control: ControlInterface, action: DeviceAction) -> Result<()> {
    match action {
        DeviceAction::PrintConfig { output } => {
            print_structured(control.get_device_info(), output)?;
        }
        DeviceAction::ListEffects => {
            let effects = EffectsClient::new(&control).get_effects_list().await?;
            println!("Available effects:");
            for name in effects {
                println!("  {}", name);
            }
        }
        DeviceAction::GetEffect => {
            let current = EffectsClient::new(&control).get_selected_effect().await?;
            println!("Selected effect: {}", current);
        }
        DeviceAction::SelectEffect { name } => {
            EffectsClient::new(&control).select_effect(&name).await?;
            println!("Effect {:?} selected", name);
        }
        DeviceAction::GetPositions { output } => {
            let positions = LayoutClient::new(&control).get_positions().await?;
            print_structured(&positions, output)?;
        }
        DeviceAction::GetOrientation => {
            match LayoutClient::new(&control).get_global_orientation().await? {
                Some(angle) => println!("Global orientation: {}", angle),
                None => println!("Global orientation not reported by the device"),
            }
        }
        DeviceAction::SetOrientation { angle } => {
            let layout = LayoutClient::new(&control);
            layout.set_global_orientation(angle).await?;
            println!(
                "Global orientation set, now {:?}",
                layout.get_global_orientation().await?
            );
        }
        DeviceAction::RhythmInfo { output } => {
            let rhythm = RhythmClient::new(&control);
            let info = rhythm.get_info().await;
            if info.is_empty() {
                println!("No rhythm module reported by the device");
            } else {
                print_structured(&info, output)?;
                println!("Active: {}", rhythm.is_active().await);
                println!("Mode: {:?}", rhythm.get_mode().await);
            }
        }
        DeviceAction::SetRhythmMode { mode } => {
            RhythmClient::new(&control).set_mode_str(&mode).await?;
            println!("Rhythm mode set to {}", mode);
        }
        DeviceAction::TurnOn => {
            StateClient::new(&control).turn_on().await?;
            println!("Device turned on");
        }
        DeviceAction::TurnOff => {
            StateClient::new(&control).turn_off().await?;
            println!("Device turned off");
        }
        DeviceAction::SetBrightness { value, duration } => {
            StateClient::new(&control)
                .set_brightness(value, duration)
                .await?;
            println!("Brightness set to {}", value);
        }
        DeviceAction::TwinIds => {
            let twin = DigitalTwin::create(control).await?;
            for panel in twin.panels() {
                println!("{:>6}  x={:<6} y={}", panel.panel_id, panel.x, panel.y);
            }
        }
        DeviceAction::Paint {
            colors,
            all,
            transition,
            brightness,
            command,
            only_listed,
        } => {
            if colors.is_empty() && all.is_none() {
                return Err(anyhow!("At least one --color or --all must be specified"));
            }
            let mut twin = DigitalTwin::create(control).await?;
            if let Some(all) = all {
                twin.set_all_colors(all);
            }
            for panel_color in &colors {
                twin.set_color(panel_color.panel_id, panel_color.color)?;
            }
            let only = only_listed.then(|| colors.iter().map(|c| c.panel_id).collect());
            twin.sync(&SyncOptions {
                transition_ms: transition,
                command,
                only,
                brightness,
            })
            .await?;
            println!("Scene sent with {}", command);
        }
        DeviceAction::Blink {
            colors,
            duration,
            transition,
            brightness,
        } => {
            let mut twin = DigitalTwin::create(control).await?;
            for panel_color in &colors {
                twin.set_color(panel_color.panel_id, panel_color.color)?;
            }
            let only: Vec<u32> = colors.iter().map(|c| c.panel_id).collect();
            twin.apply_temp(&TempOptions {
                transition_ms: transition,
                duration,
                only: Some(only.clone()),
                brightness,
            })
            .await?;
            println!("Blinked panels {:?}, restored previous effect", only);
        }
    }

    Ok(())
}
