//! gameterm - console demo
//!
//! Opens a raw-mode console and walks through the widgets: a selection menu
//! leading to the line editor, a bounded number prompt and a truecolor swatch.
//!
//! ```text
//! gameterm                # vertical main menu
//! gameterm --horizontal   # horizontal main menu
//! gameterm --save-config  # write the effective config and exit
//! ```

use std::env;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gameterm::config::Config;
use gameterm::{Console, Orientation, Rgb, SelectionModal};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line options
#[derive(Debug, Default)]
struct Args {
    orientation: Option<Orientation>,
    save_config: bool,
}

fn print_help() {
    eprintln!("gameterm {} - raw terminal console demo", VERSION);
    eprintln!();
    eprintln!("Usage: gameterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --horizontal          Horizontal main menu (Left/Right)");
    eprintln!("  --vertical            Vertical main menu (Up/Down)");
    eprintln!("  --save-config         Write the effective config file and exit");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.gameterm/config.toml");
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                eprintln!("gameterm {}", VERSION);
                std::process::exit(0);
            }
            "--horizontal" => args.orientation = Some(Orientation::Horizontal),
            "--vertical" => args.orientation = Some(Orientation::Vertical),
            "--save-config" => args.save_config = true,
            other => return Err(format!("Unknown argument: {}. Use -h for help.", other)),
        }
    }
    Ok(args)
}

/// Log to a file; stdout belongs to the raw terminal.
fn init_logging(config: &Config) {
    let Some(dir) = Config::config_dir() else {
        return;
    };
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("gameterm.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut config = Config::load();
    init_logging(&config);
    info!("gameterm {} starting", VERSION);

    if let Some(orientation) = args.orientation {
        config.menu.orientation = orientation;
    }
    if args.save_config {
        config.save().map_err(anyhow::Error::msg)?;
        info!("Config saved");
        return Ok(());
    }

    let result = run(&config, config.menu.orientation);
    if let Err(e) = &result {
        error!("Session failed: {}", e);
    }
    result
}

fn run(config: &Config, orientation: Orientation) -> anyhow::Result<()> {
    let mut console = Console::open()?;

    loop {
        let choice = SelectionModal::new(
            "gameterm demo\nUse the arrow keys and Enter.",
            ["Type a line", "Pick a number", "Color swatch", "Quit"],
            orientation,
        )?
        .with_color(config.menu.highlight)
        .display_on(&mut console)?;

        match choice {
            0 => {
                console.clear_screen()?;
                console.print("Say something: ")?;
                let line = console.read_line()?;
                console.print(format_args!("\nYou said: {}\nPress Enter.", line))?;
                console.wait_for_enter()?;
            }
            1 => {
                let n = console.read_int("Enter a number between 1 and 10: ", 1, 10)?;
                console.hide_cursor()?;
                console.print(format_args!("\nGot {}. Press Enter.", n))?;
                console.wait_for_enter()?;
            }
            2 => {
                swatch(&mut console, config)?;
                console.wait_for_enter()?;
            }
            _ => break,
        }
    }

    console.clear_screen()?;
    Ok(())
}

fn swatch(console: &mut Console, config: &Config) -> gameterm::Result<()> {
    console.clear_screen()?;
    console.hide_cursor()?;
    console.set_foreground_color(config.colors.accent)?;
    for row in 0..8u32 {
        for col in 0..32u32 {
            let shade = Rgb::new((col * 8) as u8, (row * 32) as u8, 160);
            console.set_background_color(shade)?;
            console.print(' ')?;
        }
        console.reset_background_color()?;
        console.newline()?;
    }
    console.set_background_color(config.colors.background)?;
    console.print(" Press Enter ")?;
    console.reset_background_color()?;
    console.reset_foreground_color()
}
