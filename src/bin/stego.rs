//! # Stego Binary Entry Point
//!
//! Terminal frontend for hiding a message behind a click sequence and
//! revealing it again.
//!
//! ## Usage
//!
//! ```bash
//! # hide a message; clicks are display pixels on the image
//! stego encode --input photo.jpg --output secret.png \
//!   --message "meet at noon" --click 120,80 --click 400,90 --click 260,300
//!
//! # check whether an image carries a payload
//! stego inspect --input secret.png
//!
//! # reveal: type one click per line as "x y"
//! stego verify --input secret.png
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use click_stego::auth::{ClickRecorder, SessionEvent, VerificationSession};
use click_stego::common::config::StegoConfig;
use click_stego::common::error::StegoError;
use click_stego::common::image_io::{
    encode_png, ensure_lossless_path, load_pixel_buffer_async, png_data_url,
};
use click_stego::processing::{
    capacity_bits, encode, required_bits, try_decode, Payload, PixelBuffer,
};
use click_stego::utils::logging::init_logger;

/// Command-line arguments for the stego binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message in an image behind a click sequence
    Encode {
        /// Carrier image (any format the image crate reads)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the result; always PNG
        #[arg(short, long)]
        output: PathBuf,

        /// Message to hide
        #[arg(short, long)]
        message: String,

        /// Click position in display pixels, as X,Y. Give 3 or 4.
        #[arg(long = "click", value_parser = parse_click, required = true)]
        clicks: Vec<(f64, f64)>,

        /// Also print the result as a PNG data URL
        #[arg(long)]
        data_url: bool,
    },

    /// Report whether an image carries a hidden payload
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Enter the click sequence on stdin and reveal the message
    Verify {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn parse_click(value: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{}`", value))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn parse_click_line(line: &str) -> Option<(f64, f64)> {
    let mut parts = line.split(|c: char| c.is_whitespace() || c == ',').filter(|p| !p.is_empty());
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    Some((x, y))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = StegoConfig::from_optional_file(args.config.as_deref())?;

    match args.command {
        Command::Encode {
            input,
            output,
            message,
            clicks,
            data_url,
        } => run_encode(&config, input, output, message, clicks, data_url).await,
        Command::Inspect { input } => run_inspect(input).await,
        Command::Verify { input } => run_verify(&config, input).await,
    }
}

async fn run_encode(
    config: &StegoConfig,
    input: PathBuf,
    output: PathBuf,
    message: String,
    clicks: Vec<(f64, f64)>,
    data_url: bool,
) -> Result<()> {
    ensure_lossless_path(&output)?;

    let mut buffer = load_pixel_buffer_async(&input)
        .await
        .with_context(|| format!("loading {}", input.display()))?;
    let (width, height) = config.display.resolve(buffer.width(), buffer.height());

    let mut recorder = ClickRecorder::new(width, height);
    for (x, y) in clicks {
        recorder.record(x, y)?;
    }
    for point in recorder.points() {
        debug!("Point {} at ({:.3}, {:.3})", point.order, point.x, point.y);
    }
    let payload = Payload::checked(message, recorder.finish()?)?;

    let required = required_bits(&payload)?;
    let available = capacity_bits(&buffer);
    info!("Payload needs {} of {} available bits", required, available);

    encode_with_hint(&mut buffer, &payload)?;

    let png = encode_png(&buffer)?;
    tokio::fs::write(&output, &png)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    info!("✅ Message hidden in {}", output.display());

    if data_url {
        println!("{}", png_data_url(&png));
    }
    Ok(())
}

/// Embed, turning a capacity failure into advice for the user.
fn encode_with_hint(buffer: &mut PixelBuffer, payload: &Payload) -> Result<()> {
    match encode(buffer, payload) {
        Ok(()) => Ok(()),
        Err(e @ StegoError::CapacityExceeded { .. }) => {
            error!("❌ {}", e);
            bail!("{}: reduce the message or use a larger image", e);
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_inspect(input: PathBuf) -> Result<()> {
    let buffer = load_pixel_buffer_async(&input).await?;

    match try_decode(&buffer) {
        Ok(payload) => println!(
            "Hidden message found, protected by {} click points",
            payload.click_sequence.len()
        ),
        Err(e) if e.is_absent_payload() => {
            info!("{}", e);
            println!("No hidden message");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn run_verify(config: &StegoConfig, input: PathBuf) -> Result<()> {
    let buffer = load_pixel_buffer_async(&input).await?;

    let payload = match try_decode(&buffer) {
        Ok(payload) => payload,
        Err(e) if e.is_absent_payload() => {
            info!("{}", e);
            println!("No hidden message");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let (width, height) = config.display.resolve(buffer.width(), buffer.height());
    let points = payload.click_sequence.len();
    let mut session =
        VerificationSession::new(payload, width, height, config.verification.clone())?;
    let delay = Duration::from_millis(config.verification.feedback_delay_ms);

    println!(
        "Click {} points on the {}x{} image, one \"x y\" per line",
        points, width, height
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some((x, y)) = parse_click_line(&line) else {
            warn!("Ignoring input `{}`, expected \"x y\"", line.trim());
            continue;
        };

        match session.submit_click(x, y) {
            Ok(SessionEvent::Progress { step, remaining }) => {
                println!("✓ point {} ({} to go)", step, remaining);
            }
            Ok(SessionEvent::Unlocked(message)) => {
                println!("🔓 {}", message);
                return Ok(());
            }
            Err(StegoError::VerificationFailed { attempts_left }) => {
                println!("✗ wrong point, {} attempts left", attempts_left);
                tokio::time::sleep(delay).await;
                session.retry();
            }
            Err(e @ StegoError::LockedOut { .. }) => {
                println!("🔒 {}", e);
                return Err(anyhow!(e));
            }
            Err(e) => return Err(e.into()),
        }
    }

    bail!("input ended before the click sequence was completed")
}
