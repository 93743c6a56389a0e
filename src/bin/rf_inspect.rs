//! Decode an uplink packet the way the cloud does.

use clap::Parser;
use regframe::{AgentConfig, Algorithm, ChannelState, Downlink, Packet, PipelineError, SecureChannel};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rf-inspect")]
#[command(about = "Open and decompress a captured uplink packet")]
struct Args {
    /// Packet bytes as hex (whitespace ignored)
    packet: String,

    /// Codec named in the upload (Delta16Var or TimeSeriesS4)
    #[arg(short, long, default_value = "TimeSeriesS4")]
    algorithm: Algorithm,

    /// Agent config supplying PSK and register count
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print raw decoded words instead of snapshots
    #[arg(long)]
    words: bool,
}

fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(text, 16).map_err(|e| format!("invalid hex byte '{text}': {e}"))
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    let bytes = parse_hex(&args.packet)?;

    let packet = Packet::parse(&bytes)?;
    println!(
        "seq {}  nonce {:02x?}  ciphertext {} bytes  tag {:02x?}",
        packet.seq,
        packet.nonce,
        packet.ciphertext.len(),
        packet.tag
    );

    // a one-off inspection has no replay history
    let channel = SecureChannel::restore(&config.psk, ChannelState::default())?;
    let mut downlink = Downlink::new(channel, config.register_count);

    if args.words {
        let words = downlink.receive_words(&bytes, args.algorithm)?;
        println!("{} words ({})", words.len(), args.algorithm);
        for chunk in words.chunks(config.frame_width()) {
            println!("{chunk:?}");
        }
        return Ok(());
    }

    match downlink.receive(&bytes, args.algorithm) {
        Ok(snapshots) => {
            println!("{} snapshots ({})", snapshots.len(), args.algorithm);
            for snap in &snapshots {
                let regs: Vec<String> = snap
                    .registers
                    .iter()
                    .map(|r| r.map_or_else(|| "-".to_string(), |v| v.to_string()))
                    .collect();
                println!("{}  {}", snap.timestamp, regs.join(" "));
            }
            Ok(())
        }
        Err(PipelineError::SnapshotLayout { words, frame_words }) => {
            Err(format!("{words} decoded words do not divide into {frame_words}-word snapshots; try --words").into())
        }
        Err(e) => Err(e.into()),
    }
}
