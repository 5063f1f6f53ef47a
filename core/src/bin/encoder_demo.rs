//! Runs one encoder block over a random token sequence.
//!
//! ```text
//! encoder-demo [config.json]
//! SEED=7 RUST_LOG=debug encoder-demo
//! ```

use std::env;
use std::process::ExitCode;

use encoder_rs::config::EncoderConfig;
use encoder_rs::init::seeded_rng;
use encoder_rs::models::Encoder;
use rand::Rng;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> encoder_rs::Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => EncoderConfig::from_json_file(&path)?,
        None => EncoderConfig::reference(),
    };
    let seed = env::var("SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    log::info!("config {:?}, seed {}", config, seed);

    let mut rng = seeded_rng(seed);
    let encoder = Encoder::<f32>::random(config.clone(), &mut rng)?;

    let tokens: Vec<usize> = (0..config.seq_len)
        .map(|_| rng.random_range(0..config.vocab_size))
        .collect();
    log::debug!("tokens {:?}", tokens);

    let attended = encoder.attend(&tokens, false)?;
    let checksum: f64 = attended.data().iter().map(|&v| f64::from(v)).sum();
    log::info!(
        "attention finished: output {:?}, checksum {:.6}",
        attended.shape(),
        checksum
    );

    let out = encoder.forward(&tokens, false)?;
    log::info!("block output {:?}", out.shape());
    Ok(())
}
