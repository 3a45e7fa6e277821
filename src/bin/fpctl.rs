//! Human-facing CLI glue (G4) over the fingerprinting engine. Command
//! parsing and output formatting are explicitly out of the core's scope;
//! this binary is thin wiring, not where the engineering lives.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use landmark_fp::audio;
use landmark_fp::store::sqlite::SqliteStore;
use landmark_fp::{Config, Engine, SongMetadata};

#[derive(Parser)]
#[command(name = "fpctl", about = "Landmark-pair audio fingerprint store")]
struct Cli {
    /// Path to the sqlite posting store.
    #[arg(long, default_value = "fingerprints.sqlite")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fingerprint an audio file and add it to the store.
    Add {
        path: PathBuf,
        #[arg(long, default_value = "Unknown title")]
        title: String,
        #[arg(long, default_value = "Unknown artist")]
        artist: String,
    },
    /// Identify an audio file against the store.
    Identify { path: PathBuf },
    /// List songs currently in the store.
    List,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> landmark_fp::Result<()> {
    let db_path = cli.db.to_string_lossy().into_owned();
    let store = SqliteStore::open(&db_path)?;
    let config = Config::default();
    let engine = Engine::new(store, config.clone());

    match cli.command {
        Command::Add { path, title, artist } => {
            let samples = audio::load_and_resample(&path, config.sample_rate)?;
            let duration_seconds = samples.len() as f64 / config.sample_rate as f64;
            let id = engine.add_song(
                SongMetadata {
                    title: title.clone(),
                    artist: artist.clone(),
                    source_path: path.to_string_lossy().into_owned(),
                },
                &samples,
                duration_seconds,
            )?;
            println!("Added \"{artist} - {title}\" as {id}");
        }
        Command::Identify { path } => {
            let samples = audio::load_and_resample(&path, config.sample_rate)?;
            let matches = engine.identify(&samples)?;

            if matches.is_empty() {
                println!("No match found.");
            } else {
                for candidate in matches {
                    let song = engine.store().get_song(candidate.song_id)?;
                    match song {
                        Some(song) => println!(
                            "{} - {} (confidence {:.2})",
                            song.artist, song.title, candidate.confidence
                        ),
                        None => println!(
                            "{} (confidence {:.2})",
                            candidate.song_id, candidate.confidence
                        ),
                    }
                }
            }
        }
        Command::List => {
            for song in engine.store().list_songs()? {
                println!("{} | {} - {} ({:.1}s)", song.id, song.artist, song.title, song.duration_seconds);
            }
        }
    }

    Ok(())
}
