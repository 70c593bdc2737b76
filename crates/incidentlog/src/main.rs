//! `inclog` - CLI for incidentlog
//!
//! This binary provisions the database and drives the records screen from
//! the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use incidentlog::about::About;
use incidentlog::cli::{AddCommand, Cli, Command, ConfigCommand, EditCommand, InitCommand};
use incidentlog::media::{
    CaptureOutcome, ConsoleAlerts, FileDocumentPicker, FileImagePicker, TodayDatePicker,
};
use incidentlog::playback::{AudioEngine, NoopEngine, SessionKey};
use incidentlog::{
    init_logging, BootState, Config, Error, Providers, RecordsScreen, SaveOutcome, Seed,
    SharedStorage, Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::About => {
            println!("{}", About::default());
            Ok(())
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Init(init_cmd) => handle_init(&config, init_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json).await,
        Command::List(list_cmd) => handle_list(&config, list_cmd.json).await,
        Command::Show(show_cmd) => handle_show(&config, show_cmd.id, show_cmd.json).await,
        Command::Add(add_cmd) => handle_add(&config, add_cmd).await,
        Command::Edit(edit_cmd) => handle_edit(&config, edit_cmd).await,
        Command::Delete(delete_cmd) => handle_delete(&config, delete_cmd.id).await,
        Command::Clear(clear_cmd) => handle_clear(&config, clear_cmd.yes).await,
        Command::Play(play_cmd) => handle_play(&config, play_cmd.id).await,
    }
}

/// Provision the database and open it.
async fn boot(config: &Config, seed: Seed) -> Result<SharedStorage> {
    let path = config.database_path();
    let state = BootState::boot(&seed, &path).await;
    if !state.is_ready() {
        bail!(state.message());
    }
    let open_path = path.clone();
    let storage = tokio::task::spawn_blocking(move || Storage::open(open_path))
        .await
        .context("database open task failed")?
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    Ok(SharedStorage::new(storage))
}

fn configured_seed(config: &Config) -> Seed {
    Seed::from_config(config.storage.seed_path.clone())
}

/// Build a mounted screen whose pickers answer with the given files.
async fn open_screen(
    config: &Config,
    photo: Option<PathBuf>,
    audio: Option<PathBuf>,
    engine: Arc<dyn AudioEngine>,
) -> Result<RecordsScreen> {
    let storage = boot(config, configured_seed(config)).await?;
    let providers = Providers {
        images: Arc::new(FileImagePicker::new(
            photo,
            config.media.image_extensions.clone(),
        )),
        documents: Arc::new(FileDocumentPicker::new(audio)),
        dates: Arc::new(TodayDatePicker),
        alerts: Arc::new(ConsoleAlerts),
    };
    let mut screen = RecordsScreen::new(storage, providers, engine, config.media.clone());
    screen.mount().await.context("failed to load records")?;
    Ok(screen)
}

async fn open_silent_screen(config: &Config) -> Result<RecordsScreen> {
    open_screen(config, None, None, Arc::new(NoopEngine)).await
}

async fn handle_init(config: &Config, cmd: InitCommand) -> Result<()> {
    let seed = cmd
        .seed
        .map_or_else(|| configured_seed(config), Seed::File);
    let path = config.database_path();
    match BootState::boot(&seed, &path).await {
        BootState::Ready(outcome) => {
            println!("Database: {}", path.display());
            println!("{}", serde_json::to_string(&outcome)?);
            Ok(())
        }
        state => bail!(state.message()),
    }
}

async fn handle_status(config: &Config, json: bool) -> Result<()> {
    let storage = boot(config, configured_seed(config)).await?;
    let stats = storage.run(|s| s.stats()).await?;
    let path = config.database_path();

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "stats": stats,
            "audio_engine": engine_name(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("inclog status");
        println!("-------------");
        println!("Database:      {}", path.display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Records:       {}", stats.total_records);
        println!("With audio:    {}", stats.with_audio);
        println!(
            "Newest:        {}",
            stats.newest_date.as_deref().unwrap_or("-")
        );
        println!("Audio engine:  {}", engine_name());
    }
    Ok(())
}

async fn handle_list(config: &Config, json: bool) -> Result<()> {
    let screen = open_silent_screen(config).await?;
    let cards = screen.cards();

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!("No records.");
        return Ok(());
    }
    for card in cards {
        let media = match (card.has_photo, card.has_audio) {
            (true, true) => "photo+audio",
            (true, false) => "photo",
            (false, true) => "audio",
            (false, false) => "-",
        };
        println!(
            "{:>5}  {}  {:<32}  {}",
            card.id, card.date, card.title, media
        );
    }
    Ok(())
}

async fn handle_show(config: &Config, id: i64, json: bool) -> Result<()> {
    let screen = open_silent_screen(config).await?;
    let Some(record) = screen.records().iter().find(|r| r.id == id) else {
        return Err(Error::RecordNotFound(id).into());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("Record {}", record.id);
        println!("  Date:        {}", record.date);
        println!("  Title:       {}", record.title);
        println!("  Description: {}", record.description);
        println!(
            "  Photo:       {}",
            payload_summary(record.photo.as_deref())
        );
        println!(
            "  Audio:       {}",
            payload_summary(record.audio.as_deref())
        );
    }
    Ok(())
}

fn payload_summary(payload: Option<&str>) -> String {
    match payload {
        Some(p) if !p.is_empty() => format!("{} base64 chars", p.len()),
        _ => "none".to_string(),
    }
}

async fn handle_add(config: &Config, cmd: AddCommand) -> Result<()> {
    let mut screen = open_screen(
        config,
        Some(cmd.photo),
        Some(cmd.audio),
        Arc::new(NoopEngine),
    )
    .await?;

    match cmd.date {
        Some(date) => screen.form_mut().set_date(date),
        None => {
            screen.pick_date().await?;
        }
    }
    screen.form_mut().set_title(cmd.title);
    screen.form_mut().set_description(cmd.description);
    capture_media(&mut screen, true, true).await?;

    report_save(screen.save().await?)
}

async fn handle_edit(config: &Config, cmd: EditCommand) -> Result<()> {
    if !cmd.has_changes() {
        bail!("nothing to change; pass at least one field");
    }
    let has_photo = cmd.photo.is_some();
    let has_audio = cmd.audio.is_some();
    let mut screen = open_screen(config, cmd.photo, cmd.audio, Arc::new(NoopEngine)).await?;

    if !screen.edit(cmd.id).await {
        return Err(Error::RecordNotFound(cmd.id).into());
    }
    if let Some(date) = cmd.date {
        screen.form_mut().set_date(date);
    }
    if let Some(title) = cmd.title {
        screen.form_mut().set_title(title);
    }
    if let Some(description) = cmd.description {
        screen.form_mut().set_description(description);
    }
    capture_media(&mut screen, has_photo, has_audio).await?;

    report_save(screen.save().await?)
}

async fn capture_media(screen: &mut RecordsScreen, photo: bool, audio: bool) -> Result<()> {
    if photo {
        let outcome = screen
            .pick_photo()
            .await
            .context("failed to attach photo")?;
        if outcome == CaptureOutcome::Denied {
            return Err(Error::permission_denied("photo library").into());
        }
    }
    if audio {
        screen
            .pick_audio()
            .await
            .context("failed to attach audio")?;
    }
    Ok(())
}

fn report_save(outcome: SaveOutcome) -> Result<()> {
    match outcome {
        SaveOutcome::Created(id) => println!("Created record {id}"),
        SaveOutcome::Updated(id) => println!("Updated record {id}"),
        SaveOutcome::NotFound(id) => {
            return Err(Error::RecordNotFound(id)).context("record was removed while editing");
        }
        SaveOutcome::Rejected(e) => return Err(Error::from(e)).context("record not saved"),
    }
    Ok(())
}

async fn handle_delete(config: &Config, id: i64) -> Result<()> {
    let mut screen = open_silent_screen(config).await?;
    if screen.delete(id).await? {
        println!("Deleted record {id}");
        Ok(())
    } else {
        Err(Error::RecordNotFound(id).into())
    }
}

async fn handle_clear(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        println!("This will delete every record.");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    let mut screen = open_silent_screen(config).await?;
    let removed = screen.delete_all().await?;
    println!("Deleted {removed} records");
    Ok(())
}

async fn handle_play(config: &Config, id: i64) -> Result<()> {
    let engine = audio_engine(config)?;
    let mut screen = open_screen(config, None, None, engine).await?;

    screen
        .play(SessionKey::Record(id))
        .await
        .with_context(|| format!("cannot play record {id}"))?;
    println!("Playing record {id}; press Ctrl-C to stop.");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Playback interrupted");
                break;
            }
            _ = ticker.tick() => {
                if screen.playback().is_finished() {
                    break;
                }
            }
        }
    }

    screen.unmount().await;
    Ok(())
}

#[cfg(feature = "audio")]
fn audio_engine(config: &Config) -> Result<Arc<dyn AudioEngine>> {
    let engine = incidentlog::playback::RodioEngine::new(config.playback.volume)
        .context("failed to open audio output")?;
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "audio"))]
fn audio_engine(_config: &Config) -> Result<Arc<dyn AudioEngine>> {
    eprintln!("Built without the `audio` feature; the clip is decoded but not played.");
    Ok(Arc::new(NoopEngine))
}

fn engine_name() -> &'static str {
    if cfg!(feature = "audio") {
        "rodio"
    } else {
        "noop"
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!(
                    "  Seed path:          {}",
                    config
                        .storage
                        .seed_path
                        .as_ref()
                        .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
                );
                println!();
                println!("[Media]");
                println!("  Max photo bytes:    {}", config.media.max_photo_bytes);
                println!("  Max audio bytes:    {}", config.media.max_audio_bytes);
                println!(
                    "  Audio extensions:   {}",
                    config.media.audio_extensions.join(", ")
                );
                println!(
                    "  Image extensions:   {}",
                    config.media.image_extensions.join(", ")
                );
                println!();
                println!("[Playback]");
                println!("  Volume:             {}", config.playback.volume);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_at(path: PathBuf) -> Config {
        let mut config = Config::default();
        config.storage.database_path = Some(path);
        config
    }

    #[tokio::test]
    async fn test_boot_opens_created_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path().join("SQLite").join("911.db"));

        let storage = boot(&config, Seed::Empty).await.unwrap();
        assert_eq!(storage.run(|s| s.count()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_boot_reports_unopenable_database() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("911.db");
        std::fs::write(&target, b"not a sqlite file").unwrap();

        let err = boot(&config_at(target), Seed::Empty).await.unwrap_err();
        assert!(err.to_string().contains("failed to open database"));
    }
}
