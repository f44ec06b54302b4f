/// AHFM Player - terminal stream player
use ahfm_console::{
    config::AppConfig,
    engine::SimulatedEngine,
    input::{parse_line, ConsoleInput, HELP},
    sink::{ConsoleSink, OutputMode},
};
use ahfm_playback::{command_channel, PlaybackService, ServiceCommand, StatusView};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ahfm-console")]
#[command(about = "Listen to AH.FM from the terminal", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AHFM_CONFIG")]
    config: Option<PathBuf>,

    /// Print notifications and events as JSON lines
    #[arg(long)]
    json: bool,

    /// Start playing right away
    #[arg(long)]
    autoplay: bool,

    /// Start with the player hidden, so the notification is shown
    #[arg(long)]
    background: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ahfm_console=info,ahfm_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::info!("Streaming from {}", config.playback.stream_address);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let sink = Arc::new(ConsoleSink::stdout(mode));

    let engine_settings = config.engine.clone();
    let mut service = PlaybackService::new(&config.playback, sink.clone(), |notifier| {
        Box::new(SimulatedEngine::new(notifier, engine_settings))
    })?;

    let printer = Arc::clone(&sink);
    service
        .controller()
        .subscribe(move |event| printer.event(event));

    let (commands, queue) = command_channel();
    commands.send(ServiceCommand::SetForeground(!cli.background))?;
    if cli.autoplay {
        commands.send(ServiceCommand::Toggle)?;
    }

    let controller = service.controller().clone();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                Some(ConsoleInput::Command(command)) => {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
                Some(ConsoleInput::Status) => {
                    println!("{}", StatusView::for_status(controller.status()));
                }
                Some(ConsoleInput::Help) => println!("{}", HELP),
                None if line.trim().is_empty() => {}
                None => println!("unknown command '{}', try 'help'", line.trim()),
            }
        }
        commands.send(ServiceCommand::Shutdown).ok();
    });

    println!("{}", HELP);
    service.run(&queue);
    Ok(())
}
