use std::{
    error::Error,
    io::{self, Write},
    path::PathBuf,
    thread,
    time::Instant,
};

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use eframe::{egui::ViewportBuilder, run_native};
use log::info;
use roosty_alarms::{
    app::AlarmApp,
    audio::AudioPlayer,
    config::Config,
    notify::{dispatch, AudioSink, TerminalSink},
    LocalClock, Scheduler, TickDriver,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// config file to use instead of the one in the user config directory
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a default config file
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// open the alarm window (the default)
    Gui,
    /// run alarms in the terminal, e.g. `run --alarm 1=07:30:00 --alarm 3=07:45:00`
    Run {
        #[clap(long = "alarm", short, value_parser = parse_alarm)]
        alarms: Vec<AlarmArg>,
    },
}

#[derive(Debug, Clone, Copy)]
struct AlarmArg {
    index: usize,
    time: NaiveTime,
}

/// `N=HH:MM:SS` with N counting alarms from 1, like the window does.
fn parse_alarm(s: &str) -> Result<AlarmArg, String> {
    let (number, time) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ALARM=HH:MM:SS, got `{s}`"))?;
    let number: usize = number
        .trim()
        .parse()
        .map_err(|e| format!("bad alarm number `{number}`: {e}"))?;
    let index = number
        .checked_sub(1)
        .ok_or_else(|| "alarms are numbered from 1".to_string())?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .map_err(|e| format!("bad time `{time}`: {e}"))?;
    Ok(AlarmArg { index, time })
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("roosty_alarms").expect("couldn't initialize logger");

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    match args.command {
        Some(Command::Init { force }) => {
            if force || !config_path.exists() {
                Config::new().save(&config_path)?;
                println!("wrote default config to {}", config_path.display());
            } else {
                println!(
                    "config already exists at {}, use --force to overwrite it",
                    config_path.display()
                );
            }
            Ok(())
        }
        Some(Command::Run { alarms }) => run_headless(&Config::load_or_default(&config_path)?, &alarms),
        Some(Command::Gui) | None => run_gui(Config::load_or_default(&config_path)?),
    }
}

fn run_gui(config: Config) -> Result<(), Box<dyn Error>> {
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Alarm Clock")
            .with_inner_size([760.0, 520.0]),
        ..Default::default()
    };
    run_native(
        "Roosty Alarms",
        native_options,
        Box::new(move |_| Ok(Box::new(AlarmApp::new(&config, AudioPlayer::spawn())))),
    )
    .map_err(|e| e.into())
}

/// Polls with a sleeping loop instead of repaints, same tick policy as the window.
fn run_headless(config: &Config, alarms: &[AlarmArg]) -> Result<(), Box<dyn Error>> {
    let mut scheduler = Scheduler::new(LocalClock, config.registry());
    let mut driver = TickDriver::new(config.tick_interval());
    let mut sink = TerminalSink::new(
        io::stdout(),
        AudioSink::new(AudioPlayer::spawn(), config.volume),
        config.time_format.clone(),
    );

    let requested = alarms.iter().map(|a| (a.index, a.time));
    let presets = config.presets.iter().map(|p| (p.index, p.time));
    for (index, time) in presets.chain(requested) {
        match scheduler.arm(index, time) {
            Ok(()) => println!("✅ Alarm {} set for {}", index + 1, time.format(&config.time_format)),
            Err(e) => eprintln!("⛔ {e}"),
        }
    }
    driver.request_now(Instant::now());

    while let Some(wait) = driver.until_next(Instant::now()) {
        thread::sleep(wait);
        let report = scheduler.run_once();
        if !report.events.is_empty() {
            println!();
        }
        for e in dispatch(&report.events, &mut sink) {
            eprintln!("{e}");
        }
        let pending = scheduler.registry().snapshot_pending();
        if !pending.is_empty() {
            let now = scheduler.now().format(&config.time_format);
            let waiting: Vec<_> = pending.iter().map(|i| (i + 1).to_string()).collect();
            print!("\r⏳ Alarm {} waiting... Current time: {now}", waiting.join(", "));
            io::stdout().flush()?;
        }
        driver.schedule(&report, Instant::now());
    }
    info!("no alarms pending, waiting for sounds to finish");
    let (_, audio) = sink.into_parts();
    audio.finish();
    Ok(())
}
