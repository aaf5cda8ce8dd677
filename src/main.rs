//! Entry point for the **sway-icon-to-go** daemon.
//!
//! Without a subcommand the daemon subscribes to sway's window events on a
//! background thread and processes them on the main thread.  A third thread
//! waits for `SIGHUP` and reloads the configuration.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use nix::sys::signal::{SigSet, Signal};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use sway_icon_to_go::config::{FileConfigSource, FormatOverrides};
use sway_icon_to_go::daemon::Daemon;
use sway_icon_to_go::fontawesome;
use sway_icon_to_go::proc::{LinuxExecutableLookup, ProcessNameResolver};
use sway_icon_to_go::reload::{ActiveConfig, ConfigReloader, Generation};
use sway_icon_to_go::resolver::IconResolver;
use sway_icon_to_go::sway::client::SwayClient;
use sway_icon_to_go::sway::events::SwayEventSource;
use sway_icon_to_go::traits::{ConfigSource, EventSource};

#[derive(Parser)]
#[command(
    name = "sway-icon-to-go",
    about = "Rename sway workspaces after the icons of their windows",
    version
)]
struct Cli {
    /// Path to app-icons.yaml; discovered under $XDG_CONFIG_HOME when omitted.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Drop duplicate icons within a workspace name (`-u` alone means true).
    #[arg(
        short,
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    uniq: Option<bool>,
    /// Cut each icon to this many characters (0 or -1 disables).
    #[arg(
        short,
        long,
        value_name = "N",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-1..)
    )]
    length: Option<i32>,
    /// String placed between icons.
    #[arg(short, long, value_name = "STR")]
    delimiter: Option<String>,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the Font Awesome fonts installed on this system.
    Awesome,
    /// Turn a Font Awesome all.css into a glyph table (fa-icons.yaml) on stdout.
    Parse {
        /// Stylesheet to read instead of downloading it; `-` reads stdin.
        file: Option<PathBuf>,
        /// Stylesheet to download when no file is given.
        #[arg(long, value_name = "URL", default_value = fontawesome::DEFAULT_STYLES_URL)]
        url: String,
        /// Print JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn overrides(&self) -> FormatOverrides {
        FormatOverrides {
            uniq: self.uniq,
            length: self.length,
            delimiter: self.delimiter.clone(),
        }
    }
}

//  Main

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let code = match &cli.command {
        Some(Commands::Awesome) => run_awesome(),
        Some(Commands::Parse { file, url, json }) => run_parse(file.as_deref(), url, *json),
        None => run_daemon(&cli),
    };
    std::process::exit(code);
}

fn run_awesome() -> i32 {
    match fontawesome::find_fonts() {
        Ok(fonts) if fonts.is_empty() => {
            warn!("no Font Awesome fonts found");
            1
        }
        Ok(fonts) => {
            for font in fonts {
                println!("{}", font);
            }
            0
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn run_parse(file: Option<&Path>, url: &str, json: bool) -> i32 {
    let css = match file {
        Some(path) if path == Path::new("-") => {
            read_stylesheet(std::io::read_to_string(std::io::stdin()))
        }
        Some(path) => read_stylesheet(std::fs::read_to_string(path)),
        None => fontawesome::download_styles(url).map_err(|e| e.to_string()),
    };
    let css = match css {
        Ok(css) => css,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    let glyphs = fontawesome::parse_styles(&css);
    let rendered = if json {
        fontawesome::to_json(&glyphs)
    } else {
        fontawesome::to_yaml(&glyphs)
    };
    match rendered {
        Ok(table) => {
            println!("{}", table.trim_end());
            0
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn read_stylesheet(read: std::io::Result<String>) -> Result<String, String> {
    read.map_err(|e| format!("failed to read stylesheet: {}", e))
}

/// Normal daemon mode.  Only returns when the event stream is gone.
fn run_daemon(cli: &Cli) -> i32 {
    let source = FileConfigSource::new(cli.config.clone(), cli.overrides());
    let config = match source.load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    // Must happen before any thread is spawned so every thread inherits
    // the mask and only the reload thread ever sees the signal.
    let mut hangup = SigSet::empty();
    hangup.add(Signal::SIGHUP);
    let reload_enabled = match hangup.thread_block() {
        Ok(()) => true,
        Err(e) => {
            warn!("failed to block SIGHUP, reload disabled: {}", e);
            false
        }
    };

    let active = Arc::new(ActiveConfig::new(Generation::from_config(&config)));
    let resolver = Arc::new(IconResolver::new(
        Arc::clone(&active),
        ProcessNameResolver::new(LinuxExecutableLookup::new()),
    ));

    let (wm, mut events) = match (SwayClient::new(), SwayEventSource::new()) {
        (Ok(wm), Ok(events)) => (wm, events),
        (Err(e), _) | (_, Err(e)) => {
            error!("{}", e);
            return 1;
        }
    };
    info!("using sway socket {}", wm.socket().display());

    if reload_enabled {
        let reloader = ConfigReloader::new(source, Arc::clone(&active), Arc::clone(&resolver));
        std::thread::spawn(move || loop {
            match hangup.wait() {
                Ok(signal) => {
                    info!("received {:?}", signal);
                    if let Err(e) = reloader.reload() {
                        error!("{}", e);
                    }
                }
                Err(e) => {
                    error!("waiting for SIGHUP failed: {}", e);
                    break;
                }
            }
        });
    }

    let (tx, rx) = mpsc::channel();
    let listener = std::thread::spawn(move || {
        if let Err(e) = events.run(tx) {
            error!("window event subscription failed: {}", e);
        }
    });

    let daemon = Daemon::new(wm, resolver, active);
    if let Err(e) = daemon.process_workspaces() {
        error!("initial rename failed: {}", e);
    }
    info!("sway-icon-to-go running");
    daemon.run(rx);

    if listener.join().is_err() {
        error!("event listener panicked");
    }
    error!("window event stream ended, exiting");
    1
}
