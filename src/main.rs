use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use chat_window::config::Config;
use chat_window::content::{extract, ContentRouter};
use chat_window::core::ChatUser;
use chat_window::tui::widgets::{lines_to_strings, DisclosureStates, RichContent};
use chat_window::tui::{self, ChatWindow, ChatWindowOptions, FrameStyle, Theme, ThemePreset};

#[derive(Parser)]
#[command(name = "chat-window")]
#[command(author, version, about = "Terminal chat window with collapsible reasoning blocks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat window with a simulated assistant
    Chat {
        /// Header title
        #[arg(long)]
        title: Option<String>,

        /// Input placeholder
        #[arg(long)]
        placeholder: Option<String>,

        /// Current user id
        #[arg(long)]
        user: Option<String>,

        /// Draw without the outer border
        #[arg(long)]
        borderless: bool,

        /// Color scheme
        #[arg(long, value_enum)]
        theme: Option<ThemePreset>,
    },

    /// Print the segments of a message as JSON
    Segments {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Render a message as plain text lines
    Render {
        /// Input file (default: stdin)
        file: Option<PathBuf>,

        /// Wrap width in columns
        #[arg(short, long, default_value = "80")]
        width: usize,

        /// Show disclosure contents regardless of their default
        #[arg(long)]
        expanded: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        // A broken file can still be replaced with `config init --force`
        Err(_)
            if matches!(
                cli.command,
                Commands::Config {
                    action: ConfigAction::Init { force: true }
                }
            ) =>
        {
            Config::default()
        }
        Err(err) => return Err(err.into()),
    };

    init_logging(&cli, &config)?;

    match cli.command {
        Commands::Chat {
            title,
            placeholder,
            user,
            borderless,
            theme,
        } => {
            let mut options = ChatWindowOptions::from(&config);
            if let Some(title) = title {
                options.title = title;
            }
            if let Some(placeholder) = placeholder {
                options.placeholder = placeholder;
            }
            if let Some(user) = user {
                options.current_user_id = user;
            }
            if borderless {
                options.frame = FrameStyle::Borderless;
            }
            if let Some(theme) = theme {
                options.theme = theme;
            }
            let me = ChatUser::new(&options.current_user_id, &options.current_user_name);
            options.initial_messages = tui::app::welcome_messages(&me);
            tracing::info!(
                title = %options.title,
                user = %options.current_user_id,
                theme = options.theme.display_name(),
                "starting chat"
            );
            tui::app::run(ChatWindow::new(options))?;
        }
        Commands::Segments { file } => {
            let input = read_input(file.as_deref())?;
            let segments = extract(&input);
            tracing::debug!(count = segments.len(), "extracted segments");
            let json = serde_json::to_string_pretty(&segments)
                .context("Failed to serialize segments")?;
            println!("{}", json);
        }
        Commands::Render {
            file,
            width,
            expanded,
        } => {
            let input = read_input(file.as_deref())?;
            let router = ContentRouter::new(config.reasoning.default_title.clone());
            let theme = Theme::from_preset(config.theme.preset);
            let message_id = Uuid::nil();

            let mut states = DisclosureStates::new();
            if expanded {
                for (block, _) in RichContent::disclosure_blocks(&input, &router) {
                    states.set((message_id, block), true);
                }
            }

            let rendered =
                RichContent::lines(&input, message_id, &states, &router, &theme, width);
            for line in lines_to_strings(&rendered.lines) {
                println!("{}", line.trim_end());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => println!("{}", config_path.display()),
            ConfigAction::Show => {
                let toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("# Theme: {}", config.theme.preset.display_name());
                print!("{}", toml);
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    anyhow::bail!(
                        "Config file already exists at {} (use --force to overwrite)",
                        config_path.display()
                    );
                }
                Config::default().save_to(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        },
    }

    Ok(())
}

/// Log to stderr, or to a file while the TUI owns the terminal
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let default_filter = match (&config.logging.filter, cli.verbose) {
        (_, true) => "chat_window=debug".to_string(),
        (Some(filter), false) => filter.clone(),
        (None, false) => "chat_window=info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    if matches!(cli.command, Commands::Chat { .. }) {
        let path = config.logging.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
    Ok(())
}

/// Read a file, or stdin when no file is given
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}
