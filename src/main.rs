use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use dev_roulette::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, Settings, SetupDraft, MAX_BREAK_SECS, MAX_ROUND_MINUTES},
    cue::{CuePlayer, GuardedCuePlayer, Silent, TerminalBell},
    logging,
    prompts::{builtin_catalog, load_catalog},
    runtime::{CrosstermEventSource, Runner, PULSE_PERIOD},
    session::Session,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

/// speed networking timer: timed rounds, partner switches and ice-breakers
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a speed networking event in the terminal: timed conversation rounds with an ice-breaker prompt each, a partner switch break between rounds, and bell cues for the final seconds and round ends."
)]
pub struct Cli {
    /// number of rounds (1-20)
    #[clap(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=20))]
    rounds: Option<u32>,

    /// minutes per round
    #[clap(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..=MAX_ROUND_MINUTES as i64))]
    minutes: Option<u32>,

    /// break between rounds, in seconds
    #[clap(short = 'b', long = "break-secs", value_parser = clap::value_parser!(u32).range(1..=MAX_BREAK_SECS as i64))]
    break_secs: Option<u32>,

    /// file with one ice-breaker prompt per line, replacing the built-in list
    #[clap(short = 'p', long)]
    prompts: Option<PathBuf>,

    /// disable audio cues
    #[clap(long)]
    mute: bool,

    /// settings file to read defaults from (json)
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command line flags win over the settings file
    fn apply(&self, settings: Settings) -> Settings {
        Settings {
            rounds: self.rounds.unwrap_or(settings.rounds),
            round_minutes: self.minutes.unwrap_or(settings.round_minutes),
            break_secs: self.break_secs.unwrap_or(settings.break_secs),
            prompts_path: self.prompts.clone().or(settings.prompts_path),
            mute: self.mute || settings.mute,
        }
    }

    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }
}

fn build_app(settings: &Settings) -> App {
    let catalog = match &settings.prompts_path {
        Some(path) => match load_catalog(path) {
            Ok(catalog) => catalog,
            Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
        },
        None => builtin_catalog(),
    };

    let cues: Box<dyn CuePlayer> = if settings.mute {
        Box::new(GuardedCuePlayer::new(Silent))
    } else {
        Box::new(GuardedCuePlayer::new(TerminalBell::stdout()))
    };

    App::new(
        SetupDraft::from_settings(settings),
        Session::new(cues, catalog),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        // no log file is not a reason to refuse to run the event
        if let Err(err) = logging::init_file_logging(&path) {
            eprintln!("dev-roulette: logging disabled, cannot open {}: {err}", path.display());
        }
    }

    let settings = cli.apply(cli.config_store().load());
    tracing::info!(?settings, "starting");
    let mut app = build_app(&settings);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), PULSE_PERIOD);

    loop {
        terminal.draw(|f| ui(app, f))?;

        match app.handle_event(runner.step()) {
            Flow::Continue => {}
            Flow::Realign => runner.realign(),
            Flow::Quit => break,
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["dev-roulette"]);

        assert_eq!(cli.rounds, None);
        assert_eq!(cli.minutes, None);
        assert_eq!(cli.break_secs, None);
        assert_eq!(cli.prompts, None);
        assert!(!cli.mute);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_short_and_long_flags() {
        let cli = Cli::parse_from(["dev-roulette", "-r", "8", "-m", "7", "-b", "45"]);
        assert_eq!(cli.rounds, Some(8));
        assert_eq!(cli.minutes, Some(7));
        assert_eq!(cli.break_secs, Some(45));

        let cli = Cli::parse_from([
            "dev-roulette",
            "--rounds",
            "3",
            "--minutes",
            "10",
            "--break-secs",
            "90",
            "--prompts",
            "starters.txt",
            "--mute",
        ]);
        assert_eq!(cli.rounds, Some(3));
        assert_eq!(cli.minutes, Some(10));
        assert_eq!(cli.break_secs, Some(90));
        assert_eq!(cli.prompts, Some(PathBuf::from("starters.txt")));
        assert!(cli.mute);
    }

    #[test]
    fn test_cli_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["dev-roulette", "-r", "0"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-r", "21"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-m", "0"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-b", "0"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-m", "601"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-m", "1073741824"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-b", "3601"]).is_err());
        assert!(Cli::try_parse_from(["dev-roulette", "-m", "600", "-b", "3600"]).is_ok());
    }

    #[test]
    fn test_cli_overrides_settings_file() {
        let file = Settings {
            rounds: 10,
            round_minutes: 3,
            break_secs: 15,
            prompts_path: Some(PathBuf::from("file.txt")),
            mute: true,
        };

        let cli = Cli::parse_from(["dev-roulette", "-r", "4"]);
        let merged = cli.apply(file.clone());
        assert_eq!(merged.rounds, 4);
        assert_eq!(merged.round_minutes, 3);
        assert_eq!(merged.break_secs, 15);
        assert_eq!(merged.prompts_path, Some(PathBuf::from("file.txt")));
        assert!(merged.mute);

        let cli = Cli::parse_from(["dev-roulette", "-p", "cli.txt"]);
        assert_eq!(
            cli.apply(file).prompts_path,
            Some(PathBuf::from("cli.txt"))
        );
    }

    #[test]
    fn test_build_app_uses_settings() {
        let settings = Settings {
            rounds: 3,
            mute: true,
            ..Settings::default()
        };
        let app = build_app(&settings);
        assert_eq!(app.draft.rounds, 3);
        assert_eq!(app.phase(), dev_roulette::Phase::Setup);
    }
}
