mod effects;
mod render;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use clipper_core::{update, AppState, Msg, PromptChoice, SessionState};
use clipper_engine::{ClientSettings, EngineHandle};
use clipper_logging::{clipper_info, clipper_warn, LogDestination};
use log::LevelFilter;

use crate::effects::{map_event, EffectRunner};
use crate::settings::{load_settings, SETTINGS_FILENAME};

const TICK: Duration = Duration::from_millis(75);
const DEFAULT_DOWNLOAD_DIR: &str = "highlights";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Upload a video for highlight detection and follow the job"
)]
struct Args {
    /// Video to upload (.mp4)
    #[arg(required_unless_present_any = ["list_prompts", "show_prompt"])]
    file: Option<PathBuf>,

    /// Server base URL (overrides the settings file)
    #[arg(long)]
    server: Option<String>,

    /// Named highlight-detection prompt (default: first prompt the server lists)
    #[arg(long)]
    prompt: Option<String>,

    /// Custom prompt text; takes precedence over --prompt when not blank
    #[arg(long)]
    prompt_text: Option<String>,

    /// Save finished highlights into this directory
    #[arg(long)]
    download: Option<PathBuf>,

    /// Settings file
    #[arg(long, default_value = SETTINGS_FILENAME)]
    config: PathBuf,

    /// List the prompts offered by the server and exit
    #[arg(long)]
    list_prompts: bool,

    /// Print the content of a named prompt and exit
    #[arg(long, value_name = "NAME")]
    show_prompt: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    clipper_logging::initialize(LogDestination::default_both(), level);

    let file_settings = load_settings(&args.config);
    let mut settings = ClientSettings::default();
    file_settings.apply(&mut settings);
    if let Some(server) = &args.server {
        settings.base_url = server.clone();
    }
    let download_dir = download_target(args.download.clone(), file_settings.download_dir.clone());
    let auto_download = download_dir.is_some();

    let engine = EngineHandle::new(settings.clone())
        .with_context(|| format!("cannot talk to {}", settings.base_url))?;

    if args.list_prompts {
        for prompt in engine.list_prompts()? {
            println!("{:<24} {}", prompt.name, prompt.display_label());
        }
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(name) = &args.show_prompt {
        let detail = engine.fetch_prompt(name.as_str())?;
        println!("{}", detail.content);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(path) = args.file.clone() else {
        bail!("no video file given");
    };
    let runner = EffectRunner::new(
        engine,
        download_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
    );
    let mut app = App::new(runner);

    let started = app.submit(file_selected(&path)?, auto_download, |engine| {
        choose_prompt(engine, args.prompt.as_deref(), args.prompt_text.as_deref())
    });
    if !started {
        // Rejected locally; the notice has been printed.
        return Ok(ExitCode::FAILURE);
    }

    Ok(app.run())
}

/// `--download` wins over the settings file. Either one turns auto-download on.
fn download_target(cli: Option<PathBuf>, file: Option<PathBuf>) -> Option<PathBuf> {
    cli.or(file)
}

fn file_selected(path: &Path) -> anyhow::Result<Msg> {
    let meta = std::fs::metadata(path).with_context(|| format!("cannot read {path:?}"))?;
    if !meta.is_file() {
        bail!("{path:?} is not a file");
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Msg::FileSelected {
        path: path.to_path_buf(),
        file_name,
        size: meta.len(),
    })
}

/// Custom text wins when not blank. With neither flag the server's first
/// prompt is used.
fn choose_prompt(
    engine: &EngineHandle,
    name: Option<&str>,
    custom_text: Option<&str>,
) -> Option<PromptChoice> {
    let chosen = PromptChoice::resolve(name, custom_text);
    if chosen.is_some() {
        return chosen;
    }
    match engine.list_prompts() {
        Ok(prompts) => {
            let first = prompts.into_iter().next()?;
            clipper_info!("Using default prompt {}", first.name);
            Some(PromptChoice::Named(first.name))
        }
        Err(err) => {
            clipper_warn!("Could not list prompts: {}", err);
            None
        }
    }
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    /// Validates the file, then resolves the prompt and submits. The prompt
    /// lookup may hit the network, so it only runs for a valid file. Returns
    /// whether an upload was started.
    fn submit<P>(&mut self, file: Msg, auto_download: bool, prompt: P) -> bool
    where
        P: FnOnce(&EngineHandle) -> Option<PromptChoice>,
    {
        self.dispatch(file);
        if self.state.view().file_name.is_none() {
            self.dispatch(Msg::Tick);
            return false;
        }
        let prompt = prompt(self.runner.engine());
        self.dispatch(Msg::PromptChosen(prompt));
        self.dispatch(Msg::AutoDownloadToggled(auto_download));
        self.dispatch(Msg::SubmitClicked);
        self.dispatch(Msg::Tick);
        self.state.session() != SessionState::Idle
    }

    /// Drives the session until nothing is left to wait for. Rendering
    /// happens on ticks, at most once per tick.
    fn run(mut self) -> ExitCode {
        let mut next_tick = Instant::now() + TICK;
        while !self.state.is_settled() {
            let wait = next_tick.saturating_duration_since(Instant::now());
            if let Some(event) = self.runner.engine().recv_timeout(wait) {
                self.dispatch(map_event(event));
            }
            if Instant::now() >= next_tick {
                self.dispatch(Msg::Tick);
                next_tick = Instant::now() + TICK;
            }
        }
        self.dispatch(Msg::Tick);

        let view = self.state.view();
        let failed_downloads = view.downloads.iter().filter(|row| row.result.is_err()).count();
        if view.session == SessionState::Failed || failed_downloads > 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let tick = matches!(msg, Msg::Tick);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if tick && state.consume_dirty() {
            let timestamp = Local::now().format("%H:%M:%S").to_string();
            for line in render::render(&state.view(), &timestamp) {
                println!("{line}");
            }
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}
