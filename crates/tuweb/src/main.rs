// ABOUTME: tuweb-edit entry point, a headless front end for the editor session
// ABOUTME: Wires configuration, logging, a directory-backed gateway and stdin commands together

mod command;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tuweb_editor::{
    EditorAction, EditorConfig, EditorPreferences, EditorSessionController, FsGateway, KeyboardHub,
};
use tuweb_events::ChannelEventBus;
use tuweb_logging::{info, warn};
use tuweb_types::FileRef;

use command::{Command, HELP};
use terminal::{TerminalSurface, header};

#[derive(Parser, Debug)]
#[command(name = "tuweb-edit")]
#[command(about = "Edit files of a remote source through a tabbed editor session")]
struct Cli {
    /// Configuration file (defaults to <config dir>/tuweb/editor.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory served as the remote source
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Reference files are opened from, overriding the configured default
    #[arg(long = "ref")]
    source_ref: Option<String>,

    /// Files to open on startup, relative to the root
    files: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration warnings are emitted before the configured subscriber exists
    let mut config = tuweb_logging::with_bootstrap_subscriber(|| match &cli.config {
        Some(path) => EditorConfig::load_from_path(path),
        None => EditorConfig::load(),
    })?;
    if let Some(source_ref) = &cli.source_ref {
        config.remote.default_ref = source_ref.clone();
    }

    let mut logging = config.logging.clone();
    logging
        .apply_env_overrides()
        .context("Invalid logging environment")?;
    tuweb_logging::init_logging_with_reload(logging).context("Failed to initialize logging")?;

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Cannot open root directory {}", cli.root.display()))?;
    info!(root = %root.display(), default_ref = %config.remote.default_ref, "Starting tuweb-edit");

    let (bus, receiver) = ChannelEventBus::new();
    let printer = tokio::spawn(terminal::print_events(receiver));

    let controller =
        EditorSessionController::new(Arc::new(FsGateway::new(root)), Arc::new(bus), &config);

    let preferences_path = EditorPreferences::default_path();
    if let Some(path) = &preferences_path {
        let preferences = EditorPreferences::load_from(path);
        controller.set_font_size(preferences.font_size);
    }

    let keyboard = KeyboardHub::new();
    controller.attach_shortcuts(&keyboard);
    controller.mount(Arc::new(TerminalSurface));

    // Failures are already reported as notifications
    let opened = futures::future::join_all(cli.files.iter().map(|path| {
        let file = FileRef::from_path(path.as_str());
        let controller = controller.clone();
        async move { controller.load_file(&file, None).await }
    }))
    .await;
    let failed = opened.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        warn!(failed, "Some files could not be opened");
    }

    run(&controller, &keyboard).await?;

    let unsaved = controller.dirty_tab_ids().len();
    if unsaved > 0 {
        warn!(unsaved, "Exiting with unsaved changes");
        eprintln!("warning: {unsaved} document(s) have unsaved changes");
    }

    if let Some(path) = &preferences_path {
        let preferences = EditorPreferences {
            font_size: controller.view_state().font_size,
        };
        if let Err(err) = preferences.save_to(path) {
            warn!(error = %format!("{err:#}"), "Could not store preferences");
        }
    }

    controller.teardown();
    drop(controller);
    // The printer ends once the last bus handle is dropped
    let _ = printer.await;
    Ok(())
}

/// Read and execute commands until `quit` or end of input
async fn run(controller: &EditorSessionController, keyboard: &KeyboardHub) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("error: {err:#}");
                continue;
            }
        };

        match command {
            Command::Open { path, source_ref } => {
                let file = FileRef::from_path(path);
                let _ = controller.load_file(&file, source_ref.as_deref()).await;
            }
            Command::Edit(content) => {
                if controller.on_content_change(content).is_none() {
                    eprintln!("error: no open document");
                }
            }
            Command::Append(text) => match controller.active_tab() {
                Some(tab) => {
                    let mut content = tab.content;
                    content.push_str(&text);
                    let _ = controller.update_content(tab.id, content);
                }
                None => eprintln!("error: no open document"),
            },
            Command::Key(stroke) => {
                if !keyboard.dispatch(&stroke) {
                    eprintln!("'{stroke}' is not bound");
                }
            }
            Command::Save => {
                let _ = controller.save_active().await;
            }
            Command::SaveAll => {
                let results = controller.save_all().await;
                let saved = results.iter().filter(|(_, result)| result.is_ok()).count();
                println!("saved {saved} of {} document(s)", results.len());
            }
            Command::Close => {
                if let Some(id) = controller.active_tab_id() {
                    controller.close_tab(id);
                }
            }
            Command::Tabs => {
                for tab in controller.tabs() {
                    println!("{}", header(&tab));
                }
            }
            Command::Keys => {
                for action in EditorAction::ALL {
                    let strokes: Vec<String> = controller
                        .keymap()
                        .strokes_for(action)
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    println!("{:<20} {}", action.as_str(), strokes.join(", "));
                }
            }
            Command::Reload => {
                if let Some(id) = controller.active_tab_id() {
                    let _ = controller.reload_tab(id).await;
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}
