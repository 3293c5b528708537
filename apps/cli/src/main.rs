// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ifc-translate - move and rotate IFC models from the command line.
//!
//! # Commands
//!
//! - `process <INPUT> --output <DIR>` - transform one file
//! - `process <DIR> --batch --output <DIR>` - transform every `.ifc` in a directory
//! - `preset list | show | save | delete | use` - manage named parameter sets
//!
//! Without explicit parameters, `process` starts from the last used preset.
//! Ctrl-C during a batch stops it after the file in progress.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ifc_translate::{
    Config, FormValues, IfcPatchEngine, InteractiveSurface, Orchestrator, PresetStore,
    TransformParams,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

mod surface;

use surface::TerminalSurface;

#[derive(Parser)]
#[command(name = "ifc-translate")]
#[command(about = "Translate and rotate IFC building models", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a file, or every IFC file in a directory with --batch
    #[command(alias = "p")]
    Process(ProcessArgs),

    /// Manage saved presets
    Preset {
        #[command(subcommand)]
        command: PresetCommand,
    },
}

#[derive(Args)]
struct ProcessArgs {
    /// Input IFC file (or directory with --batch)
    input: PathBuf,

    /// Directory the transformed files are written to
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Treat INPUT as a directory and transform every IFC file in it
    #[arg(long)]
    batch: bool,

    /// Start from a saved preset; explicit values override it
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args)]
struct ParamArgs {
    /// East offset in metres
    #[arg(long, allow_hyphen_values = true)]
    x: Option<String>,

    /// North offset in metres
    #[arg(long, allow_hyphen_values = true)]
    y: Option<String>,

    /// Vertical offset in metres
    #[arg(long, allow_hyphen_values = true)]
    z: Option<String>,

    /// Rotation about +Z in degrees, counter-clockwise seen from above
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<String>,

    /// Translate before rotating (default: rotate first)
    #[arg(long)]
    translate_first: bool,
}

impl ParamArgs {
    fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.z.is_none()
            && self.rotation.is_none()
            && !self.translate_first
    }

    /// Overlay explicitly given values onto a form
    fn apply(&self, values: &mut FormValues) {
        for (field, value) in [
            (&mut values.x, &self.x),
            (&mut values.y, &self.y),
            (&mut values.z, &self.z),
            (&mut values.rotation, &self.rotation),
        ] {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        if self.translate_first {
            values.rotate_first = false;
        }
    }
}

#[derive(Subcommand)]
enum PresetCommand {
    /// List preset names (* marks the last used)
    List,

    /// Print a preset's values
    Show { name: String },

    /// Save values under a name, replacing any preset of that name
    Save {
        name: String,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Delete a preset
    Delete {
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Mark a preset as last used
    Use { name: String },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,ifc_translate=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::from_env();
    let store = PresetStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open preset store in {}", config.data_dir.display()))?;

    tracing::debug!(
        data_dir = %config.data_dir.display(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        extension = %config.extension,
        "Loaded configuration"
    );

    let assume_yes = matches!(
        cli.command,
        Commands::Preset {
            command: PresetCommand::Delete { yes: true, .. }
        }
    );
    let surface = TerminalSurface::new(FormValues::default(), assume_yes);
    let mut orchestrator = Orchestrator::new(surface, IfcPatchEngine, store, config);

    match cli.command {
        Commands::Process(args) => process(&mut orchestrator, args)?,
        Commands::Preset { command } => preset(&mut orchestrator, command),
    }

    Ok(if orchestrator.surface().failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

type App = Orchestrator<TerminalSurface, IfcPatchEngine>;

fn process(orchestrator: &mut App, args: ProcessArgs) -> anyhow::Result<()> {
    match &args.preset {
        Some(name) => {
            if !orchestrator.select_preset(name) {
                return Ok(());
            }
        }
        None if args.params.is_empty() => {
            if let Some(name) = orchestrator.restore_last_used() {
                tracing::info!(preset = %name, "Using last used preset");
            }
        }
        None => {}
    }

    let values = orchestrator.surface_mut().values_mut();
    values.input = args.input.display().to_string();
    values.output_dir = args.output.display().to_string();
    values.batch = args.batch;
    args.params.apply(values);

    // Ctrl-C asks the running batch to stop; the main loop forwards it
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    if !orchestrator.process() {
        return Ok(());
    }

    let poll_interval = orchestrator.config().poll_interval;
    loop {
        orchestrator.poll();
        if !orchestrator.is_processing() {
            break;
        }
        if interrupted.swap(false, Ordering::SeqCst) {
            orchestrator.cancel();
        }
        thread::sleep(poll_interval);
    }

    Ok(())
}

fn preset(orchestrator: &mut App, command: PresetCommand) {
    match command {
        PresetCommand::List => {
            let store = orchestrator.presets();
            let last_used = store.get_last_used();
            let names = store.list();
            if names.is_empty() {
                println!("No presets saved in {}", store.dir().display());
            }
            for name in names {
                let marker = if last_used.as_deref() == Some(name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}", marker, name);
            }
        }
        PresetCommand::Show { name } => match orchestrator.presets().get(&name) {
            Some(preset) => {
                let params = TransformParams::from(preset);
                println!("{}", name);
                println!("  x:        {} m", params.x);
                println!("  y:        {} m", params.y);
                println!("  z:        {} m", params.z);
                println!("  rotation: {} deg", params.rotation_degrees());
                println!(
                    "  order:    {}",
                    if params.rotate_first {
                        "rotate, then translate"
                    } else {
                        "translate, then rotate"
                    }
                );
            }
            None => orchestrator
                .surface_mut()
                .show_error(&format!("Preset not found: {}", name)),
        },
        PresetCommand::Save { name, params } => {
            params.apply(orchestrator.surface_mut().values_mut());
            orchestrator.save_preset(&name);
        }
        PresetCommand::Delete { name, .. } => {
            orchestrator.delete_preset(&name);
        }
        PresetCommand::Use { name } => {
            orchestrator.select_preset(&name);
        }
    }
}
