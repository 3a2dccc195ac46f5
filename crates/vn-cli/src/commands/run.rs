//! Run a script headlessly, feeding it scripted input frame by frame.

use crate::cli::{CliConfig, ScriptedInput};
use crate::commands::common::load_script;
use crate::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use vn_machine::{Headless, Machine, MachineState};

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Script container or assembler source
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum number of frames to simulate
    #[arg(long)]
    pub frames: Option<u64>,

    /// Milliseconds per frame
    #[arg(long)]
    pub frame_ms: Option<u64>,

    /// Let pauses finish on their own
    #[arg(long)]
    pub automode: bool,

    /// Parse every instruction before running
    #[arg(long)]
    pub precompile: bool,
}

/// How a headless run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub frames: u64,
    pub halted: bool,
    pub transcript: String,
    pub graphics: Vec<String>,
}

pub fn run_command(args: RunArgs, config: &CliConfig) -> Result<()> {
    let report = run_script(&args, config)?;
    println!("{}", report.transcript);
    for line in &report.graphics {
        println!("{}", line);
    }
    if report.halted {
        println!("halted after {} frames", report.frames);
    } else {
        println!("still waiting after {} frames", report.frames);
    }
    Ok(())
}

pub fn run_script(args: &RunArgs, config: &CliConfig) -> Result<RunReport> {
    let script = load_script(&args.input)?;
    let mut options = config.machine.clone();
    options.automode |= args.automode;
    options.precompile |= args.precompile;
    let frame_ms = args.frame_ms.unwrap_or(config.run.frame_ms);
    let max_frames = args.frames.unwrap_or(config.run.max_frames);

    info!("running {} ({} instructions)", script.name, script.len());
    let headless = Headless::new(config.run.columns, config.run.rows);
    let mut machine = Machine::with_builtins(script, headless.collaborators(), options)?;

    let mut inputs: Vec<&ScriptedInput> = config.run.input.iter().collect();
    inputs.sort_by_key(|input| input.frame);
    let mut pending = inputs.into_iter().peekable();

    let mut frames = 0;
    let mut halted = false;
    while frames < max_frames {
        while let Some(input) = pending.next_if(|input| input.frame <= frames) {
            for event in input.action.events() {
                let consumed = machine.handle_event(event);
                debug!(frame = frames, ?event, consumed, "scripted input");
            }
        }
        let elapsed = if frames == 0 { 0 } else { frame_ms };
        let state = machine.tick(elapsed)?;
        frames += 1;
        if state == MachineState::Halted {
            halted = true;
            break;
        }
    }
    if !halted {
        warn!(
            "{} still waiting on {:?} after {} frames",
            machine.script().name,
            machine.stack().top_name(),
            frames
        );
    }

    Ok(RunReport {
        frames,
        halted,
        transcript: headless.text.transcript(),
        graphics: headless.graphics.log(),
    })
}
