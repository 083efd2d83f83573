//! PC debug host for the pico-galvo controller.
//!
//! Runs the rendering core against a simulated sample clock: commands come
//! from a script file and/or stdin, the renderer runs on the main thread,
//! and a clock thread drains the step queue at the configured PPS into a
//! sample log (stdout or CSV). Faults raised from the tick context are
//! polled and reported here.

mod clock;
mod commands;
mod transport;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use pico_galvo_core::config::{self, Config, Param};
use pico_galvo_core::fault::FaultFlag;
use pico_galvo_core::render::renderer::Renderer;
use pico_galvo_core::render::step_queue::StepQueue;
use pico_galvo_hal::SampleTimer;

use clock::SampleClock;

/// Fault mailbox shared with the clock thread.
static FAULTS: FaultFlag = FaultFlag::new();

#[derive(Parser, Debug)]
#[command(name = "pico-galvo-pc", about = "PC debug host for the pico-galvo controller")]
struct Args {
    /// Sample rate in points per second.
    #[arg(long, default_value_t = config::DEFAULT_PPS)]
    pps: u16,

    /// Maximum interpolation step size (integer coordinate units).
    #[arg(long, default_value_t = config::DEFAULT_STEP_SIZE)]
    step_size: u8,

    /// Acceleration ramp factor.
    #[arg(long, default_value_t = config::DEFAULT_ACC_FACTOR)]
    acc: u8,

    /// Deceleration ramp factor.
    #[arg(long, default_value_t = config::DEFAULT_DEC_FACTOR)]
    dec: u8,

    /// Dwell samples on laser turn-on.
    #[arg(long, default_value_t = config::DEFAULT_DWELL)]
    dwell_on: u8,

    /// Dwell samples on laser turn-off.
    #[arg(long, default_value_t = config::DEFAULT_DWELL)]
    dwell_off: u8,

    /// Mirror the X axis at the output stage.
    #[arg(long)]
    flip_x: bool,

    /// Mirror the Y axis at the output stage.
    #[arg(long)]
    flip_y: bool,

    /// Exchange the axes at the output stage.
    #[arg(long)]
    swap_xy: bool,

    /// Write emitted samples to a CSV file instead of stdout.
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Execute commands from a file before reading stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Exit after this many milliseconds (otherwise: on stdin EOF).
    #[arg(long)]
    run_ms: Option<u64>,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::new();
    let writes = [
        (Param::Pps, args.pps),
        (Param::StepSize, args.step_size as u16),
        (Param::AccFactor, args.acc as u16),
        (Param::DecFactor, args.dec as u16),
        (Param::DwellOn, args.dwell_on as u16),
        (Param::DwellOff, args.dwell_off as u16),
        (Param::FlipX, args.flip_x as u16),
        (Param::FlipY, args.flip_y as u16),
        (Param::SwapXy, args.swap_xy as u16),
    ];
    for (param, value) in writes {
        config
            .set(param, value)
            .map_err(|err| anyhow::anyhow!("invalid {}: {err:?}", param.name()))?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;

    log::info!(
        "pico-galvo-pc starting: pps={} step-size={}",
        config.pps,
        config.max_step_size
    );

    // The queue outlives both the renderer and the clock thread.
    let queue: &'static mut StepQueue = Box::leak(Box::new(StepQueue::new()));
    let (producer, consumer) = queue.split();

    let mut renderer = Renderer::new(producer, config);
    let mut sample_clock =
        SampleClock::spawn(consumer, &FAULTS, config, args.samples.clone())?;
    sample_clock
        .set_pps(config.pps)
        .map_err(|err| anyhow::anyhow!("sample clock rejected PPS: {err:?}"))?;
    sample_clock.enable();

    // Script first, then live stdin.
    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        for (line_number, line) in script.lines().enumerate() {
            run_line(&mut renderer, &mut sample_clock, line)
                .with_context(|| format!("script line {}", line_number + 1))?;
        }
    }

    let stdin_lines = spawn_stdin_reader();
    let deadline = args.run_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut stdin_open = true;

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }

        while stdin_open {
            match stdin_lines.try_recv() {
                Ok(line) => {
                    if let Err(err) = run_line(&mut renderer, &mut sample_clock, &line) {
                        eprintln!("error: {err:#}");
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    stdin_open = false;
                    if deadline.is_none() {
                        // Interactive session over: give the queue a moment
                        // to drain, then leave.
                        thread::sleep(Duration::from_millis(50));
                        return Ok(());
                    }
                }
            }
        }

        renderer.process();

        if let Some(fault) = FAULTS.take() {
            log::warn!("{}", fault.describe());
        }

        if renderer.step_queue_full() {
            // Backpressure: nothing to do until the clock pops a sample.
            thread::sleep(Duration::from_micros(200));
        }
    }

    Ok(())
}

fn run_line<T: SampleTimer>(
    renderer: &mut Renderer<'_>,
    clock: &mut T,
    line: &str,
) -> Result<()> {
    if let Some(command) = commands::parse(line)? {
        commands::execute(renderer, clock, &command)?;
    }
    Ok(())
}

/// Read stdin on a separate thread so the render loop never blocks on it.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .expect("spawning stdin reader");
    rx
}
