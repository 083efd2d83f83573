//! RP2350 firmware for the pico-galvo laser controller.
//!
//! Foreground: renderer state machine filling the step queue, fault polling,
//! periodic stats. Interrupt: TIMER0 alarm 0 fires at the configured PPS and
//! emits one pre-computed sample to the DAC and laser gate.

#![no_std]
#![no_main]

mod timer;
mod transport;

use defmt_rtt as _;
use panic_probe as _;
use rp235x_hal as hal;

use core::cell::RefCell;
use core::sync::atomic::Ordering;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;
use hal::clocks::Clock;
use hal::fugit::MicrosDurationU32;
use hal::fugit::RateExtU32;
use hal::pac::interrupt;
use hal::timer::Alarm;

use pico_galvo_core::config::Config;
use pico_galvo_core::dac::DacDriver;
use pico_galvo_core::fault::FaultFlag;
use pico_galvo_core::output::emit_next_sample;
use pico_galvo_core::render::frame::{Waypoint, BLANKING_BIT};
use pico_galvo_core::render::renderer::Renderer;
use pico_galvo_core::render::step_queue::{StepConsumer, StepQueue};
use pico_galvo_hal::SampleTimer;

use timer::TickClock;
use transport::{LaserOutput, Mcp4922Transport};

/// Boot ROM image definition for Cortex-M33 secure mode.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

/// External crystal frequency (Pico 2 standard).
const XTAL_FREQ_HZ: u32 = 12_000_000;

/// DAC SPI clock.
const DAC_SPI_FREQ_HZ: u32 = 20_000_000;

/// Foreground iterations between stats log lines.
const STATS_LOG_INTERVAL: u32 = 1_000_000;

type Alarm0 = hal::timer::Alarm0<hal::timer::CopyableTimer0>;

/// Everything the alarm handler touches. Stashed once at startup, before the
/// interrupt is unmasked.
struct TickState {
    steps: StepConsumer<'static>,
    dac: DacDriver<Mcp4922Transport>,
    laser: LaserOutput,
    alarm: Alarm0,
}

static TICK_STATE: Mutex<RefCell<Option<TickState>>> = Mutex::new(RefCell::new(None));

/// Fault mailbox out of the tick context.
static FAULTS: FaultFlag = FaultFlag::new();

/// Statically allocated step queue shared between the contexts.
/// Safety: split exactly once at startup into a Producer (foreground) and a
/// Consumer (alarm handler); heapless SPSC synchronises head/tail with
/// atomics.
static mut STEP_QUEUE: StepQueue = StepQueue::new();

/// Startup test pattern: a square outline with a blanked retrace, so the
/// controller draws something before any command source is attached.
const TEST_PATTERN: [Waypoint; 4] = [
    Waypoint::new(20, 20, BLANKING_BIT),
    Waypoint::new(235, 20, 0),
    Waypoint::new(235, 235, 0),
    Waypoint::new(20, 235, 0),
];

#[hal::entry]
fn main() -> ! {
    defmt::info!("pico-galvo-rp2350 starting");

    let mut pac = hal::pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // Initialize clocks from 12 MHz crystal.
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let sio = hal::sio::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // --- SPI0 to the dual DAC ---
    let spi_sclk = pins.gpio2.into_function::<hal::gpio::FunctionSpi>();
    let spi_mosi = pins.gpio3.into_function::<hal::gpio::FunctionSpi>();

    let spi_bus = hal::spi::Spi::<_, _, _, 8>::new(pac.SPI0, (spi_mosi, spi_sclk));
    let spi_bus = spi_bus.init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        DAC_SPI_FREQ_HZ.Hz(),
        embedded_hal::spi::MODE_0,
    );

    // Manual CS (GPIO5), idle high.
    let mut spi_cs = pins.gpio5.into_push_pull_output();
    spi_cs.set_high().unwrap();

    // Laser gate (GPIO9), beam off at boot.
    let mut laser_pin = pins.gpio9.into_push_pull_output();
    laser_pin.set_low().unwrap();

    let config = Config::new();
    let dac = DacDriver::from_config(Mcp4922Transport::new(spi_bus, spi_cs), &config);
    let laser = LaserOutput::new(laser_pin);

    // --- Split the step queue ---
    // Safety: called exactly once, before the alarm interrupt is unmasked.
    // After the split the Producer stays on the foreground and the Consumer
    // moves into the tick state.
    #[allow(static_mut_refs)]
    let (producer, consumer) = unsafe { STEP_QUEUE.split() };

    let mut renderer = Renderer::new(producer, config);

    // Seed the test pattern into the inactive frame and publish it.
    for (index, waypoint) in TEST_PATTERN.iter().enumerate() {
        renderer.write_point(index, *waypoint).unwrap();
    }
    renderer.set_point_count(TEST_PATTERN.len()).unwrap();
    renderer.request_swap();

    // --- Sample clock on TIMER0 alarm 0 ---
    let mut timer0 = hal::Timer::new_timer0(pac.TIMER0, &mut pac.RESETS, &clocks);
    let mut alarm = timer0.alarm_0().unwrap();

    let mut tick_clock = TickClock;
    tick_clock.set_pps(config.pps).unwrap();

    let period = MicrosDurationU32::micros(timer::TICK_PERIOD_US.load(Ordering::Relaxed));
    alarm.schedule(period).unwrap();
    alarm.enable_interrupt();

    critical_section::with(|cs| {
        TICK_STATE.borrow_ref_mut(cs).replace(TickState {
            steps: consumer,
            dac,
            laser,
            alarm,
        });
    });

    tick_clock.enable();
    defmt::info!("sample clock running at {} pps", config.pps);

    // --- Foreground loop ---
    let mut iterations: u32 = 0;
    loop {
        renderer.process();

        if let Some(fault) = FAULTS.take() {
            defmt::warn!("{}", fault.describe());
        }

        if renderer.step_queue_full() {
            // Backpressure: nothing to do until the tick pops a sample.
            cortex_m::asm::nop();
        }

        iterations = iterations.wrapping_add(1);
        if iterations % STATS_LOG_INTERVAL == 0 {
            let stats = renderer.stats();
            defmt::info!(
                "stats: repeat={} step_wait={} underruns seen via faults",
                stats.point_buf_repeat,
                stats.step_buf_wait
            );
        }
    }
}

/// Sample tick: reschedule the alarm, then emit exactly one sample.
#[interrupt]
fn TIMER0_IRQ_0() {
    critical_section::with(|cs| {
        let mut state = TICK_STATE.borrow_ref_mut(cs);
        let Some(state) = state.as_mut() else { return };

        state.alarm.clear_interrupt();
        let period = MicrosDurationU32::micros(timer::TICK_PERIOD_US.load(Ordering::Relaxed));
        let _ = state.alarm.schedule(period);

        emit_next_sample(&mut state.steps, &mut state.dac, &mut state.laser, &FAULTS);
    });
}

/// Program metadata for `picotool info`.
#[link_section = ".bi_entries"]
#[used]
pub static PICOTOOL_ENTRIES: [hal::binary_info::EntryAddr; 4] = [
    hal::binary_info::rp_cargo_bin_name!(),
    hal::binary_info::rp_cargo_version!(),
    hal::binary_info::rp_program_description!(c"pico-galvo laser controller"),
    hal::binary_info::rp_program_build_attribute!(),
];
