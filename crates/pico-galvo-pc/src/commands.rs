//! Line-oriented command protocol executed against the renderer.
//!
//! The writable surface is the inactive frame; `SWAP` publishes it at the
//! next frame boundary. Numbers accept decimal or `0x`-prefixed hex.

use anyhow::{anyhow, bail, Context, Result};

use pico_galvo_core::config::Param;
use pico_galvo_core::render::frame::{FrameSelect, Waypoint};
use pico_galvo_core::render::renderer::Renderer;
use pico_galvo_hal::SampleTimer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Store a waypoint in the inactive frame.
    Write {
        index: usize,
        point: Waypoint,
    },
    /// Clear a frame (inactive when unspecified).
    Clear(FrameSelect),
    /// Request a frame swap at the next boundary.
    Swap,
    /// Set the inactive frame's point count.
    Size(usize),
    /// Print both frame buffers.
    Dump,
    /// Print renderer state and counters.
    Stats,
    /// Read (`value` absent) or write a configuration parameter.
    Config {
        param: Param,
        value: Option<u16>,
    },
    Help,
}

/// Parse one protocol line. `Ok(None)` for blank lines and `#` comments.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_ascii_whitespace();
    let keyword = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let command = if keyword.eq_ignore_ascii_case("write") {
        if args.len() != 4 {
            bail!("WRITE takes: index x y flags");
        }
        Command::Write {
            index: parse_number(args[0])? as usize,
            point: Waypoint::new(
                parse_u8(args[1], "x")?,
                parse_u8(args[2], "y")?,
                parse_u8(args[3], "flags")?,
            ),
        }
    } else if keyword.eq_ignore_ascii_case("clear") {
        Command::Clear(match args.first() {
            None => FrameSelect::Inactive,
            Some(which) if which.eq_ignore_ascii_case("inactive") => FrameSelect::Inactive,
            Some(which) if which.eq_ignore_ascii_case("active") => FrameSelect::Active,
            Some(other) => bail!("CLEAR takes ACTIVE or INACTIVE, got {other:?}"),
        })
    } else if keyword.eq_ignore_ascii_case("swap") {
        Command::Swap
    } else if keyword.eq_ignore_ascii_case("size") {
        let count = args
            .first()
            .ok_or_else(|| anyhow!("SIZE takes a point count"))?;
        Command::Size(parse_number(count)? as usize)
    } else if keyword.eq_ignore_ascii_case("dump") {
        Command::Dump
    } else if keyword.eq_ignore_ascii_case("stats") {
        Command::Stats
    } else if keyword.eq_ignore_ascii_case("config") {
        let name = args
            .first()
            .ok_or_else(|| anyhow!("CONFIG takes a parameter name"))?;
        let param =
            Param::parse(name).ok_or_else(|| anyhow!("unknown config parameter {name:?}"))?;
        let value = match args.get(1) {
            Some(raw) => Some(
                u16::try_from(parse_number(raw)?)
                    .map_err(|_| anyhow!("value {raw:?} does not fit in 16 bits"))?,
            ),
            None => None,
        };
        Command::Config { param, value }
    } else if keyword.eq_ignore_ascii_case("help") {
        Command::Help
    } else {
        bail!("unknown command {keyword:?} (try HELP)");
    };

    Ok(Some(command))
}

/// Execute a parsed command. Errors report the rejection; the session
/// continues either way.
pub fn execute<T: SampleTimer>(
    renderer: &mut Renderer<'_>,
    clock: &mut T,
    command: &Command,
) -> Result<()> {
    match command {
        Command::Write { index, point } => {
            renderer
                .write_point(*index, *point)
                .map_err(|err| anyhow!("WRITE rejected: {err:?}"))?;
        }
        Command::Clear(which) => {
            renderer.clear_frame(*which);
            println!("cleared {which:?} frame");
        }
        Command::Swap => {
            renderer.request_swap();
        }
        Command::Size(count) => {
            renderer
                .set_point_count(*count)
                .map_err(|err| anyhow!("SIZE rejected: {err:?}"))?;
        }
        Command::Dump => {
            dump_frame(renderer, FrameSelect::Active);
            dump_frame(renderer, FrameSelect::Inactive);
        }
        Command::Stats => {
            let stats = renderer.stats();
            println!("state: {:?}", renderer.state());
            println!(
                "point_buf_wait: {}  point_buf_repeat: {}  step_buf_wait: {}",
                stats.point_buf_wait, stats.point_buf_repeat, stats.step_buf_wait
            );
            println!(
                "interp_faults: {}  buffer_faults: {}",
                stats.interp_faults, stats.buffer_faults
            );
        }
        Command::Config { param, value } => match value {
            None => println!("{} = {}", param.name(), renderer.config().get(*param)),
            Some(value) => {
                renderer
                    .config_mut()
                    .set(*param, *value)
                    .map_err(|err| anyhow!("CONFIG rejected: {err:?}"))?;
                if *param == Param::Pps {
                    clock
                        .set_pps(*value)
                        .map_err(|err| anyhow!("sample clock rejected PPS: {err:?}"))?;
                }
            }
        },
        Command::Help => print_help(),
    }
    Ok(())
}

fn dump_frame(renderer: &Renderer<'_>, which: FrameSelect) {
    let frame = renderer.frame(which);
    println!("{which:?} frame: {} points", frame.point_count());
    for index in 0..frame.point_count() {
        if let Some(point) = frame.point(index) {
            println!(
                "  [{index:3}] x={:3} y={:3} flags=0x{:02X} laser={}",
                point.x,
                point.y,
                point.flags,
                if point.laser_on() { "on" } else { "off" }
            );
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  WRITE idx x y flags    store a waypoint in the inactive frame");
    println!("  SIZE n                 set the inactive frame's point count");
    println!("  CLEAR [ACTIVE|INACTIVE]");
    println!("  SWAP                   publish the inactive frame at the next boundary");
    println!("  DUMP                   print both frames");
    println!("  STATS                  print renderer state and counters");
    println!("  CONFIG name [value]    read or write a parameter");
    println!("  HELP");
    println!("parameters: pps step-size acc dec dwell-on dwell-off flip-x flip-y swap-xy");
}

fn parse_number(raw: &str) -> Result<u32> {
    let parsed = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        raw.parse()
    };
    parsed.with_context(|| format!("invalid number {raw:?}"))
}

fn parse_u8(raw: &str, what: &str) -> Result<u8> {
    u8::try_from(parse_number(raw)?).map_err(|_| anyhow!("{what} {raw:?} does not fit in 8 bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_write() {
        let cmd = parse("WRITE 3 10 0x20 0x40").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Write {
                index: 3,
                point: Waypoint::new(10, 0x20, 0x40),
            }
        );
    }

    #[test]
    fn parses_clear_variants() {
        assert_eq!(
            parse("clear").unwrap().unwrap(),
            Command::Clear(FrameSelect::Inactive)
        );
        assert_eq!(
            parse("CLEAR ACTIVE").unwrap().unwrap(),
            Command::Clear(FrameSelect::Active)
        );
        assert!(parse("CLEAR BOTH").is_err());
    }

    #[test]
    fn parses_config_read_and_write() {
        assert_eq!(
            parse("CONFIG pps").unwrap().unwrap(),
            Command::Config {
                param: Param::Pps,
                value: None,
            }
        );
        assert_eq!(
            parse("config step-size 8").unwrap().unwrap(),
            Command::Config {
                param: Param::StepSize,
                value: Some(8),
            }
        );
        assert!(parse("CONFIG bogus 1").is_err());
    }

    #[test]
    fn skips_blanks_and_comments() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("# a comment").unwrap(), None);
    }

    #[test]
    fn rejects_oversized_fields() {
        assert!(parse("WRITE 0 256 0 0").is_err());
        assert!(parse("WRITE 0 1 2").is_err());
        assert!(parse("SIZE").is_err());
    }
}
