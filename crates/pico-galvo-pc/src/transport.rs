//! Simulated DAC and laser gate for the PC host.
//!
//! Instead of an SPI bus there is a sample log: the DAC transport collects
//! the two frames of each sample and the laser gate completes the record,
//! which is then written as one line (`index,x,y,laser`) to stdout or a CSV
//! file. This mirrors the serial DAC tap of the hardware controller and
//! gives tests and plots an exact view of what the galvos would do.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use pico_galvo_hal::{DacTransport, LaserGate};

/// Where emitted samples are recorded.
enum SampleOutput {
    Stdout,
    Csv(BufWriter<File>),
}

/// Assembles (frame A, frame B, laser) triples into log lines.
pub struct SampleLog {
    out: SampleOutput,
    pending: Option<u16>,
    frame_pair: Option<(u16, u16)>,
    index: u64,
}

impl SampleLog {
    fn write_record(&mut self, x: u16, y: u16, laser: bool) -> io::Result<()> {
        let index = self.index;
        self.index += 1;
        match &mut self.out {
            SampleOutput::Stdout => {
                println!("{index},{x},{y},{}", laser as u8);
                Ok(())
            }
            SampleOutput::Csv(writer) => {
                // Flush per record: the clock thread never unwinds, so
                // buffered tail samples would be lost at process exit.
                writeln!(writer, "{index},{x},{y},{}", laser as u8)?;
                writer.flush()
            }
        }
    }
}

/// Build the shared log plus the transport/gate pair that feeds it.
///
/// `csv_path` of `None` logs to stdout.
pub fn sample_sink(csv_path: Option<&std::path::Path>) -> io::Result<(CsvDac, CsvLaser)> {
    let out = match csv_path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writeln!(writer, "index,x,y,laser")?;
            SampleOutput::Csv(writer)
        }
        None => SampleOutput::Stdout,
    };
    let log = Rc::new(RefCell::new(SampleLog {
        out,
        pending: None,
        frame_pair: None,
        index: 0,
    }));
    Ok((CsvDac { log: log.clone() }, CsvLaser { log }))
}

/// DAC transport half: pairs up the per-channel frames.
pub struct CsvDac {
    log: Rc<RefCell<SampleLog>>,
}

impl DacTransport for CsvDac {
    type Error = io::Error;

    fn write_frame(&mut self, frame: u16) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        match log.pending.take() {
            None => log.pending = Some(frame),
            Some(first) => log.frame_pair = Some((first, frame)),
        }
        Ok(())
    }
}

/// Laser gate half: completes and writes the sample record.
pub struct CsvLaser {
    log: Rc<RefCell<SampleLog>>,
}

impl LaserGate for CsvLaser {
    fn set(&mut self, on: bool) {
        let mut log = self.log.borrow_mut();
        if let Some((a, b)) = log.frame_pair.take() {
            // Strip the channel command bytes; keep the 12-bit values.
            let x = a & 0x0FFF;
            let y = b & 0x0FFF;
            if let Err(err) = log.write_record(x, y, on) {
                log::error!("sample log write failed: {err}");
            }
        }
    }
}
