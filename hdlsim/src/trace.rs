//! Value change dump (VCD) waveform tracing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use thiserror::Error;

use crate::*;

/// Tracing error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to write waveform: {0}")]
    Io(#[from] io::Error),
    #[error("signal `{name}` was declared with width {expected} but probed with width {found}")]
    WidthMismatch { name: String, expected: usize, found: usize },
}

#[derive(Debug)]
struct Var {
    id: String,
    width: usize,
    last: Option<Vec<bool>>,
}

/// Records signal values per cycle and dumps them as a VCD file.
#[derive(Debug)]
pub struct Tracer {
    timescale: String,
    time: u64,
    vars: LinkedHashMap<String, Var>,
    changes: Vec<(u64, Vec<(String, Vec<bool>)>)>,
    error: Option<TraceError>,
}

impl Default for Tracer {
    fn default() -> Self { Self::new("1ns") }
}

/// Short printable identifier of the `n`-th variable.
fn var_id(mut n: usize) -> String {
    const FIRST: u8 = b'!';
    const RADIX: usize = (b'~' - b'!' + 1) as usize;

    let mut id = String::new();
    loop {
        id.push((FIRST + (n % RADIX) as u8) as char);
        n /= RADIX;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    id
}

impl Tracer {
    /// Creates a new tracer. `timescale` is the duration of one time unit, e.g. `"1ns"`.
    pub fn new(timescale: &str) -> Self {
        Self {
            timescale: timescale.to_string(),
            time: 0,
            vars: LinkedHashMap::new(),
            changes: Vec::new(),
            error: None,
        }
    }

    /// Current time.
    pub fn time(&self) -> u64 { self.time }

    /// Moves to time `time`. Subsequent probes are recorded at that time.
    pub fn advance(&mut self, time: u64) { self.time = self.time.max(time); }

    /// Records the value of `value` under `name`. Struct members become separate variables named
    /// `<name>_<member>`.
    ///
    /// The first probe of a name declares it; a width mismatch on a later probe is reported by `write_vcd`.
    pub fn probe<S: Signal>(&mut self, name: &str, value: &S) {
        let mut bits = value.transl().into_iter();
        let decls = S::port_decls();

        for (member, width) in decls.iter_with_prefix(Some(name.to_string())) {
            let member = member.unwrap_or_else(|| name.to_string());
            let member_bits = bits.by_ref().take(width).collect::<Vec<_>>();
            self.record(member, member_bits);
        }
    }

    fn record(&mut self, name: String, bits: Vec<bool>) {
        let num_vars = self.vars.len();
        let width = bits.len();
        let var = self.vars.entry(name.clone()).or_insert_with(|| Var { id: var_id(num_vars), width, last: None });

        if var.width != bits.len() {
            if self.error.is_none() {
                self.error = Some(TraceError::WidthMismatch { name, expected: var.width, found: bits.len() });
            }
            return;
        }

        if var.last.as_ref() == Some(&bits) {
            return;
        }
        var.last = Some(bits.clone());

        let id = var.id.clone();
        match self.changes.last_mut() {
            Some((time, changes)) if *time == self.time => changes.push((id, bits)),
            _ => self.changes.push((self.time, vec![(id, bits)])),
        }
    }

    /// Writes the recorded waveform in VCD format.
    pub fn write_vcd<W: Write>(&mut self, w: &mut W) -> Result<(), TraceError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        writeln!(w, "$timescale {} $end", self.timescale)?;
        writeln!(w, "$scope module top $end")?;
        for (name, var) in self.vars.iter() {
            writeln!(w, "$var wire {} {} {} $end", var.width, var.id, name)?;
        }
        writeln!(w, "$upscope $end")?;
        writeln!(w, "$enddefinitions $end")?;

        for (time, changes) in &self.changes {
            writeln!(w, "#{}", time)?;
            for (id, bits) in changes {
                if bits.len() == 1 {
                    writeln!(w, "{}{}", if bits[0] { '1' } else { '0' }, id)?;
                } else {
                    writeln!(w, "b{} {}", bits.iter().rev().map(|b| if *b { '1' } else { '0' }).join(""), id)?;
                }
            }
        }
        writeln!(w, "#{}", self.time + 1)?;

        Ok(())
    }

    /// Writes the recorded waveform to the file at `path`.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TraceError> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_vcd(&mut w)?;
        w.flush()?;
        Ok(())
    }
}
