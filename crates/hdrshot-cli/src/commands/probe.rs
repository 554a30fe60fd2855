//! Probe command: header-only HDR/SDR verdicts.

use crate::ProbeArgs;
use anyhow::{Context, Result};
use hdrshot_io::probe::probe_len;
use hdrshot_io::{probe, Format, Verdict};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn run(args: ProbeArgs) -> Result<()> {
    for path in &args.input {
        match probe_file(path) {
            Ok((format, Verdict::Hdr)) => println!("{}: HDR ({format})", path.display()),
            Ok((_, Verdict::Sdr(reason))) => println!("{}: SDR ({reason})", path.display()),
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }
    Ok(())
}

/// Bytes read to sniff a file with no known extension.
const MAGIC_BYTES: u64 = 16;

/// Reads only as many leading bytes as the format's probe needs.
fn probe_file(path: &Path) -> Result<(Format, Verdict)> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut head = Vec::new();
    let mut format = Format::from_extension(path);
    if format == Format::Unknown {
        (&mut file).take(MAGIC_BYTES).read_to_end(&mut head)?;
        format = Format::from_bytes(&head);
    }
    let want = probe_len(format);
    if head.len() < want {
        (&mut file)
            .take((want - head.len()) as u64)
            .read_to_end(&mut head)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok((format, probe(format, &head)))
}
