//! Convert command.
//!
//! Inputs are read up front, converted on the rayon pool and written as
//! `<stem>.png`, `<stem>.sdr.png` and `<stem>.thumb.png` (or `.avif`).
//! A failed file is reported and the rest of the batch continues.

use crate::ConvertArgs;
use anyhow::{bail, Context, Result};
use hdrshot_convert::{Conversion, ConvertOptions, Converter, OutputContainer, OutputNames};
use hdrshot_core::{GamutCoverage, LuminanceStats};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

/// Per-file line of the JSON report.
#[derive(Debug, Serialize)]
struct FileReport {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hdr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sdr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peak_pq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gamut: Option<GamutCoverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    luminance: Option<LuminanceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileReport {
    fn failed(input: String, error: String) -> Self {
        Self {
            input,
            hdr: None,
            sdr: None,
            thumbnail: None,
            peak_pq: None,
            gamut: None,
            luminance: None,
            error: Some(error),
        }
    }
}

/// Builds options from the config file, then applies flags.
pub fn load_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ConvertOptions::default(),
    };
    if args.no_sdr {
        options = options.with_sdr(false);
    }
    if args.no_thumbnail {
        options = options.with_thumbnail(false);
    }
    if let Some(edge) = args.thumbnail_size {
        options = options.with_thumbnail_edge(edge);
    }
    if args.avif {
        options = options.with_output(OutputContainer::Avif);
    }
    Ok(options)
}

pub fn run(args: ConvertArgs, verbose: bool) -> Result<()> {
    trace!(inputs = args.input.len(), "convert::run");
    let options = load_options(&args)?;
    debug!(?options, "options");

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut reports = Vec::with_capacity(args.input.len());
    let mut inputs = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let name = super::display_name(path);
        match super::read_input(path) {
            Ok(bytes) => inputs.push((name, bytes)),
            Err(e) => reports.push(FileReport::failed(name, format!("{e:#}"))),
        }
    }

    let converter = Converter::new(options.clone());
    for (result, (name, _)) in converter.convert_batch(&inputs).into_iter().zip(&inputs) {
        let report = match result {
            Ok(conversion) => match write_outputs(&args.output, name, &conversion, options.output) {
                Ok(report) => report,
                Err(e) => FileReport::failed(name.clone(), format!("{e:#}")),
            },
            Err(failure) => FileReport::failed(failure.name, failure.error.to_string()),
        };
        reports.push(report);
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    info!(files = reports.len(), failed, "convert finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            print_text(r, verbose);
        }
        println!("Converted: {} ok, {} failed", reports.len() - failed, failed);
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", reports.len());
    }
    Ok(())
}

fn write_outputs(
    dir: &Path,
    name: &str,
    conversion: &Conversion,
    container: OutputContainer,
) -> Result<FileReport> {
    let names = OutputNames::new(name, container);
    let write = |file: &str, bytes: &[u8]| -> Result<String> {
        let path = dir.join(file);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path.display().to_string())
    };

    let hdr = write(&names.hdr, &conversion.hdr.bytes)?;
    let sdr = conversion
        .sdr
        .as_ref()
        .map(|img| write(&names.sdr, &img.bytes))
        .transpose()?;
    let thumbnail = conversion
        .thumbnail
        .as_ref()
        .map(|img| write(&names.thumbnail, &img.bytes))
        .transpose()?;

    Ok(FileReport {
        input: name.to_string(),
        hdr: Some(hdr),
        sdr,
        thumbnail,
        peak_pq: conversion.peak_pq,
        gamut: conversion.gamut,
        luminance: conversion.luminance,
        error: None,
    })
}

fn print_text(r: &FileReport, verbose: bool) {
    if let Some(e) = &r.error {
        eprintln!("Error: {}: {e}", r.input);
        return;
    }
    println!("{} -> {}", r.input, r.hdr.as_deref().unwrap_or("-"));
    if !verbose {
        return;
    }
    if let Some(l) = &r.luminance {
        println!(
            "  MaxCLL {:.1} nits, max {:.1}, avg {:.2}, min {:.4}",
            l.max_cll, l.max_luminance, l.avg_luminance, l.min_luminance
        );
    }
    if let Some(g) = &r.gamut {
        println!(
            "  Gamut: rec709 {:.2}%, p3 {:.2}%, bt2020 {:.2}%, ap1 {:.2}%, ap0 {:.2}%, beyond {:.2}%",
            g.rec709, g.p3, g.bt2020, g.ap1, g.ap0, g.beyond
        );
    }
    if let Some(p) = r.peak_pq {
        println!("  Tone-map peak: PQ {p:.4}");
    }
}
