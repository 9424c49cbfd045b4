use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use log::error;
use serde::Serialize;
use sluice_protocol::{Envelope, codec::read_message_opt};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// File of framed envelopes (stdin when omitted)
    pub path: Option<PathBuf>,

    /// Show payloads as stored instead of decompressing them
    #[arg(long)]
    pub raw: bool,
}

/// One NDJSON output line.
#[derive(Debug, Serialize)]
struct EnvelopeRow<'a> {
    id: String,
    tag: &'a str,
    timestamp: String,
    hop_count: u32,
    encoding: String,
    bytes: usize,
    payload: String,
}

pub fn run(args: InspectArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[inspect] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: InspectArgs) -> Result<ExitCode> {
    let input: Box<dyn Read> = match &args.path {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    inspect(BufReader::new(input), &mut out, args.raw)?;

    Ok(ExitCode::SUCCESS)
}

/// Print every envelope in `reader` as a JSON line. Returns how many were read.
fn inspect<R: Read, W: Write>(mut reader: R, out: &mut W, raw: bool) -> Result<usize> {
    let mut count = 0;

    while let Some(envelope) = read_message_opt::<_, Envelope>(&mut reader)
        .with_context(|| format!("Failed to read envelope #{}", count + 1))?
    {
        writeln!(out, "{}", render(&envelope, raw)?)?;
        count += 1;
    }

    out.flush()?;
    Ok(count)
}

fn render(envelope: &Envelope, raw: bool) -> Result<String> {
    let payload = if raw {
        envelope.payload.clone()
    } else {
        envelope
            .decoded_payload()
            .with_context(|| format!("Failed to decode payload of {}", envelope.id))?
    };

    let row = EnvelopeRow {
        id: envelope.id.to_string(),
        tag: &envelope.tag,
        timestamp: envelope.timestamp.to_rfc3339(),
        hop_count: envelope.hop_count,
        encoding: envelope.encoding.to_string(),
        bytes: envelope.payload.len(),
        payload: String::from_utf8_lossy(&payload).into_owned(),
    };

    Ok(serde_json::to_string(&row)?)
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;
