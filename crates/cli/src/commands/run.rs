use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::Args;
use crossbeam::channel::{self, Sender};
use log::{error, warn};
use sluice_engine::{
    Batcher, BatcherConfig, BatcherReport, EncoderRegistry, Framing, Record, WriterSink,
};

/// Records buffered between the stdin reader and the ingestor.
const INPUT_QUEUE_DEPTH: usize = 1024;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Encoder applied to each line (payload, json, bincode)
    #[arg(long, short = 'e')]
    pub encoder: Option<String>,

    /// Tag stamped on every envelope
    #[arg(long, short = 't')]
    pub tag: Option<String>,

    /// Flush once a batch holds this many bytes
    #[arg(long)]
    pub flush_bytes: Option<usize>,

    /// Flush pending data at least this often
    #[arg(long, value_name = "MS")]
    pub flush_interval_ms: Option<u64>,

    /// Appended after each record; understands \n \r \t \0 and \\
    #[arg(long, value_name = "STR")]
    pub delimiter: Option<String>,

    /// delimited, compressed or delimited+compressed
    #[arg(long)]
    pub framing: Option<Framing>,

    /// Stop flushing once a batch carries more hops than this
    #[arg(long)]
    pub max_hops: Option<u32>,

    /// Initial capacity of each batch buffer
    #[arg(long, value_name = "BYTES")]
    pub batch_capacity: Option<usize>,

    /// Hop count given to every record read from stdin
    #[arg(long, default_value = "0")]
    pub hop_count: u32,

    /// JSON file with batcher settings; flags take precedence
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Write envelopes here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[run] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: RunArgs) -> Result<ExitCode> {
    let config = build_config(&args)?;
    let batcher = Batcher::new(config, &EncoderRegistry::with_builtin_encoders())?;

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };

    let (record_tx, record_rx) = channel::bounded::<Record>(INPUT_QUEUE_DEPTH);
    let hop_count = args.hop_count;
    let reader = thread::Builder::new()
        .name("sluice-reader".to_string())
        .spawn(move || read_records(io::stdin().lock(), hop_count, record_tx))
        .context("Failed to spawn stdin reader")?;

    let report = batcher.run(record_rx, WriterSink::new(writer))?;

    if report.halted() {
        // The reader may still be blocked on stdin; leave it behind.
        print_summary(&report);
        return Ok(ExitCode::from(1));
    }

    match reader.join() {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("stdin read failed: {e}"),
        Err(_) => bail!("stdin reader thread panicked"),
    }

    print_summary(&report);
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &BatcherReport) {
    let ingest = &report.ingest;
    let flush = &report.flush;

    eprintln!(
        "{} records ({} encode errors), {} envelopes, {} bytes in, {} bytes out",
        ingest.records, ingest.encode_errors, flush.envelopes, flush.input_bytes, flush.payload_bytes
    );
    if report.halted() {
        eprintln!(
            "flushing stopped: hop limit exceeded, {} bytes dropped",
            ingest.dropped_bytes
        );
    }
}

/// Defaults, overlaid by the JSON file, overlaid by flags.
fn build_config(args: &RunArgs) -> Result<BatcherConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            BatcherConfig::from_json_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => BatcherConfig::default(),
    };

    if let Some(encoder) = &args.encoder {
        config.encoder = encoder.clone();
    }
    if let Some(tag) = &args.tag {
        config.tag = tag.clone();
    }
    if let Some(bytes) = args.flush_bytes {
        config.flush_bytes = bytes;
    }
    if let Some(ms) = args.flush_interval_ms {
        config.flush_interval_ms = ms;
    }
    if let Some(delimiter) = &args.delimiter {
        config.delimiter = parse_delimiter(delimiter)?;
    }
    if let Some(framing) = args.framing {
        config.framing = framing;
    }
    if let Some(max_hops) = args.max_hops {
        config.max_hops = max_hops;
    }
    if let Some(capacity) = args.batch_capacity {
        config.batch_capacity = capacity;
    }

    Ok(config)
}

/// Expand backslash escapes in a delimiter given on the command line.
fn parse_delimiter(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => bail!("unsupported escape `\\{other}` in delimiter"),
            None => bail!("delimiter ends with a lone backslash"),
        }
    }

    Ok(out)
}

/// Send one record per line until EOF or the batcher stops listening.
/// Returns the number of records sent.
fn read_records<R: BufRead>(reader: R, hop_count: u32, tx: Sender<Record>) -> io::Result<u64> {
    let mut sent = 0;

    for line in reader.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if tx.send(Record::new(line).with_hop_count(hop_count)).is_err() {
            break;
        }
        sent += 1;
    }

    Ok(sent)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
