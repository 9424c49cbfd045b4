pub mod inspect;
pub mod run;

use clap::Subcommand;
pub use inspect::InspectArgs;
pub use run::RunArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read records from stdin, one per line, and write framed envelopes.
    ///
    /// Example:
    ///   tail -F app.log | sluice run --encoder payload --tag app -o app.frames
    ///   sluice run --config batcher.json --framing compressed < events.txt
    Run(RunArgs),

    /// Print framed envelopes as NDJSON.
    ///
    /// Example:
    ///   sluice inspect app.frames
    Inspect(InspectArgs),
}
