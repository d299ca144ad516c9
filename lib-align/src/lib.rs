//! Alignment stage: index the reference, align the read pair, repair mate
//! information, coordinate-sort, and index the result.
#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;
use slog::Logger;

extern crate lib_shared;
use lib_shared::exec::ToolCommand;

mod options;
pub use options::*;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {
        links {
            Exec(::lib_shared::exec::Error, ::lib_shared::exec::ErrorKind);
        }
    }
}

pub use errors::*;

/// Read group attached to the aligned lane. The driver processes one lane
/// per run, so the identifier is fixed rather than configurable.
const READ_GROUP: &'static str = "@RG\\tID:lane1\\tSM:sample1\\tLB:lane1\\tPL:ILLUMINA";

/// Main entry point for the alignment stage.
pub fn run(logger: &mut Logger, options: &AlignOptions) -> Result<()> {
    info!(logger, "Building alignment index for {}", options.reference);
    ToolCommand::new("bwa")
        .args(&["index", &options.reference])
        .run(logger, "align/bwa-index")?;

    info!(
        logger,
        "Aligning {} / {} against {}", options.reads1, options.reads2, options.reference
    );
    ToolCommand::new("bwa")
        .args(&[
            "mem",
            "-R",
            READ_GROUP,
            &options.reference,
            &options.reads1,
            &options.reads2,
        ])
        .stdout_to(&options.sam_out)
        .run(logger, "align/bwa-mem")?;

    info!(logger, "Repairing mate information");
    ToolCommand::new("samtools")
        .args(&["fixmate", "-O", "bam", &options.sam_out, &options.fixmate_out])
        .run(logger, "align/fixmate")?;

    info!(logger, "Coordinate-sorting alignments");
    ToolCommand::new("samtools")
        .args(&[
            "sort",
            "-O",
            "bam",
            "-o",
            &options.sorted_out,
            &options.fixmate_out,
        ])
        .run(logger, "align/sort")?;

    info!(logger, "Indexing sorted alignments");
    ToolCommand::new("samtools")
        .args(&["index", &options.sorted_out])
        .run(logger, "align/bam-index")?;

    Ok(())
}
