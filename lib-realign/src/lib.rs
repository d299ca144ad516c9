//! Indel realignment stage: build the reference's auxiliary indices,
//! compute realignment target intervals from known indels, and produce a
//! realigned BAM.
//!
//! The sequence index and dictionary are generated here, not by the
//! driver, so they are only built when realignment actually runs.
#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;
use slog::Logger;

extern crate lib_shared;
use lib_shared::exec::ToolCommand;
use lib_shared::paths::dict_path;

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

/// Main entry point for the realignment stage.
pub fn run(logger: &mut Logger, options: &RealignOptions) -> Result<()> {
    info!(logger, "Building sequence index for {}", options.reference);
    ToolCommand::new("samtools")
        .args(&["faidx", &options.reference])
        .run(logger, "realign/faidx")?;

    let dict = dict_path(&options.reference);
    info!(logger, "Building sequence dictionary {}", dict);
    ToolCommand::new("samtools")
        .args(&["dict", &options.reference, "-o", &dict])
        .run(logger, "realign/dict")?;

    // The realigner is chatty on stderr; its diagnostics go to the log
    // file instead of the operator's terminal.
    info!(logger, "Computing realignment target intervals");
    ToolCommand::new("gatk3")
        .args(&[
            "-T",
            "RealignerTargetCreator",
            "-R",
            &options.reference,
            "-I",
            &options.input,
            "-known",
            &options.known_sites,
            "-o",
            &options.intervals_out,
        ])
        .stderr_append(&options.log_file)
        .run(logger, "realign/target-intervals")?;

    info!(logger, "Realigning around candidate indels");
    ToolCommand::new("gatk3")
        .args(&[
            "-T",
            "IndelRealigner",
            "-R",
            &options.reference,
            "-I",
            &options.input,
            "-known",
            &options.known_sites,
            "-targetIntervals",
            &options.intervals_out,
            "-o",
            &options.realigned_out,
        ])
        .stderr_append(&options.log_file)
        .run(logger, "realign/indel-realigner")?;

    if options.index {
        info!(logger, "Indexing realigned alignments");
        ToolCommand::new("samtools")
            .args(&["index", &options.realigned_out])
            .run(logger, "realign/bam-index")?;
    }

    Ok(())
}
