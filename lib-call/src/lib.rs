//! Variant calling stage: per-position pileup likelihoods against the
//! reference, variant calling into `<output>.vcf.gz`, and optionally an
//! uncompressed copy next to it.
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

/// Main entry point for the variant calling stage.
pub fn run(logger: &mut Logger, options: &CallOptions) -> Result<()> {
    info!(logger, "Computing pileup for {}", options.input);
    ToolCommand::new("bcftools")
        .args(&[
            "mpileup",
            "-f",
            &options.reference,
            "-O",
            "b",
            "-o",
            &options.pileup_out,
            &options.input,
        ])
        .run(logger, "call/pileup")?;

    let vcf_gz = options.vcf_gz();
    info!(logger, "Calling variants into {}", vcf_gz);
    ToolCommand::new("bcftools")
        .args(&["call", "-m", "-v", "-O", "z", "-o", &vcf_gz, &options.pileup_out])
        .run(logger, "call/call")?;

    if !options.gzip_only {
        // -k keeps the compressed original, -f replaces a stale copy from
        // an earlier run the operator already agreed to overwrite.
        info!(logger, "Decompressing {}", vcf_gz);
        ToolCommand::new("gunzip")
            .args(&["-k", "-f", &vcf_gz])
            .run(logger, "call/gunzip")?;
    }

    Ok(())
}
