/// Implementation of the "varpipe vcf-to-bed" command.
use clap::ArgMatches;

use slog::Logger;

use lib_vcf2bed::{self, VcfToBedOptions};

use super::errors::*;

/// Build options from ArgMatches.
pub fn options(matches: &ArgMatches) -> VcfToBedOptions {
    VcfToBedOptions {
        input: matches.value_of("input").unwrap().to_string(),
        output_snps: matches.value_of("output_snps").unwrap().to_string(),
        output_indels: matches.value_of("output_indels").unwrap().to_string(),
    }
}

/// Main entry point for the "varpipe vcf-to-bed" command.
pub fn run(logger: &mut Logger, options: &VcfToBedOptions) -> Result<()> {
    info!(logger, "Running: varpipe vcf-to-bed");
    info!(logger, "Options: {:?}", options);

    lib_vcf2bed::run(logger, options).chain_err(|| "Problem converting VCF to BED")?;

    info!(logger, "All done. Have a nice day!");

    Ok(())
}
