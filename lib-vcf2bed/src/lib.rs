//! Conversion of VCF records into a four-column positional table, split
//! into substitutions and indels by allele length delta.
//!
//! This is not wired into the pipeline; it is exposed as its own
//! subcommand.
#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;
use slog::Logger;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

mod options;
pub use options::*;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {}
}

pub use errors::*;

/// One converted row: chromosome without any `chr` prefix, the record
/// position, the end position shifted by the allele length delta, and the
/// signed delta itself.
#[derive(Clone, Debug, PartialEq)]
pub struct BedRecord {
    pub chrom: String,
    pub pos: u64,
    pub end: i64,
    pub delta: i64,
}

impl BedRecord {
    /// Whether the record describes an indel rather than a substitution.
    pub fn is_indel(&self) -> bool {
        self.delta != 0
    }
}

impl fmt::Display for BedRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.chrom, self.pos, self.end, self.delta)
    }
}

/// Convert one VCF line; `None` for header and malformed lines.
pub fn convert_record(line: &str) -> Option<BedRecord> {
    if line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }

    let chrom = if fields[0].starts_with("chr") {
        &fields[0][3..]
    } else {
        fields[0]
    };
    let pos = match fields[1].parse::<u64>() {
        Ok(pos) => pos,
        Err(_) => return None,
    };
    let delta = fields[4].len() as i64 - fields[3].len() as i64;

    Some(BedRecord {
        chrom: chrom.to_string(),
        pos: pos,
        end: pos as i64 + delta,
        delta: delta,
    })
}

/// Main entry point for the VCF to BED conversion.
pub fn run(logger: &mut Logger, options: &VcfToBedOptions) -> Result<()> {
    info!(logger, "Converting {} to BED", options.input);

    let input = File::open(&options.input)
        .chain_err(|| format!("Could not open input VCF {}", options.input))?;
    let mut snps = BufWriter::new(File::create(&options.output_snps)
        .chain_err(|| format!("Could not create {}", options.output_snps))?);
    let mut indels = BufWriter::new(File::create(&options.output_indels)
        .chain_err(|| format!("Could not create {}", options.output_indels))?);

    let mut num_snps = 0;
    let mut num_indels = 0;
    for line in BufReader::new(input).lines() {
        let line = line.chain_err(|| "Problem reading input VCF")?;
        if let Some(record) = convert_record(&line) {
            if record.is_indel() {
                writeln!(indels, "{}", record).chain_err(|| "Problem writing indel row")?;
                num_indels += 1;
            } else {
                writeln!(snps, "{}", record).chain_err(|| "Problem writing SNP row")?;
                num_snps += 1;
            }
        }
    }

    info!(logger, "Wrote {} SNP and {} indel rows", num_snps, num_indels);

    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate tempdir;

    use std::fs;

    use slog::{Discard, Logger};

    use super::{convert_record, run, VcfToBedOptions};

    #[test]
    fn insertion_shifts_end_and_routes_to_indels() {
        let record = convert_record("chr1\t100\t.\tA\tAT").unwrap();
        assert_eq!(format!("{}", record), "1\t100\t101\t1");
        assert!(record.is_indel());
    }

    #[test]
    fn substitution_keeps_end_and_routes_to_snps() {
        let record = convert_record("chr1\t100\t.\tA\tG").unwrap();
        assert_eq!(format!("{}", record), "1\t100\t100\t0");
        assert!(!record.is_indel());
    }

    #[test]
    fn deletion_has_negative_delta() {
        let record = convert_record("chr2\t500\t.\tGAA\tG").unwrap();
        assert_eq!(format!("{}", record), "2\t500\t498\t-2");
    }

    #[test]
    fn header_and_malformed_lines_are_skipped() {
        assert!(convert_record("##fileformat=VCFv4.2").is_none());
        assert!(convert_record("#CHROM\tPOS\tID\tREF\tALT").is_none());
        assert!(convert_record("chr1\t100\t.").is_none());
        assert!(convert_record("chr1\tnot-a-pos\t.\tA\tG").is_none());
    }

    #[test]
    fn chrom_without_prefix_is_kept_as_is() {
        let record = convert_record("17\t42\t.\tC\tT").unwrap();
        assert_eq!(record.chrom, "17");
    }

    #[test]
    fn run_splits_records_into_two_files() {
        let tmp = tempdir::TempDir::new("vcf2bed_test").unwrap();
        let path = |name: &str| tmp.path().join(name).to_str().unwrap().to_string();

        fs::write(
            path("in.vcf"),
            "#CHROM\tPOS\tID\tREF\tALT\nchr1\t100\t.\tA\tAT\nchr1\t100\t.\tA\tG\n",
        ).unwrap();

        let options = VcfToBedOptions {
            input: path("in.vcf"),
            output_snps: path("out_snp.bed"),
            output_indels: path("out_indel.bed"),
        };
        let mut logger = Logger::root(Discard, o!());
        run(&mut logger, &options).unwrap();

        assert_eq!(fs::read_to_string(path("out_snp.bed")).unwrap(), "1\t100\t100\t0\n");
        assert_eq!(fs::read_to_string(path("out_indel.bed")).unwrap(), "1\t100\t101\t1\n");
    }
}
