/// Types for configuring the variant calling stage.

/// Options for the variant calling stage.
#[derive(Clone, Debug)]
pub struct CallOptions {
    // Inputs
    /// Path to reference FASTA file.
    pub reference: String,
    /// Path to the alignment file to call from (sorted or realigned BAM).
    pub input: String,

    // Artifacts
    /// Path for the intermediate pileup.
    pub pileup_out: String,
    /// Base name of the variant output; the stage writes `<output>.vcf.gz`
    /// and, unless `gzip_only`, an uncompressed `<output>.vcf` copy.
    pub output: String,

    /// Keep only the compressed output file.
    pub gzip_only: bool,
}

impl CallOptions {
    /// Path of the compressed variant output file.
    pub fn vcf_gz(&self) -> String {
        format!("{}.vcf.gz", self.output)
    }
}
