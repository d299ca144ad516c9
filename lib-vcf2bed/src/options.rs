/// Types for configuring the VCF to BED conversion.

/// Options for the VCF to BED conversion.
#[derive(Clone, Debug)]
pub struct VcfToBedOptions {
    /// Path to uncompressed input VCF file.
    pub input: String,
    /// Path for rows with zero length delta (substitutions).
    pub output_snps: String,
    /// Path for rows with non-zero length delta (indels).
    pub output_indels: String,
}
