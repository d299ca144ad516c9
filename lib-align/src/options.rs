/// Types for configuring the alignment stage.

/// Options for the alignment stage.
#[derive(Clone, Debug)]
pub struct AlignOptions {
    // Inputs
    /// Path to reference FASTA file.
    pub reference: String,
    /// Path to first-in-pair reads file.
    pub reads1: String,
    /// Path to second-in-pair reads file.
    pub reads2: String,

    // Artifacts
    /// Path for the raw alignment stream.
    pub sam_out: String,
    /// Path for the mate-repaired BAM.
    pub fixmate_out: String,
    /// Path for the coordinate-sorted BAM (gets a `.bai` alongside).
    pub sorted_out: String,
}
