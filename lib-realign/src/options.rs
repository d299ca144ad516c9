/// Types for configuring the realignment stage.

/// Options for the indel realignment stage.
#[derive(Clone, Debug)]
pub struct RealignOptions {
    // Inputs
    /// Path to reference FASTA file.
    pub reference: String,
    /// Path to coordinate-sorted, indexed BAM.
    pub input: String,
    /// Path to known-indels file guiding target selection.
    pub known_sites: String,

    // Artifacts
    /// Path for the realignment target intervals.
    pub intervals_out: String,
    /// Path for the realigned BAM.
    pub realigned_out: String,
    /// Log file collecting realigner diagnostics (append).
    pub log_file: String,

    /// Whether to build a BAM index over the realigned artifact.
    pub index: bool,
}
