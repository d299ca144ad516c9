/// Helper code for derived artifact paths.
use std::path::Path;

/// Path of the sequence dictionary belonging to a reference FASTA,
/// derived by replacing the reference's file extension with `dict`.
pub fn dict_path(reference: &str) -> String {
    Path::new(reference)
        .with_extension("dict")
        .to_string_lossy()
        .into_owned()
}
