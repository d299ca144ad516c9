/// Implementation of the "varpipe run" command.
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::ArgMatches;

use slog::Logger;

use tempdir::TempDir;

use lib_align::{self, AlignOptions};
use lib_call::{self, CallOptions};
use lib_realign::{self, RealignOptions};

use super::errors::*;

/// Options for the "varpipe run" command.
#[derive(Clone, Debug)]
pub struct RunPipelineOptions {
    // Inputs
    /// Path to first-in-pair reads file.
    pub reads1: String,
    /// Path to second-in-pair reads file.
    pub reads2: String,
    /// Path to reference genome FASTA file.
    pub reference: String,
    /// Path to known-indels file; required when realignment is requested.
    pub mills_file: Option<String>,

    /// Base name of the variant output (without extension).
    pub output: String,

    // Flags
    /// Realign around known indels and call from the realigned BAM.
    pub realign: bool,
    /// Keep only the gzipped variant output.
    pub gzip_only: bool,
    /// Build a BAM index over the realigned artifact.
    pub index: bool,

    /// Directory for intermediate artifacts; a temporary directory if unset.
    pub work_dir: Option<String>,
    /// Overwrite existing output files without prompting.
    pub force: bool,
}

impl RunPipelineOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        Self {
            reads1: matches.value_of("reads1").unwrap().to_string(),
            reads2: matches.value_of("reads2").unwrap().to_string(),
            reference: matches.value_of("reference").unwrap().to_string(),
            mills_file: matches.value_of("mills_file").map(|s| s.to_string()),

            output: matches.value_of("output").unwrap().to_string(),

            realign: matches.is_present("realign"),
            gzip_only: matches.is_present("gzip_only"),
            index: matches.is_present("index"),

            work_dir: matches.value_of("work_dir").map(|s| s.to_string()),
            force: matches.is_present("force"),
        }
    }
}

/// Reject flag combinations that could never run a meaningful pipeline.
fn validate(options: &RunPipelineOptions) -> Result<()> {
    if options.index && !options.realign {
        bail!("Indexing the realigned BAM (-i) requires realignment (-e); without -e there is no realigned file to index");
    }
    if options.realign && options.mills_file.is_none() {
        bail!("Realignment (-e) requires a known-indels file (-f)");
    }
    Ok(())
}

/// Check that all input files are present before any tool runs.
///
/// A missing second-in-pair file is fatal as well: alignment needs both
/// mates, so continuing would only fail later with a worse diagnostic.
fn check_inputs(options: &RunPipelineOptions) -> Result<()> {
    let mut required = vec![
        (&options.reads1, "first-in-pair reads file"),
        (&options.reads2, "second-in-pair reads file"),
        (&options.reference, "reference FASTA file"),
    ];
    if let Some(ref mills_file) = options.mills_file {
        required.push((mills_file, "known-indels file"));
    }

    for (path, what) in required {
        if !Path::new(path).exists() {
            bail!("Missing {}: {}", what, path);
        }
    }

    Ok(())
}

/// Whether the operator answered with the literal token that aborts.
fn confirm_abort<R: BufRead>(input: &mut R) -> Result<bool> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .chain_err(|| "Problem reading confirmation")?;
    Ok(line.trim() == "yes")
}

/// Prompt about existing output files; returns `true` if the run should
/// stop without touching anything.
///
/// Only the literal answer `yes` aborts; any other answer (including an
/// empty one) proceeds and overwrites.
fn preflight_overwrite<R: BufRead>(
    logger: &mut Logger,
    options: &RunPipelineOptions,
    input: &mut R,
) -> Result<bool> {
    let candidates = [
        format!("{}.vcf.gz", options.output),
        format!("{}.vcf", options.output),
    ];
    let existing = match candidates.iter().find(|path| Path::new(path.as_str()).exists()) {
        Some(path) => path,
        None => return Ok(false),
    };

    if options.force {
        warn!(logger, "Overwriting existing output {}", existing);
        return Ok(false);
    }

    eprint!(
        "Output file {} already exists. Type 'yes' to abort; anything else overwrites: ",
        existing
    );
    io::stderr()
        .flush()
        .chain_err(|| "Problem flushing prompt")?;

    if confirm_abort(input)? {
        info!(logger, "Aborted at operator's request; nothing was modified");
        Ok(true)
    } else {
        warn!(logger, "Overwriting existing output {}", existing);
        Ok(false)
    }
}

/// Fixed intermediate artifact name inside the per-run workspace.
fn artifact(work_dir: &Path, name: &str) -> String {
    work_dir.join(name).to_str().unwrap().to_string()
}

pub fn run(logger: &mut Logger, options: &RunPipelineOptions) -> Result<()> {
    info!(logger, "Running: varpipe run");
    info!(logger, "Options: {:?}", options);

    validate(options)?;
    check_inputs(options)?;

    let stdin = io::stdin();
    if preflight_overwrite(logger, options, &mut stdin.lock())? {
        return Ok(());
    }

    // Per-run workspace for intermediate artifacts; keeps concurrent runs
    // from clobbering each other. The temporary directory is removed on
    // drop, `--work-dir` keeps artifacts around for inspection.
    let (work_dir, _tmp_dir): (PathBuf, Option<TempDir>) = match options.work_dir {
        Some(ref dir) => {
            fs::create_dir_all(dir)
                .chain_err(|| format!("Could not create working directory {}", dir))?;
            (PathBuf::from(dir), None)
        }
        None => {
            let tmp_dir =
                TempDir::new("varpipe").chain_err(|| "Could not create temporary directory.")?;
            (tmp_dir.path().to_path_buf(), Some(tmp_dir))
        }
    };
    info!(logger, "Workspace: {}", work_dir.display());

    let sorted_bam = artifact(&work_dir, "lane_sorted.bam");
    let realigned_bam = artifact(&work_dir, "lane_realigned.bam");

    info!(logger, "Aligning reads");
    lib_align::run(
        &mut logger.new(o!("stage" => "align")),
        &AlignOptions {
            reference: options.reference.clone(),
            reads1: options.reads1.clone(),
            reads2: options.reads2.clone(),
            sam_out: artifact(&work_dir, "lane.sam"),
            fixmate_out: artifact(&work_dir, "lane_fixmate.bam"),
            sorted_out: sorted_bam.clone(),
        },
    ).chain_err(|| "Problem aligning reads")?;
    info!(logger, " => done");

    if options.realign {
        let known_sites = match options.mills_file {
            Some(ref path) => path.clone(),
            None => bail!("Realignment requires a known-indels file"),
        };

        info!(logger, "Realigning around known indels");
        lib_realign::run(
            &mut logger.new(o!("stage" => "realign")),
            &RealignOptions {
                reference: options.reference.clone(),
                input: sorted_bam.clone(),
                known_sites: known_sites,
                intervals_out: artifact(&work_dir, "lane.intervals"),
                realigned_out: realigned_bam.clone(),
                log_file: artifact(&work_dir, "realign.log"),
                index: options.index,
            },
        ).chain_err(|| "Problem realigning around indels")?;
        info!(logger, " => done");
    }

    // Exactly one of the sorted and realigned artifacts feeds the caller,
    // selected by the realignment flag alone; a stale realigned BAM from
    // an earlier run is never picked up implicitly.
    let call_input = if options.realign {
        realigned_bam.clone()
    } else {
        sorted_bam.clone()
    };

    info!(logger, "Calling variants");
    lib_call::run(
        &mut logger.new(o!("stage" => "call")),
        &CallOptions {
            reference: options.reference.clone(),
            input: call_input,
            pileup_out: artifact(&work_dir, "lane_pileup.bcf"),
            output: options.output.clone(),
            gzip_only: options.gzip_only,
        },
    ).chain_err(|| "Problem calling variants")?;
    info!(logger, " => done");

    info!(logger, "All done. Have a nice day!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io::Cursor;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use slog::{Discard, Logger};

    use tempdir::TempDir;

    use super::{check_inputs, confirm_abort, preflight_overwrite, run, validate,
                RunPipelineOptions};

    fn logger() -> Logger {
        Logger::root(Discard, o!())
    }

    fn options(dir: &Path) -> RunPipelineOptions {
        let path = |name: &str| dir.join(name).to_str().unwrap().to_string();
        RunPipelineOptions {
            reads1: path("reads_1.fastq"),
            reads2: path("reads_2.fastq"),
            reference: path("genome.fa"),
            mills_file: None,
            output: path("result"),
            realign: false,
            gzip_only: false,
            index: false,
            work_dir: Some(path("work")),
            force: false,
        }
    }

    fn touch(path: &str) {
        fs::write(path, "").unwrap();
    }

    fn touch_inputs(options: &RunPipelineOptions) {
        touch(&options.reads1);
        touch(&options.reads2);
        touch(&options.reference);
        if let Some(ref mills_file) = options.mills_file {
            touch(mills_file);
        }
    }

    /// Install a stub executable that records its invocation and exits
    /// with the given status.
    fn write_stub(bin_dir: &Path, name: &str, exit_code: i32) {
        let path = bin_dir.join(name);
        fs::write(
            &path,
            format!(
                "#!/bin/sh\necho \"{} $@\" >> \"$VARPIPE_TEST_CALLS\"\nexit {}\n",
                name, exit_code
            ),
        ).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }

    fn recorded_calls(calls_file: &Path) -> String {
        fs::read_to_string(calls_file).unwrap_or_default()
    }

    #[test]
    fn validate_rejects_index_without_realign() {
        let tmp = TempDir::new("varpipe_test").unwrap();
        let mut options = options(tmp.path());
        options.index = true;
        let msg = format!("{}", validate(&options).unwrap_err());
        assert!(msg.contains("-e"));
    }

    #[test]
    fn validate_rejects_realign_without_mills_file() {
        let tmp = TempDir::new("varpipe_test").unwrap();
        let mut options = options(tmp.path());
        options.realign = true;
        let msg = format!("{}", validate(&options).unwrap_err());
        assert!(msg.contains("known-indels"));
    }

    #[test]
    fn check_inputs_requires_each_file() {
        let tmp = TempDir::new("varpipe_test").unwrap();
        let options = options(tmp.path());

        let msg = format!("{}", check_inputs(&options).unwrap_err());
        assert!(msg.contains("first-in-pair"));

        touch(&options.reads1);
        let msg = format!("{}", check_inputs(&options).unwrap_err());
        assert!(msg.contains("second-in-pair"));

        touch(&options.reads2);
        let msg = format!("{}", check_inputs(&options).unwrap_err());
        assert!(msg.contains("reference"));

        touch(&options.reference);
        assert!(check_inputs(&options).is_ok());
    }

    #[test]
    fn only_the_literal_yes_aborts() {
        assert!(confirm_abort(&mut Cursor::new("yes\n")).unwrap());
        assert!(!confirm_abort(&mut Cursor::new("y\n")).unwrap());
        assert!(!confirm_abort(&mut Cursor::new("no\n")).unwrap());
        assert!(!confirm_abort(&mut Cursor::new("YES\n")).unwrap());
        assert!(!confirm_abort(&mut Cursor::new("")).unwrap());
    }

    #[test]
    fn preflight_overwrite_aborts_on_yes_and_skips_prompt_without_collision() {
        let tmp = TempDir::new("varpipe_test").unwrap();
        let options = options(tmp.path());

        // No existing output, nothing to ask.
        let aborted =
            preflight_overwrite(&mut logger(), &options, &mut Cursor::new("yes\n")).unwrap();
        assert!(!aborted);

        touch(&format!("{}.vcf.gz", options.output));
        let aborted =
            preflight_overwrite(&mut logger(), &options, &mut Cursor::new("yes\n")).unwrap();
        assert!(aborted);
        let aborted =
            preflight_overwrite(&mut logger(), &options, &mut Cursor::new("no\n")).unwrap();
        assert!(!aborted);

        // --force never consults the operator.
        let mut forced = options.clone();
        forced.force = true;
        let aborted =
            preflight_overwrite(&mut logger(), &forced, &mut Cursor::new("yes\n")).unwrap();
        assert!(!aborted);
    }

    // The state machine scenarios share the process environment (PATH and
    // the call-recording file), so they live in one sequential test.
    #[test]
    fn pipeline_state_machine() {
        let tmp = TempDir::new("varpipe_test").unwrap();
        let bin_dir = tmp.path().join("bin");
        fs::create_dir(&bin_dir).unwrap();
        let calls_file = tmp.path().join("calls.txt");

        let orig_path = env::var("PATH").unwrap();
        env::set_var("PATH", bin_dir.to_str().unwrap());
        env::set_var("VARPIPE_TEST_CALLS", calls_file.to_str().unwrap());

        // Missing inputs halt before any tool runs.
        {
            let options = options(tmp.path());
            assert!(run(&mut logger(), &options).is_err());
            assert_eq!(recorded_calls(&calls_file), "");
        }

        // A failing aligner halts the pipeline before the caller runs.
        {
            write_stub(&bin_dir, "bwa", 1);
            write_stub(&bin_dir, "samtools", 0);
            write_stub(&bin_dir, "bcftools", 0);
            write_stub(&bin_dir, "gunzip", 0);

            let options = options(tmp.path());
            touch_inputs(&options);

            let msg = format!("{}", run(&mut logger(), &options).unwrap_err());
            assert!(msg.contains("align"));
            let calls = recorded_calls(&calls_file);
            assert!(calls.contains("bwa index"));
            assert!(!calls.contains("bcftools"));
        }

        // Default flags: align and call, no realignment, with gunzip.
        {
            write_stub(&bin_dir, "bwa", 0);
            fs::remove_file(&calls_file).unwrap();

            let options = options(tmp.path());
            run(&mut logger(), &options).unwrap();

            let calls = recorded_calls(&calls_file);
            assert!(calls.contains("bwa mem"));
            assert!(calls.contains("samtools fixmate"));
            assert!(calls.contains("samtools sort"));
            assert!(calls.contains("bcftools mpileup"));
            assert!(calls.contains("bcftools call"));
            assert!(calls.contains("gunzip"));
            assert!(!calls.contains("gatk3"));
        }

        // The caller reads the sorted BAM when realignment is off, even
        // if a stale realigned BAM is lying around.
        {
            fs::remove_file(&calls_file).unwrap();

            let options = options(tmp.path());
            touch(&tmp.path().join("work/lane_realigned.bam").to_str().unwrap().to_string());
            run(&mut logger(), &options).unwrap();

            let mpileup = recorded_calls(&calls_file)
                .lines()
                .find(|line| line.contains("mpileup"))
                .unwrap()
                .to_string();
            assert!(mpileup.contains("lane_sorted.bam"));
            assert!(!mpileup.contains("lane_realigned.bam"));
        }

        // Realignment with indexing and gzip-only output.
        {
            write_stub(&bin_dir, "gatk3", 0);
            fs::remove_file(&calls_file).unwrap();

            let mut options = options(tmp.path());
            options.realign = true;
            options.index = true;
            options.gzip_only = true;
            options.mills_file =
                Some(tmp.path().join("mills.vcf").to_str().unwrap().to_string());
            touch_inputs(&options);
            run(&mut logger(), &options).unwrap();

            let calls = recorded_calls(&calls_file);
            assert!(calls.contains("samtools faidx"));
            assert!(calls.contains("samtools dict"));
            assert!(calls.contains("gatk3 -T RealignerTargetCreator"));
            assert!(calls.contains("gatk3 -T IndelRealigner"));
            assert!(calls.contains("samtools index"));
            let mpileup = calls.lines().find(|line| line.contains("mpileup")).unwrap();
            assert!(mpileup.contains("lane_realigned.bam"));
            assert!(!calls.contains("gunzip"));
        }

        env::set_var("PATH", orig_path);
    }
}
