// `error_chain!` can recurse deeply.
#![recursion_limit = "1024"]

// We are using `error-chain`.
#[macro_use]
extern crate error_chain;

// We are using the `clap` crate for command line argument parsing.
#[macro_use]
extern crate clap;

// We are using the `slog` crate for logging.
#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;

extern crate tempdir;

extern crate lib_align;
extern crate lib_call;
extern crate lib_realign;
extern crate lib_vcf2bed;

use std::result;
use std::sync::atomic::Ordering;
use std::sync::{atomic, Arc};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use slog::Drain;

mod run_pipeline;
mod vcf_to_bed;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {}
}

pub use errors::*;

/// Custom `slog` Drain logic
struct RuntimeLevelFilter<D> {
    drain: D,
    log_level: Arc<atomic::AtomicIsize>,
}

impl<D> Drain for RuntimeLevelFilter<D>
where
    D: Drain,
{
    type Ok = Option<D::Ok>;
    type Err = Option<D::Err>;

    fn log(
        &self,
        record: &slog::Record,
        values: &slog::OwnedKVList,
    ) -> result::Result<Self::Ok, Self::Err> {
        let current_level = match self.log_level.load(Ordering::Relaxed) {
            0 => slog::Level::Warning,
            1 => slog::Level::Info,
            _ => slog::Level::Trace,
        };

        if record.level().is_at_least(current_level) {
            self.drain.log(record, values).map(Some).map_err(Some)
        } else {
            Ok(None)
        }
    }
}

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("varpipe")
        .version(crate_version!())
        .about("Driver for an alignment, realignment, and variant calling pipeline")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Increase verbosity (echoes every tool invocation)"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .global(true)
                .help("Only print warnings and errors"),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Run the variant calling pipeline")
                .arg(
                    Arg::with_name("reads1")
                        .short("a")
                        .long("reads1")
                        .value_name("FASTQ")
                        .takes_value(true)
                        .required(true)
                        .help("First-in-pair reads file"),
                )
                .arg(
                    Arg::with_name("reads2")
                        .short("b")
                        .long("reads2")
                        .value_name("FASTQ")
                        .takes_value(true)
                        .required(true)
                        .help("Second-in-pair reads file"),
                )
                .arg(
                    Arg::with_name("reference")
                        .short("r")
                        .long("reference")
                        .value_name("FASTA")
                        .takes_value(true)
                        .required(true)
                        .help("Reference genome FASTA file"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("NAME")
                        .takes_value(true)
                        .required(true)
                        .help("Base name of the variant output (without extension)"),
                )
                .arg(
                    Arg::with_name("mills_file")
                        .short("f")
                        .long("mills-file")
                        .value_name("VCF")
                        .takes_value(true)
                        .help("Known-indels file; required with -e"),
                )
                .arg(
                    Arg::with_name("realign")
                        .short("e")
                        .long("realign")
                        .help("Realign around known indels before calling"),
                )
                .arg(
                    Arg::with_name("gzip_only")
                        .short("z")
                        .long("gzip-only")
                        .help("Keep only the gzipped variant output"),
                )
                .arg(
                    Arg::with_name("index")
                        .short("i")
                        .long("index")
                        .help("Index the realigned BAM; requires -e"),
                )
                .arg(
                    Arg::with_name("work_dir")
                        .long("work-dir")
                        .value_name("DIR")
                        .takes_value(true)
                        .help(
                            "Directory for intermediate artifacts \
                             (default: a temporary directory, removed afterwards)",
                        ),
                )
                .arg(
                    Arg::with_name("force")
                        .long("force")
                        .help("Overwrite existing output files without prompting"),
                ),
        )
        .subcommand(
            SubCommand::with_name("vcf-to-bed")
                .about("Convert VCF records into positional tables split by SNPs and indels")
                .arg(
                    Arg::with_name("input")
                        .long("input")
                        .value_name("VCF")
                        .takes_value(true)
                        .required(true)
                        .help("Uncompressed input VCF file"),
                )
                .arg(
                    Arg::with_name("output_snps")
                        .long("output-snps")
                        .value_name("BED")
                        .takes_value(true)
                        .required(true)
                        .help("Output file for substitution rows"),
                )
                .arg(
                    Arg::with_name("output_indels")
                        .long("output-indels")
                        .value_name("BED")
                        .takes_value(true)
                        .required(true)
                        .help("Output file for indel rows"),
                ),
        )
}

fn run(matches: ArgMatches) -> Result<()> {
    // Logging setup ------------------------------------------------------------------------------

    // Atomic variable controlling logging level
    let log_level = Arc::new(atomic::AtomicIsize::new(1));

    // Perform slog setup
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build();
    let drain = RuntimeLevelFilter {
        drain: drain,
        log_level: log_level.clone(),
    }.fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let mut logger = slog::Logger::root(drain, o!());

    // Switch log level
    if matches.is_present("quiet") {
        log_level.store(0, Ordering::Relaxed);
    } else {
        log_level.store(
            1 + matches.occurrences_of("verbose") as isize,
            Ordering::Relaxed,
        );
    }

    // Dispatch commands from command line.
    match matches.subcommand() {
        ("run", Some(m)) => {
            run_pipeline::run(&mut logger, &run_pipeline::RunPipelineOptions::new(&m))
                .chain_err(|| "Could not execute 'run'")?
        }
        ("vcf-to-bed", Some(m)) => vcf_to_bed::run(&mut logger, &vcf_to_bed::options(&m))
            .chain_err(|| "Could not execute 'vcf-to-bed'")?,
        _ => bail!("Invalid command: {}", matches.subcommand().0),
    }

    Ok(())
}

fn main() {
    let matches = build_app().get_matches();

    if let Err(ref e) = run(matches) {
        eprintln!("error: {}", e);

        for e in e.iter().skip(1) {
            eprintln!("caused by: {}", e);
        }

        // The backtrace is not always generated. Try to run this example
        // with `RUST_BACKTRACE=1`.
        if let Some(backtrace) = e.backtrace() {
            eprintln!("backtrace: {:?}", backtrace);
        }

        ::std::process::exit(1);
    }
}
