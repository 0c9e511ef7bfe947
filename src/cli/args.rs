// args.rs - command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// styleprobe - infer a formatter configuration that reproduces a set of source files
pub struct Args {
    /// source files to reformat during the search
    #[argh(positional)]
    pub inputs: Vec<String>,

    /// reference file to diff against, one per `--reference`, matched to `inputs` by position
    /// (defaults to each input diffing against itself)
    #[argh(option)]
    pub reference: Vec<String>,

    /// path to the formatter executable (default: resolved from PATH by input extension)
    #[argh(option)]
    pub formatter: Option<String>,

    /// force a specific adapter by name instead of inferring it from file extension
    #[argh(option)]
    pub formatter_name: Option<String>,

    /// search mode: normal, minimize, maximize, maxdiff (default: normal); resilient and
    /// stylediff are recognized but rejected, pending implementation
    #[argh(option, default = "String::from(\"normal\")")]
    pub mode: String,

    /// option name to exclude from the search, may be given more than once
    #[argh(option)]
    pub ignore: Vec<String>,

    /// maximum number of search rounds (default: 64)
    #[argh(option, default = "64")]
    pub max_rounds: u32,

    /// concurrency mode: off, threads, processes (default: threads)
    #[argh(option, default = "String::from(\"threads\")")]
    pub concurrency: String,

    /// number of worker threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// cache backend: off, dedup, flat (default: dedup)
    #[argh(option, default = "String::from(\"dedup\")")]
    pub cache_mode: String,

    /// path to the cache database or directory (default: under the OS temp directory)
    #[argh(option)]
    pub cache_path: Option<String>,

    /// starting style as a YAML-flow literal, e.g. '{BasedOnStyle: LLVM, ColumnLimit: 79}'
    #[argh(option)]
    pub start_style: Option<String>,

    /// path to write the inferred style file (default: print to stdout)
    #[argh(option)]
    pub output_style: Option<String>,

    /// path to write the metric sidecar line for regression comparisons
    #[argh(option)]
    pub save_metric: Option<String>,

    /// report this many runner-up attempts' option diffs alongside the winner (default: 0 = off)
    #[argh(option, default = "0")]
    pub bestofround: usize,

    /// diff tool: auto, builtin, diff, git (default: auto)
    #[argh(option, default = "String::from(\"auto\")")]
    pub difftool: String,

    /// join all input files into one synthetic document before searching
    #[argh(switch)]
    pub concat: bool,

    /// keep temp files (config sidecars, diff-tool scratch input) on disk after exit instead of deleting them
    #[argh(switch)]
    pub keep_temp_files: bool,

    /// increase log verbosity (repeatable)
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// print a commented sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
