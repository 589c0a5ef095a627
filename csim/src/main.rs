use std::fs::File;
use std::io::{self, BufReader};
use std::time::Instant;
use clap::{ArgAction, Parser};
use eyre::{eyre, WrapErr};
use tracing_subscriber::{fmt, EnvFilter};
use csimlib::config::CacheConfig;
use csimlib::io::get_reader;
use csimlib::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Replays a valgrind memory trace against a set-associative LRU cache"))]
struct Args {
    /// Number of set index bits (S = 2^s is the number of sets)
    #[arg(short = 's', long = "set-bits", required_unless_present = "config")]
    set_bits: Option<u32>,

    /// Number of lines per set (associativity)
    #[arg(short = 'E', long = "lines-per-set", required_unless_present = "config")]
    lines_per_set: Option<u32>,

    /// Number of block bits (B = 2^b is the block size)
    #[arg(short = 'b', long = "block-bits", required_unless_present = "config")]
    block_bits: Option<u32>,

    /// Name of the valgrind trace to replay
    #[arg(short = 't', long = "trace")]
    trace: String,

    /// Print the outcome of every load, store and modify
    #[arg(short, long)]
    verbose: bool,

    /// JSON cache configuration, any of -s, -E and -b given as well take precedence
    #[arg(long)]
    config: Option<String>,

    /// Print the result as JSON instead of the summary line
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    /// Print the parsed configuration and cache occupancy after the result
    #[arg(short, long, default_value_t = DEBUG_DEFAULT, action = ArgAction::Set)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn load_config(args: &Args) -> eyre::Result<CacheConfig> {
    let from_file = match &args.config {
        Some(path) => {
            let config_file = File::open(path).wrap_err_with(|| format!("Couldn't open the config file at path {path}"))?;
            let config: CacheConfig = serde_json::from_reader(BufReader::new(config_file)).wrap_err("Couldn't parse the config file")?;
            Some(config)
        }
        None => None,
    };
    let pick = |flag: Option<u32>, file_value: Option<u32>, name: &str| {
        flag.or(file_value).ok_or_else(|| eyre!("No value given for -{name}"))
    };
    let config = CacheConfig::new(
        pick(args.set_bits, from_file.map(|c| c.set_bits), "s")?,
        pick(args.lines_per_set, from_file.map(|c| c.lines_per_set), "E")?,
        pick(args.block_bits, from_file.map(|c| c.block_bits), "b")?,
    );
    config.validate()?;
    Ok(config)
}

fn main() -> eyre::Result<()> {
    let start = Instant::now();
    let args = Args::parse();
    init_logging(args.debug);
    let config = load_config(&args)?;
    let mut simulator = Simulator::new(&config)?;
    let trace_file = File::open(&args.trace).wrap_err_with(|| format!("Couldn't open the trace file at path {}", args.trace))?;
    let trace_reader = get_reader(trace_file).map_err(|e| eyre!(e))?;
    let result = if args.verbose {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        *simulator.simulate_verbose(trace_reader, &mut out)?
    } else {
        *simulator.simulate(trace_reader)?
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).wrap_err("Couldn't serialise the output")?);
    } else {
        println!("{result}");
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        println!("Sets: {}, block size: {} bytes", config.num_sets(), config.block_size());
        println!("Invalid cache lines: {}", simulator.get_invalid_line_count());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_flags() {
        let args = Args::try_parse_from(["csim", "-v", "-s", "4", "-E", "1", "-b", "4", "-t", "traces/yi.trace"]).unwrap();
        assert!(args.verbose);
        assert_eq!(load_config(&args).unwrap(), CacheConfig::new(4, 1, 4));
        assert_eq!(args.trace, "traces/yi.trace");
    }

    #[test]
    fn debug_can_be_switched_off() {
        let args = Args::try_parse_from(["csim", "-s", "1", "-E", "1", "-b", "1", "-t", "yi.trace", "-d", "false"]).unwrap();
        assert!(!args.debug);
        let args = Args::try_parse_from(["csim", "-s", "1", "-E", "1", "-b", "1", "-t", "yi.trace", "--debug", "true"]).unwrap();
        assert!(args.debug);
        let args = Args::try_parse_from(["csim", "-s", "1", "-E", "1", "-b", "1", "-t", "yi.trace"]).unwrap();
        assert_eq!(args.debug, DEBUG_DEFAULT);
    }

    #[test]
    fn requires_shape_without_config() {
        assert!(Args::try_parse_from(["csim", "-s", "4", "-b", "4", "-t", "yi.trace"]).is_err());
        assert!(Args::try_parse_from(["csim", "-s", "4", "-E", "1", "-b", "4"]).is_err());
    }

    #[test]
    fn rejects_zero_associativity() {
        let args = Args::try_parse_from(["csim", "-s", "4", "-E", "0", "-b", "4", "-t", "yi.trace"]).unwrap();
        let error = load_config(&args).unwrap_err();
        assert!(error.to_string().contains("(E)"));
    }

    #[test]
    fn flags_override_config_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../csimlib/testdata/configs/s4-E1-b4.json");
        let args = Args::try_parse_from(["csim", "--config", path, "-E", "2", "-t", "yi.trace"]).unwrap();
        assert_eq!(load_config(&args).unwrap(), CacheConfig::new(4, 2, 4));
    }
}
