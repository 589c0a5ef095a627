use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use crate::config::CacheConfig;
use crate::io::get_reader;
use crate::simulator::{replay, SimulationResult, Simulator};
use crate::util::get_configs;

fn init() {
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .unwrap_or_default();
}

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    init();
    let cases = get_configs()?;
    assert!(!cases.is_empty());
    for test in cases {
        println!("Running test for {}", test.name);
        let trace_file = File::open(&test.trace)?;
        let expected_output_file = File::open(&test.output)?;
        let expected_output: SimulationResult = serde_json::from_reader(BufReader::new(expected_output_file))?;
        // Simulate!
        let mut simulator = Simulator::new(&test.config)?;
        let result = simulator.simulate(get_reader(trace_file)?)?;
        assert_eq!(*result, expected_output, "{}", test.name);
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.name, time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}

#[test]
fn replay_matches_simulator() -> Result<(), Box<dyn Error>> {
    for test in get_configs()? {
        let replayed = replay(BufReader::new(File::open(&test.trace)?), &test.config, false)?;
        let simulated = *Simulator::new(&test.config)?.simulate(BufReader::new(File::open(&test.trace)?))?;
        assert_eq!(replayed, simulated, "{}", test.name);
    }
    Ok(())
}

#[test]
fn verbose_lru_trace() -> Result<(), Box<dyn Error>> {
    let trace = File::open(format!("{}/traces/lru.trace", crate::util::TEST_DATA_PATH))?;
    let mut simulator = Simulator::new(&CacheConfig::new(1, 2, 4))?;
    let mut out = Vec::new();
    simulator.simulate_verbose(BufReader::new(trace), &mut out)?;
    let expected = [
        "L 0,4 miss",
        "L 20,4 miss",
        "L 0,4 hit",
        "L 40,4 miss eviction",
        "L 20,4 miss eviction",
        "S 40,4 hit",
        "L 10,4 miss",
        "M 50,4 miss hit",
        "L 70,4 miss eviction",
    ];
    assert_eq!(String::from_utf8(out)?.lines().collect::<Vec<_>>(), expected);
    // Set 0 holds tags 1 and 2, set 1 holds tags 3 and 2
    let cache = simulator.cache();
    assert_eq!(cache.set(0).iter().map(|line| line.tag).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(cache.set(1).iter().map(|line| line.tag).collect::<Vec<_>>(), [3, 2]);
    assert_eq!(simulator.get_invalid_line_count(), 0);
    Ok(())
}
