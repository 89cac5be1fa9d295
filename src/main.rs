// src/main.rs

use log::{info, LevelFilter};
use paint_buffer_sim::io::reporting;
use paint_buffer_sim::simulation::comparison::Comparison;
use paint_buffer_sim::simulation::config::SimulationConfig;
use paint_buffer_sim::simulation::metrics::MetricsReport;
use std::env;
use std::error::Error;

const DEFAULT_CYCLES: usize = 1000;
const DEFAULT_SEED: u64 = 42;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .init();

    println!("=== Paint Shop Buffer Simulation ===");

    // 1. READ ARGUMENTS
    // Usage: paint-buffer-sim [cycles] [seed]
    let args: Vec<String> = env::args().collect();
    let cycles = match args.get(1) {
        Some(raw) => raw.parse::<usize>()?,
        None => DEFAULT_CYCLES,
    };
    let seed = match args.get(2) {
        Some(raw) => raw.parse::<u64>()?,
        None => DEFAULT_SEED,
    };

    // 2. SETUP CONFIGURATION
    // 4 lines x 14 for oven 1, 5 lines x 16 for oven 2, plant color mix.
    let config = SimulationConfig::default().with_seed(seed);
    info!(
        "{} cycles, seed {}, groups {}x{} / {}x{}",
        cycles,
        seed,
        config.first_group.lines,
        config.first_group.capacity,
        config.second_group.lines,
        config.second_group.capacity
    );

    // 3. RUN BOTH STRATEGIES ON THE SAME COLORS
    let mut comparison = Comparison::new(config)?;
    comparison.run(cycles)?;

    // 4. EXPORT RESULTS
    let files = [
        ("optimized_cycles.csv", comparison.optimized()),
        ("round_robin_cycles.csv", comparison.baseline()),
    ];
    for (path, sim) in files {
        reporting::write_cycle_log(path, sim.history())?;
        println!("Cycle log written to ./{}", path);
    }
    let report = comparison.report();
    reporting::write_utilization("optimized_utilization.csv", &report.optimized)?;
    reporting::write_utilization("round_robin_utilization.csv", &report.baseline)?;

    // 5. PRINT COMPARISON
    println!("\n=== Results after {} cycles ===", cycles);
    print_report("Optimized", &report.optimized);
    print_report("Round-robin", &report.baseline);

    println!("\n=== Optimized vs Round-robin ===");
    println!("JPH gain: {:+.1}", report.jph_gain);
    println!("Changeover reduction: {:.1}%", report.changeover_reduction);

    println!("\nSimulation Complete.");
    Ok(())
}

fn print_report(label: &str, report: &MetricsReport) {
    println!("\n--- {} ---", label);
    println!("JPH:                 {:.1}", report.jph);
    println!(
        "Changeovers:         {} ({:.1}% of extracted)",
        report.changeovers, report.changeover_rate
    );
    println!("Bodies per color run: {:.2}", report.avg_between_changeovers);
    println!("Spills (violations): {}", report.violations);
    println!("Overflows:           {}", report.overflows);
    println!(
        "Extracted:           {} of {} generated",
        report.extracted, report.generated
    );
    println!(
        "Time (s):            base {:.0} + penalty {:.0} = {:.0}",
        report.time.base_processing, report.time.penalty, report.time.effective
    );
    println!("Mean utilization:    {:.1}%", report.mean_cycle_utilization);
}
