use std::time::Instant;

use mdsa_snn::sweep;

#[path = "../scenario_params.rs"]
mod scenario_params;

fn main() {
    env_logger::init();

    let params = scenario_params::get_scenario_params();

    let wall_start = Instant::now();
    let results = sweep::run_sweep(&params).unwrap();
    let wall_time = wall_start.elapsed();

    for result in results.iter().filter(|result| !result.all_passed()) {
        println!("{}", serde_json::to_string(result).unwrap());
    }

    let summary = sweep::summarize(&results);

    eprintln!("Runs: {} in {:.3} s", summary.num_runs, wall_time.as_secs_f64());
    eprintln!("Pass rate: {:?}", summary.pass_rate);
    eprintln!("Adapted pass rate: {:?}", summary.adapted_pass_rate);
    eprintln!("Damaged pass rate: {:?}", summary.damaged_pass_rate);
    eprintln!(
        "Dead neurons per run: mean {:?}, std dev {:?}",
        summary.mean_dead_neurons, summary.std_dev_dead_neurons
    );
}
