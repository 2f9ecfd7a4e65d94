use std::time::Instant;

use mdsa_snn::{adaptation, builder, graph, simulation::Simulator, stimulus::StimulusBundle};

fn main() {
    env_logger::init();

    let graph = graph::catalog(5).unwrap().pop().unwrap();
    let m = 10;
    let stimuli = StimulusBundle::generate_with_delta(&graph, 0, 3).unwrap();
    let network = builder::build_network_with_stimuli(&graph, m, &stimuli).unwrap();
    let network = adaptation::add_redundancy(&network).unwrap();
    let t_stop = 200 * stimuli.required_sim_time(m);

    let mut simulator = Simulator::new(&network).unwrap();
    let mut spike_count = 0usize;
    let mut synaptic_transmission_count = 0usize;
    let mut checksum = 0;

    let wall_start = Instant::now();

    for tick_result in simulator.by_ref().take(t_stop) {
        spike_count += tick_result.spiking_nids.len();
        synaptic_transmission_count += tick_result.synaptic_transmission_count;

        for nid in tick_result.spiking_nids {
            checksum += nid;
        }
    }

    let wall_time = wall_start.elapsed();
    let synaptic_transm_proc_throughput =
        synaptic_transmission_count as f64 / wall_time.as_secs_f64();

    eprintln!(
        "Network: {} neurons, {} synapses",
        network.num_neurons(),
        network.num_synapses()
    );
    eprintln!("Spikes per cycle: {}", spike_count as f64 / t_stop as f64);
    eprintln!(
        "Synaptic transmission processing throughput: {:.3e} ({:.3} ns per transmission)",
        synaptic_transm_proc_throughput,
        1e9 / synaptic_transm_proc_throughput
    );
    eprintln!("Checksum: {}", checksum);
}
