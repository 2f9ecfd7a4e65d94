use mdsa_snn::params::SweepParams;

pub fn get_scenario_params() -> SweepParams {
    let params_yaml_str = r#"
graph_sizes: [3, 4, 5]
m_vals: [0, 1, 2]
seeds: [0, 1, 2, 3, 4]
adaptations: [false, true]
radiations:
- null
- neuron_death_probability: 0.05
  roles: [spike_once, degree_receiver, selector]
- neuron_death_probability: 0.25
  roles: [spike_once, degree_receiver, selector]
technical_params:
  num_threads: null
  pin_threads: false
"#;

    serde_yaml::from_str(params_yaml_str).unwrap()
}
