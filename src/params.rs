use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

use crate::graph::CATALOG_SIZES;
use crate::neuron::Role;

pub const MAX_APPROXIMATION_ROUNDS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub m: usize,
    pub seed: u64,
    pub sim_time: Option<usize>,
    pub adaptation: bool,
    pub radiation: Option<RadiationParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationParams {
    pub neuron_death_probability: f64,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    pub graph_sizes: Vec<usize>,
    pub m_vals: Vec<usize>,
    pub seeds: Vec<u64>,
    pub adaptations: Vec<bool>,
    pub radiations: Vec<Option<RadiationParams>>,
    pub technical_params: TechnicalParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalParams {
    pub num_threads: Option<usize>,
    pub pin_threads: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            m: 1,
            seed: 0,
            sim_time: None,
            adaptation: false,
            radiation: None,
        }
    }
}

impl Default for RadiationParams {
    fn default() -> Self {
        Self {
            neuron_death_probability: 0.0,
            roles: Role::ALL.to_vec(),
        }
    }
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            graph_sizes: vec![3],
            m_vals: vec![1],
            seeds: vec![0],
            adaptations: vec![false],
            radiations: vec![None],
            technical_params: TechnicalParams::default(),
        }
    }
}

impl Default for TechnicalParams {
    fn default() -> Self {
        Self {
            num_threads: Some(1),
            pin_threads: false,
        }
    }
}

pub fn validate_run_params(run_params: &RunParams) -> Result<(), SimpleError> {
    validate_m(run_params.m)?;

    if let Some(radiation_params) = &run_params.radiation {
        validate_radiation_params(radiation_params)?;
    }

    Ok(())
}

pub fn validate_sweep_params(sweep_params: &SweepParams) -> Result<(), SimpleError> {
    if sweep_params.graph_sizes.is_empty()
        || sweep_params.m_vals.is_empty()
        || sweep_params.seeds.is_empty()
        || sweep_params.adaptations.is_empty()
        || sweep_params.radiations.is_empty()
    {
        return Err(SimpleError::new("sweep axes must not be empty"));
    }

    for &size in &sweep_params.graph_sizes {
        if !CATALOG_SIZES.contains(&size) {
            return Err(SimpleError::new(format!(
                "unsupported graph size: {}",
                size
            )));
        }
    }

    for &m in &sweep_params.m_vals {
        validate_m(m)?;
    }

    for radiation_params in sweep_params.radiations.iter().flatten() {
        validate_radiation_params(radiation_params)?;
    }

    validate_technical_params(&sweep_params.technical_params)?;

    Ok(())
}

fn validate_m(m: usize) -> Result<(), SimpleError> {
    if m > MAX_APPROXIMATION_ROUNDS {
        return Err(SimpleError::new(format!(
            "m must not be greater than {}",
            MAX_APPROXIMATION_ROUNDS
        )));
    }

    Ok(())
}

fn validate_radiation_params(radiation_params: &RadiationParams) -> Result<(), SimpleError> {
    let probability = radiation_params.neuron_death_probability;

    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(SimpleError::new(
            "neuron_death_probability must be in [0, 1]",
        ));
    }

    if radiation_params.roles.is_empty() {
        return Err(SimpleError::new("radiation roles must not be empty"));
    }

    Ok(())
}

fn validate_technical_params(technical_params: &TechnicalParams) -> Result<(), SimpleError> {
    if let Some(num_threads) = technical_params.num_threads {
        if num_threads == 0 {
            return Err(SimpleError::new("num_threads must be strictly positive"));
        }

        if num_cpus::get() < num_threads {
            return Err(SimpleError::new(
                "num_threads must not be greater than number of available CPUs",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_util;

    fn get_template_sweep_params() -> SweepParams {
        SweepParams {
            graph_sizes: vec![3, 4],
            m_vals: vec![0, 1, 2],
            seeds: vec![0, 1],
            adaptations: vec![false, true],
            radiations: vec![None, test_util::get_template_run_params().radiation],
            technical_params: TechnicalParams::default(),
        }
    }

    #[test]
    fn valid_templates() {
        assert!(validate_run_params(&test_util::get_template_run_params()).is_ok());
        assert!(validate_run_params(&RunParams::default()).is_ok());
        assert!(validate_sweep_params(&get_template_sweep_params()).is_ok());
        assert!(validate_sweep_params(&SweepParams::default()).is_ok());
    }

    #[test]
    fn too_many_rounds() {
        let mut params = test_util::get_template_run_params();
        params.m = MAX_APPROXIMATION_ROUNDS + 1;
        let result = validate_run_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "m must not be greater than 100");
    }

    #[test]
    fn probability_out_of_range() {
        for probability in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            let mut params = test_util::get_template_run_params();
            params.radiation.as_mut().unwrap().neuron_death_probability = probability;
            let result = validate_run_params(&params);

            assert!(result.is_err());

            assert_eq!(
                result.unwrap_err().as_str(),
                "neuron_death_probability must be in [0, 1]"
            );
        }
    }

    #[test]
    fn probability_bounds_accepted() {
        for probability in [0.0, 1.0] {
            let mut params = test_util::get_template_run_params();
            params.radiation.as_mut().unwrap().neuron_death_probability = probability;

            assert!(validate_run_params(&params).is_ok());
        }
    }

    #[test]
    fn empty_roles() {
        let mut params = test_util::get_template_run_params();
        params.radiation.as_mut().unwrap().roles.clear();
        let result = validate_run_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "radiation roles must not be empty"
        );
    }

    #[test]
    fn empty_sweep_axis() {
        let mut params = get_template_sweep_params();
        params.seeds.clear();
        let result = validate_sweep_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "sweep axes must not be empty");
    }

    #[test]
    fn unsupported_graph_size() {
        let mut params = get_template_sweep_params();
        params.graph_sizes.push(7);
        let result = validate_sweep_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "unsupported graph size: 7");
    }

    #[test]
    fn invalid_radiation_in_sweep() {
        let mut params = get_template_sweep_params();
        params.radiations.push(Some(RadiationParams {
            neuron_death_probability: 2.0,
            roles: vec![Role::Selector],
        }));

        assert!(validate_sweep_params(&params).is_err());
    }

    #[test]
    fn zero_threads() {
        let mut params = get_template_sweep_params();
        params.technical_params.num_threads = Some(0);
        let result = validate_sweep_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "num_threads must be strictly positive"
        );
    }

    #[test]
    fn too_many_threads() {
        let mut params = get_template_sweep_params();
        params.technical_params.num_threads = Some(num_cpus::get() + 1);
        let result = validate_sweep_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "num_threads must not be greater than number of available CPUs"
        );
    }

    #[test]
    fn yaml_round_trip() {
        let params = get_template_sweep_params();
        let yaml = serde_yaml::to_string(&params).unwrap();
        let restored: SweepParams = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(restored, params);
    }
}
