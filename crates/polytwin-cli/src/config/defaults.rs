pub struct DefaultsConfig {
    pub seed: u64,
    pub pool_size: usize,
    pub max_expected_twins: usize,
    pub domain_length: f64,
    pub dimensions: u8,
    pub gap_policy: String,
    pub sigma: u32,
    pub crystal_family: String,
    pub tolerance_degrees: f64,
    pub max_iterations: usize,
    pub write_csv: bool,
    pub write_script: bool,
    pub program: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            pool_size: 1000,
            max_expected_twins: 10,
            domain_length: 500.0,
            dimensions: 2,
            gap_policy: "diameter".to_string(),
            sigma: 3,
            crystal_family: "cubic".to_string(),
            tolerance_degrees: 1e-5_f64.to_degrees(),
            max_iterations: 2000,
            write_csv: true,
            write_script: true,
            program: "neper".to_string(),
        }
    }
}
