use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, ParentStatistics};
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ParseError};
use polytwin::core::io::tessellator::{Dimensions, Domain};
use polytwin::core::orientation::CrystalFamily;
use polytwin::core::statistics::MicrostructureStatistics;
use polytwin::engine::config::{
    GapPolicy, GenerationConfigBuilder, OrientationStrategy, SolverConfig,
};
use std::path::PathBuf;
use tracing::{debug, info};

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Config(e.to_string())
    }
}

pub fn build_config(args: &GenerateArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let stats_file = file_config.statistics.take().unwrap_or_default();
    let layout_file = file_config.layout.take().unwrap_or_default();
    let orientation_file = file_config.orientation.take().unwrap_or_default();
    let output_file = file_config.output.take().unwrap_or_default();

    let statistics = load_statistics(args.statistics.as_ref().or(stats_file.file.as_ref()))?;
    let twin_thickness = stats_file
        .twin_thickness
        .or(statistics.as_ref().map(|s| s.twin_thickness))
        .ok_or_else(|| {
            CliError::Config(
                "Twin thickness statistics are required: set `statistics.twin-thickness` or pass --statistics."
                    .to_string(),
            )
        })?;

    let gap_policy: GapPolicy = args
        .gap_policy
        .as_deref()
        .or(layout_file.gap_policy.as_deref())
        .unwrap_or(defaults.gap_policy.as_str())
        .parse()
        .map_err(|e: polytwin::engine::config::ConfigError| CliError::Config(e.to_string()))?;

    let dimensions = Dimensions::try_from(
        args.dimensions
            .or(layout_file.dimensions)
            .unwrap_or(defaults.dimensions),
    )
    .map_err(|e| CliError::Config(e.to_string()))?;

    let domain_length = args
        .domain_length
        .or(layout_file.domain_length)
        .unwrap_or(defaults.domain_length);
    let max_expected_twins = args
        .max_twins
        .or(layout_file.max_expected_twins)
        .unwrap_or(defaults.max_expected_twins);

    let orientation = merge_orientation(args, orientation_file, &defaults)?;

    let core_config = GenerationConfigBuilder::new()
        .twin_thickness(twin_thickness)
        .pool_size(stats_file.pool_size.unwrap_or(defaults.pool_size))
        .max_expected_twins(max_expected_twins)
        .domain_length(domain_length)
        .gap_policy(gap_policy)
        .orientation(orientation)
        .seed(args.seed.or(file_config.seed).unwrap_or(defaults.seed))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let parent_statistics = statistics.and_then(|s| {
        Some(ParentStatistics {
            eq_radius: s.parent_eq_radius?,
            sphericity: s.parent_sphericity?,
        })
    });

    debug!(?core_config, "Resolved generation configuration.");

    Ok(AppConfig {
        grains_path: args.grains.clone(),
        output_dir: args.output_dir.clone(),
        core_config,
        domain: Domain::new(dimensions, domain_length),
        parent_statistics,
        write_csv: !args.no_csv && output_file.csv.unwrap_or(defaults.write_csv),
        write_script: !args.no_script && output_file.script.unwrap_or(defaults.write_script),
        program: output_file.program.unwrap_or(defaults.program),
    })
}

fn load_statistics(path: Option<&PathBuf>) -> Result<Option<MicrostructureStatistics>> {
    let Some(path) = path else {
        return Ok(None);
    };
    info!("Loading microstructure statistics from {:?}", path);
    MicrostructureStatistics::load(path)
        .map(Some)
        .map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })
}

fn merge_orientation(
    args: &GenerateArgs,
    file_val: super::file::FileOrientationConfig,
    defaults: &DefaultsConfig,
) -> Result<OrientationStrategy> {
    let family: CrystalFamily = args
        .crystal_family
        .as_deref()
        .or(file_val.crystal_family.as_deref())
        .unwrap_or(defaults.crystal_family.as_str())
        .parse()
        .map_err(|e: polytwin::core::orientation::symmetry::SymmetryError| {
            CliError::Config(e.to_string())
        })?;
    let solver = SolverConfig {
        tolerance: file_val
            .tolerance
            .unwrap_or(defaults.tolerance_degrees)
            .to_radians(),
        max_iterations: file_val.max_iterations.unwrap_or(defaults.max_iterations),
    };
    let solve = |angle_degrees: f64| OrientationStrategy::Misorientation {
        angle_degrees,
        family,
        solver,
    };

    if let Some(angle) = args.misorientation {
        return Ok(solve(angle));
    }
    if let Some(sigma) = args.sigma {
        return Ok(OrientationStrategy::Csl { sigma });
    }
    match (file_val.sigma, file_val.misorientation) {
        (Some(_), Some(_)) => Err(CliError::Config(
            "Set only one of `orientation.sigma` and `orientation.misorientation`.".to_string(),
        )),
        (None, Some(angle)) => Ok(solve(angle)),
        (Some(sigma), None) => Ok(OrientationStrategy::Csl { sigma }),
        (None, None) => Ok(OrientationStrategy::Csl {
            sigma: defaults.sigma,
        }),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = parser::parse_assignment(kv_pair)?;

        match key {
            "seed" => config.seed = Some(parser::parse_value(key, value)?),
            "statistics.file" => {
                config.statistics.get_or_insert_with(Default::default).file =
                    Some(PathBuf::from(value));
            }
            "statistics.pool-size" => {
                config
                    .statistics
                    .get_or_insert_with(Default::default)
                    .pool_size = Some(parser::parse_value(key, value)?);
            }
            "layout.max-expected-twins" => {
                config
                    .layout
                    .get_or_insert_with(Default::default)
                    .max_expected_twins = Some(parser::parse_value(key, value)?);
            }
            "layout.domain-length" => {
                config
                    .layout
                    .get_or_insert_with(Default::default)
                    .domain_length = Some(parser::parse_value(key, value)?);
            }
            "layout.dimensions" => {
                config
                    .layout
                    .get_or_insert_with(Default::default)
                    .dimensions = Some(parser::parse_value(key, value)?);
            }
            "layout.gap-policy" => {
                config
                    .layout
                    .get_or_insert_with(Default::default)
                    .gap_policy = Some(value.to_string());
            }
            "orientation.sigma" => {
                let orientation = config.orientation.get_or_insert_with(Default::default);
                orientation.sigma = Some(parser::parse_value(key, value)?);
                orientation.misorientation = None;
            }
            "orientation.misorientation" => {
                let orientation = config.orientation.get_or_insert_with(Default::default);
                orientation.misorientation = Some(parser::parse_value(key, value)?);
                orientation.sigma = None;
            }
            "orientation.crystal-family" => {
                config
                    .orientation
                    .get_or_insert_with(Default::default)
                    .crystal_family = Some(value.to_string());
            }
            "orientation.tolerance" => {
                config
                    .orientation
                    .get_or_insert_with(Default::default)
                    .tolerance = Some(parser::parse_value(key, value)?);
            }
            "orientation.max-iterations" => {
                config
                    .orientation
                    .get_or_insert_with(Default::default)
                    .max_iterations = Some(parser::parse_value(key, value)?);
            }
            "output.csv" => {
                config.output.get_or_insert_with(Default::default).csv =
                    Some(parser::parse_value(key, value)?);
            }
            "output.script" => {
                config.output.get_or_insert_with(Default::default).script =
                    Some(parser::parse_value(key, value)?);
            }
            "output.program" => {
                config
                    .output
                    .get_or_insert_with(Default::default)
                    .program = Some(value.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const STATISTICS: &str = r#"
        [twin-thickness]
        mu = 1.45213
        sigma = 0.87586
        min = 0.6042
        max = 59.8839

        [parent-eq-radius]
        mu = 2.5
        sigma = 0.4
        min = 3.0
        max = 80.0
        mean = 13.3
        variance = 30.0

        [parent-sphericity]
        mu = -2.0
        sigma = 0.3
        min = 0.01
        max = 0.5
        mean = 0.14
        variance = 0.002
    "#;

    fn setup() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let stats = dir.path().join("stats.toml");
        fs::write(&stats, STATISTICS).unwrap();
        (dir, stats)
    }

    fn base_generate_args() -> GenerateArgs {
        GenerateArgs {
            grains: PathBuf::from("parent.stcell"),
            output_dir: PathBuf::from("out"),
            config: None,
            statistics: None,
            seed: None,
            sigma: None,
            misorientation: None,
            crystal_family: None,
            max_twins: None,
            domain_length: None,
            dimensions: None,
            gap_policy: None,
            no_csv: false,
            no_script: false,
            set_values: vec![],
        }
    }

    #[test]
    fn statistics_file_and_defaults_produce_a_complete_config() {
        let (_dir, stats) = setup();
        let mut args = base_generate_args();
        args.statistics = Some(stats);

        let app = build_config(&args).unwrap();
        let defaults = DefaultsConfig::default();

        assert_eq!(app.core_config.twin_thickness.mu, 1.45213);
        assert_eq!(app.core_config.layout.max_expected_twins, defaults.max_expected_twins);
        assert_eq!(app.core_config.layout.domain_length, defaults.domain_length);
        assert_eq!(app.core_config.orientation, OrientationStrategy::Csl { sigma: 3 });
        assert_eq!(app.domain.dimensions, Dimensions::Two);
        assert!(app.parent_statistics.is_some());
        assert!(app.write_csv && app.write_script);
    }

    #[test]
    fn missing_twin_thickness_is_a_config_error() {
        let result = build_config(&base_generate_args());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("twin-thickness")));
    }

    #[test]
    fn cli_args_override_file_values() {
        let (dir, stats) = setup();
        let config_path = dir.path().join("polytwin.toml");
        fs::write(
            &config_path,
            r#"
            seed = 3
            [layout]
            max-expected-twins = 4
            domain-length = 100.0
            [orientation]
            sigma = 5
            "#,
        )
        .unwrap();

        let mut args = base_generate_args();
        args.config = Some(config_path);
        args.statistics = Some(stats);
        args.max_twins = Some(7);
        args.misorientation = Some(45.0);
        args.dimensions = Some(3);
        args.no_csv = true;

        let app = build_config(&args).unwrap();

        assert_eq!(app.core_config.seed, 3);
        assert_eq!(app.core_config.layout.max_expected_twins, 7);
        assert_eq!(app.core_config.layout.domain_length, 100.0);
        assert!(matches!(
            app.core_config.orientation,
            OrientationStrategy::Misorientation { angle_degrees, .. } if angle_degrees == 45.0
        ));
        assert_eq!(app.domain, Domain::new(Dimensions::Three, 100.0));
        assert!(!app.write_csv);
    }

    #[test]
    fn set_values_override_the_file() {
        let (_dir, stats) = setup();
        let mut args = base_generate_args();
        args.statistics = Some(stats);
        args.set_values = vec![
            "layout.max-expected-twins=12".to_string(),
            "orientation.misorientation=38.94".to_string(),
            "orientation.crystal-family=hexagonal".to_string(),
            "layout.gap-policy=sphericity-scaled".to_string(),
        ];

        let app = build_config(&args).unwrap();

        assert_eq!(app.core_config.layout.max_expected_twins, 12);
        assert_eq!(app.core_config.layout.gap_policy, GapPolicy::SphericityScaled);
        assert!(matches!(
            app.core_config.orientation,
            OrientationStrategy::Misorientation {
                family: CrystalFamily::Hexagonal,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_set_keys_and_values_are_rejected() {
        let (_dir, stats) = setup();
        let mut args = base_generate_args();
        args.statistics = Some(stats.clone());
        args.set_values = vec!["layout.colour=red".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["seed=minus-one".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(msg)) if msg.contains("seed")));
    }

    #[test]
    fn invalid_sigma_is_reported_by_the_core_builder() {
        let (_dir, stats) = setup();
        let mut args = base_generate_args();
        args.statistics = Some(stats);
        args.sigma = Some(13);

        let result = build_config(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("13")));
    }
}
