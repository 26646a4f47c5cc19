use crate::cli::GenerateArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use polytwin::{
    core::io::{
        crystal_ori::CrystalOrientationWriter,
        export,
        lamellae::TwinWidthFile,
        stcell::StatCellFile,
        tessellator::{self, CommandBuilder, SecondPassFiles},
        traits::TessellatorFile,
    },
    engine::progress::ProgressReporter,
    workflows::{self, generate::GenerationResult},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TWIN_WIDTH_FILE: &str = "twin_width";
const CRYSTAL_ORI_FILE: &str = "crystal_ori";
const PARENT_STATS_FILE: &str = "stats_parent.csv";
const TWIN_STATS_FILE: &str = "stats_twin.csv";
const SCRIPT_FILE: &str = "run.sh";
const RVE_STEM: &str = "rve";

/// Files produced by one `generate` run.
#[derive(Debug, Default)]
pub struct GeneratedFiles {
    pub twin_width: PathBuf,
    pub crystal_ori: PathBuf,
    pub statistics: Vec<PathBuf>,
    pub script: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    info!("Building configuration from defaults, file and CLI arguments...");
    let config = build_config(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Generating twin descriptors...");
    let (result, files) = execute(&config, &reporter)?;

    println!(
        "Workflow complete: {} grain(s), {} twin lamella(e).",
        result.grains.len(),
        result.total_twins
    );
    if result.approximate_pairs > 0 {
        warn!(
            "{} orientation pair(s) missed the solver tolerance.",
            result.approximate_pairs
        );
        println!(
            "Warning: {} orientation pair(s) are approximate; see stats_parent.csv for the angles used.",
            result.approximate_pairs
        );
    }
    println!("✓ Twin lamellae written to: {}", files.twin_width.display());
    println!("✓ Orientations written to: {}", files.crystal_ori.display());
    for path in &files.statistics {
        println!("✓ Statistics written to: {}", path.display());
    }
    if let Some(script) = &files.script {
        println!("✓ Tessellator script written to: {}", script.display());
    }
    Ok(())
}

/// Reads the grains, runs the workflow and writes every output file.
pub fn execute(
    config: &AppConfig,
    reporter: &ProgressReporter,
) -> Result<(GenerationResult, GeneratedFiles)> {
    info!("Loading first-pass grain statistics from {:?}", &config.grains_path);
    let grains = StatCellFile::read_from_path(&config.grains_path).map_err(|e| {
        CliError::FileParsing {
            path: config.grains_path.clone(),
            source: e.into(),
        }
    })?;
    info!("Read {} grain(s).", grains.len());

    let result = workflows::generate::run(grains, &config.core_config, reporter)?;
    let files = write_outputs(config, &result)?;
    Ok((result, files))
}

fn output_error(path: &Path, source: impl Into<anyhow::Error>) -> CliError {
    CliError::Output {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

fn write_outputs(config: &AppConfig, result: &GenerationResult) -> Result<GeneratedFiles> {
    let out = &config.output_dir;
    std::fs::create_dir_all(out).map_err(|e| output_error(out, e))?;

    let twin_width = out.join(TWIN_WIDTH_FILE);
    let entries = TwinWidthFile::entries(&result.grains).map_err(|e| output_error(&twin_width, e))?;
    TwinWidthFile::write_to_path(&entries, &twin_width).map_err(|e| output_error(&twin_width, e))?;
    info!("Wrote {} lamella sequence(s) to {:?}", entries.len(), &twin_width);

    let crystal_ori = out.join(CRYSTAL_ORI_FILE);
    let repeats = config.core_config.layout.max_expected_twins.max(1);
    CrystalOrientationWriter::new(&crystal_ori, repeats)
        .write_all(&result.grains)
        .map_err(|e| output_error(&crystal_ori, e))?;

    let mut files = GeneratedFiles {
        twin_width,
        crystal_ori,
        ..Default::default()
    };

    if config.write_csv {
        let parent_path = out.join(PARENT_STATS_FILE);
        export::write_parent_stats(&result.grains, &parent_path)
            .map_err(|e| output_error(&parent_path, e))?;
        let twin_path = out.join(TWIN_STATS_FILE);
        export::write_twin_stats(&result.grains, &twin_path)
            .map_err(|e| output_error(&twin_path, e))?;
        files.statistics = vec![parent_path, twin_path];
    }

    if config.write_script {
        let script_path = out.join(SCRIPT_FILE);
        let commands = tessellator_commands(config, result.grains.len(), &files)?;
        tessellator::write_script(&script_path, &commands)
            .map_err(|e| output_error(&script_path, e))?;
        files.script = Some(script_path);
    }

    Ok(files)
}

fn tessellator_commands(
    config: &AppConfig,
    grain_count: usize,
    files: &GeneratedFiles,
) -> Result<Vec<String>> {
    let builder = CommandBuilder::new(config.domain).with_program(config.program.as_str());
    let parent_stem = config.grains_path.with_extension("");
    let mut commands = Vec::with_capacity(2);

    match &config.parent_statistics {
        Some(parent) => {
            let first = builder
                .first_pass(&parent.eq_radius, &parent.sphericity, &parent_stem)
                .map_err(|e| CliError::Config(e.to_string()))?;
            commands.push(first);
        }
        None => info!("No parent statistics available; the script starts from an existing tessellation."),
    }

    commands.push(builder.second_pass(
        grain_count,
        &SecondPassFiles {
            twin_width: files.twin_width.clone(),
            crystal_ori: files.crystal_ori.clone(),
            parent_tess: parent_stem.with_extension("tess"),
            output_stem: config.output_dir.join(RVE_STEM),
        },
    ));
    Ok(commands)
}
