use crate::core::io::format_real;
use crate::core::statistics::{LognormalParams, OUTPUT_DECIMALS, round_to_decimals};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PROGRAM: &str = "neper";

#[derive(Debug, Error, PartialEq)]
pub enum TessellatorError {
    #[error("Unsupported number of dimensions: {0} (expected 2 or 3)")]
    UnsupportedDimensions(String),
    #[error("Statistics table '{0}' needs both a mean and a variance")]
    MissingMoments(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimensions {
    #[default]
    Two,
    Three,
}

impl Dimensions {
    pub fn count(&self) -> u8 {
        match self {
            Dimensions::Two => 2,
            Dimensions::Three => 3,
        }
    }
}

impl TryFrom<u8> for Dimensions {
    type Error = TessellatorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Dimensions::Two),
            3 => Ok(Dimensions::Three),
            other => Err(TessellatorError::UnsupportedDimensions(other.to_string())),
        }
    }
}

impl FromStr for Dimensions {
    type Err = TessellatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2" | "2d" => Ok(Dimensions::Two),
            "3" | "3d" => Ok(Dimensions::Three),
            _ => Err(TessellatorError::UnsupportedDimensions(s.to_string())),
        }
    }
}

/// The square or cubic tessellation domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub dimensions: Dimensions,
    pub length: f64,
}

impl Domain {
    pub fn new(dimensions: Dimensions, length: f64) -> Self {
        Self { dimensions, length }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = format_real(self.length);
        match self.dimensions {
            Dimensions::Two => write!(f, "-dim 2 -domain \"square({l},{l})\""),
            Dimensions::Three => write!(f, "-dim 3 -domain \"cube({l},{l},{l})\""),
        }
    }
}

/// Builds the command lines of both tessellation passes.
///
/// Commands are returned as text; nothing here spawns a process.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    domain: Domain,
}

impl CommandBuilder {
    pub fn new(domain: Domain) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            domain,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn raster_options(&self) -> String {
        format!(
            "-format tess,tesr -tesrsize {} -tesrformat ascii",
            format_real(self.domain.length)
        )
    }

    /// The morphology of the parent tessellation from the parent statistics moments.
    ///
    /// Diameter statistics are twice the equivalent-radius statistics.
    pub fn parent_morphology(
        eq_radius: &LognormalParams,
        sphericity: &LognormalParams,
    ) -> Result<String, TessellatorError> {
        let (r_mean, r_var) = eq_radius
            .mean
            .zip(eq_radius.variance)
            .ok_or(TessellatorError::MissingMoments("parent-eq-radius"))?;
        let (s_mean, s_var) = sphericity
            .mean
            .zip(sphericity.variance)
            .ok_or(TessellatorError::MissingMoments("parent-sphericity"))?;

        Ok(format!(
            "diameq:lognormal({},{}),1-sphericity:lognormal({},{})",
            format_real(2.0 * r_mean),
            round_to_decimals(2.0 * r_var.sqrt(), OUTPUT_DECIMALS),
            format_real(s_mean),
            round_to_decimals(s_var.sqrt(), OUTPUT_DECIMALS),
        ))
    }

    /// The first pass: parent grains with a `.stcell` of `diameq,sphericity`.
    pub fn first_pass(
        &self,
        eq_radius: &LognormalParams,
        sphericity: &LognormalParams,
        parent_stem: &Path,
    ) -> Result<String, TessellatorError> {
        let morphology = Self::parent_morphology(eq_radius, sphericity)?;
        Ok(format!(
            "{} -T -n from_morpho -morpho \"{}\" {} -reg 1 {} -statcell diameq,sphericity -o {}",
            self.program,
            morphology,
            self.domain,
            self.raster_options(),
            parent_stem.display()
        ))
    }

    /// The second pass: lamellar twins inside the parent tessellation.
    pub fn second_pass(&self, grain_count: usize, files: &SecondPassFiles) -> String {
        format!(
            "{} -T -n {}::from_morpho -morpho \"voronoi::lamellar(w=file({}),v=crysdir(1,0,0))\" {} \
             -morphooptiini \"file({})\" -ori \"random::msfile({},des=euler-bunge)\" \
             -oridescriptor euler-bunge {} -o {}",
            self.program,
            grain_count,
            files.twin_width.display(),
            self.domain,
            files.parent_tess.display(),
            files.crystal_ori.display(),
            self.raster_options(),
            files.output_stem.display()
        )
    }
}

/// Paths referenced by the second tessellation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondPassFiles {
    pub twin_width: PathBuf,
    pub crystal_ori: PathBuf,
    pub parent_tess: PathBuf,
    pub output_stem: PathBuf,
}

/// Renders commands into a POSIX shell script that stops at the first failure.
pub fn render_script(commands: &[String]) -> String {
    let mut script = String::from("#!/bin/sh\nset -e\n\n");
    for command in commands {
        script.push_str(command);
        script.push('\n');
    }
    script
}

pub fn write_script(path: &Path, commands: &[String]) -> io::Result<()> {
    fs::write(path, render_script(commands))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
