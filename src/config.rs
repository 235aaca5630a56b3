use anyhow::bail;
use clap::{Parser, ValueEnum};

/// Which of the two demo programs to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Variant {
    /// No particles and no buttons; the idle loop pulses the mesh scale with wall-clock time.
    Pulse,
    /// Particle field plus the scale-up / scale-down / reset control panel.
    Particles,
}

/// What happens to the loop of the mode being entered when it is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TransitionPolicy {
    /// Re-entering a mode cancels its previous loop first, so exactly one loop is ever live.
    Idempotent,
    /// Re-entering a mode overwrites its handle without cancelling, leaving the old loop running.
    Compounding,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "icosphere-demo", about = "Gradient-shaded icosahedron with an orbit camera")]
pub struct DemoConfig {
    #[arg(long, value_enum, default_value = "particles")]
    pub variant: Variant,

    #[arg(long, value_enum, default_value = "idempotent")]
    pub transitions: TransitionPolicy,

    /// Number of particles in the particle field.
    #[arg(long, default_value_t = 2000)]
    pub particles: usize,

    /// Half-width of the cube the particles are scattered in.
    #[arg(long, default_value_t = 3.0)]
    pub particle_extent: f32,

    /// Upper bound for the device pixel ratio used for the output size.
    #[arg(long, default_value_t = 2.0)]
    pub max_pixel_ratio: f64,
}

impl DemoConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.particle_extent.is_finite() || self.particle_extent <= 0.0 {
            bail!(
                "Particle extent must be a positive number, got {}",
                self.particle_extent
            );
        }

        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio <= 0.0 {
            bail!(
                "Max pixel ratio must be a positive number, got {}",
                self.max_pixel_ratio
            );
        }

        Ok(())
    }

    pub fn has_particles(&self) -> bool {
        self.variant == Variant::Particles
    }

    pub fn has_control_panel(&self) -> bool {
        self.variant == Variant::Particles
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Particles,
            transitions: TransitionPolicy::Idempotent,
            particles: 2000,
            particle_extent: 3.0,
            max_pixel_ratio: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parsed_defaults() {
        let parsed = DemoConfig::try_parse_from(["icosphere-demo"]).unwrap();
        let default = DemoConfig::default();

        assert_eq!(parsed.variant, default.variant);
        assert_eq!(parsed.transitions, default.transitions);
        assert_eq!(parsed.particles, default.particles);
        assert_eq!(parsed.particle_extent, default.particle_extent);
        assert_eq!(parsed.max_pixel_ratio, default.max_pixel_ratio);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn parses_flags() {
        let config = DemoConfig::try_parse_from([
            "icosphere-demo",
            "--variant",
            "pulse",
            "--transitions",
            "compounding",
            "--particles",
            "10",
        ])
        .unwrap();

        assert_eq!(config.variant, Variant::Pulse);
        assert_eq!(config.transitions, TransitionPolicy::Compounding);
        assert_eq!(config.particles, 10);
        assert!(!config.has_particles());
        assert!(!config.has_control_panel());
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let mut config = DemoConfig::default();
        config.particle_extent = 0.0;
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.max_pixel_ratio = -1.0;
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.particle_extent = f32::NAN;
        assert!(config.validate().is_err());

        assert!(DemoConfig::try_parse_from(["icosphere-demo", "--particles", "-5"]).is_err());
    }
}
