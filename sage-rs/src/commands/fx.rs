//! Particle effect command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use prettytable::row;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sage_fx::{
    FxParticleSystemTemplate, ParticleSystemId, ParticleSystemManager,
    ParticleSystemManagerConfig, ParticleSystemState, ParticleSystemTemplate, ParticleTemplateSet,
    Placement, TICK_DURATION,
};
use sage_state::{StateReader, StateWriter};

use crate::utils::{
    add_table_row, create_table, format_bytes, format_range, format_ticks, format_vec3,
};

#[derive(Subcommand)]
pub enum FxCommands {
    /// Show the settings of a particle template
    Info {
        /// JSON file with one template or an array of templates
        templates: PathBuf,

        /// Template to show when the file holds several
        #[arg(short, long)]
        name: Option<String>,

        /// Read templates in the flat legacy layout
        #[arg(long)]
        legacy: bool,
    },

    /// Run a template and report the particle count over time
    Simulate {
        /// JSON file with one template or an array of templates
        templates: PathBuf,

        /// Template to run when the file holds several
        #[arg(short, long)]
        name: Option<String>,

        /// Number of ticks to simulate (30 per second)
        #[arg(short, long, default_value_t = 90)]
        ticks: u32,

        /// Seed of the random stream
        #[arg(long, default_value_t = 0, env = "SAGE_FX_SEED")]
        seed: u64,

        /// Particle budget; exceeding it only logs a warning
        #[arg(long, default_value_t = 10_000)]
        max_particles: usize,

        /// Report every N ticks
        #[arg(long, default_value_t = 10)]
        every: u32,

        /// Read templates in the flat legacy layout
        #[arg(long)]
        legacy: bool,
    },

    /// Run a template and write the particle systems to a save block
    Save {
        /// JSON file with one template or an array of templates
        templates: PathBuf,

        /// Path of the save block to write
        output: PathBuf,

        /// Template to run when the file holds several
        #[arg(short, long)]
        name: Option<String>,

        /// Number of ticks to simulate before saving
        #[arg(short, long, default_value_t = 30)]
        ticks: u32,

        /// Seed of the random stream
        #[arg(long, default_value_t = 0, env = "SAGE_FX_SEED")]
        seed: u64,

        /// Read templates in the flat legacy layout
        #[arg(long)]
        legacy: bool,
    },

    /// List the particle systems stored in a save block
    Inspect {
        /// Save block written by `save`
        file: PathBuf,

        /// Templates the saved systems were created from
        #[arg(short, long)]
        templates: PathBuf,

        /// Also list every live particle
        #[arg(long)]
        particles: bool,

        /// Read templates in the flat legacy layout
        #[arg(long)]
        legacy: bool,
    },

    /// Convert legacy templates into module based templates
    ConvertLegacy {
        /// JSON file with legacy templates
        input: PathBuf,

        /// Path to write the converted JSON
        output: PathBuf,
    },
}

/// Template files hold either a single template or an array
#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateFile<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> TemplateFile<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(templates) => templates,
            Self::One(template) => vec![template],
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<TemplateFile<T>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse templates: {}", path.display()))
}

fn load_templates(path: &Path, legacy: bool) -> Result<Vec<FxParticleSystemTemplate>> {
    let templates = if legacy {
        read_json::<ParticleSystemTemplate>(path)?
            .into_vec()
            .iter()
            .map(ParticleSystemTemplate::to_fx_template)
            .collect()
    } else {
        read_json::<FxParticleSystemTemplate>(path)?.into_vec()
    };

    for template in &templates {
        template
            .validate()
            .with_context(|| format!("Invalid template '{}'", template.name))?;
    }
    log::info!("Loaded {} templates from {}", templates.len(), path.display());
    Ok(templates)
}

fn select_template(
    templates: Vec<FxParticleSystemTemplate>,
    name: Option<&str>,
) -> Result<FxParticleSystemTemplate> {
    match name {
        Some(name) => templates
            .into_iter()
            .find(|t| t.name == name)
            .with_context(|| format!("Template '{name}' not found")),
        None => templates
            .into_iter()
            .next()
            .context("Template file is empty"),
    }
}

pub fn execute(command: FxCommands) -> Result<()> {
    match command {
        FxCommands::Info {
            templates,
            name,
            legacy,
        } => execute_info(&templates, name.as_deref(), legacy),
        FxCommands::Simulate {
            templates,
            name,
            ticks,
            seed,
            max_particles,
            every,
            legacy,
        } => {
            let template = select_template(load_templates(&templates, legacy)?, name.as_deref())?;
            let config = ParticleSystemManagerConfig {
                max_particle_count: max_particles,
                seed,
            };
            execute_simulate(template, config, ticks, every.max(1))
        }
        FxCommands::Save {
            templates,
            output,
            name,
            ticks,
            seed,
            legacy,
        } => {
            let template = select_template(load_templates(&templates, legacy)?, name.as_deref())?;
            let config = ParticleSystemManagerConfig {
                seed,
                ..Default::default()
            };
            execute_save(template, config, ticks, &output)
        }
        FxCommands::Inspect {
            file,
            templates,
            particles,
            legacy,
        } => execute_inspect(&file, &templates, legacy, particles),
        FxCommands::ConvertLegacy { input, output } => execute_convert_legacy(&input, &output),
    }
}

fn execute_info(path: &Path, name: Option<&str>, legacy: bool) -> Result<()> {
    let template = select_template(load_templates(path, legacy)?, name)?;

    println!("\n{}", style("Particle Template").bold().underlined());
    println!("Name: {}", style(&template.name).cyan());
    println!("Shader: {:?}", template.shader);
    println!("Type: {:?}", template.kind);
    println!(
        "Texture: {}",
        template.particle_texture.as_deref().unwrap_or("<none>")
    );
    println!("Capacity: {}", style(template.max_particles()).green());
    if template.is_inert() {
        println!("{}", style("Inert: instances never emit").yellow());
    }

    let mut table = create_table(&["Setting", "Value"]);
    add_table_row(&mut table, vec!["Lifetime".into(), format_range(&template.lifetime)]);
    add_table_row(
        &mut table,
        vec![
            "System lifetime".into(),
            if template.system_lifetime == 0 {
                "infinite".to_string()
            } else {
                format_ticks(template.system_lifetime)
            },
        ],
    );
    add_table_row(&mut table, vec!["Burst count".into(), format_range(&template.burst_count)]);
    add_table_row(&mut table, vec!["Burst delay".into(), format_range(&template.burst_delay)]);
    add_table_row(&mut table, vec!["Initial delay".into(), format_range(&template.initial_delay)]);
    add_table_row(&mut table, vec!["Size".into(), format_range(&template.size)]);
    add_table_row(
        &mut table,
        vec![
            "Volume".into(),
            template
                .emission_volume
                .as_ref()
                .map_or("<none>".to_string(), |v| format!("{v:?}")),
        ],
    );
    add_table_row(
        &mut table,
        vec![
            "Velocity".into(),
            template
                .emission_velocity
                .as_ref()
                .map_or("<none>".to_string(), |v| format!("{v:?}")),
        ],
    );
    table.printstd();
    Ok(())
}

/// Drive a single activated system through `ticks` frames
fn run<F>(
    template: FxParticleSystemTemplate,
    config: ParticleSystemManagerConfig,
    ticks: u32,
    mut on_tick: F,
) -> Result<(ParticleSystemManager, ParticleSystemId)>
where
    F: FnMut(u32, Option<(ParticleSystemState, usize)>),
{
    let mut manager = ParticleSystemManager::new(config);
    let name = template.name.clone();
    let id = manager
        .create(Arc::new(template), Placement::default())
        .with_context(|| format!("Failed to create particle system '{name}'"))?;
    if let Some(system) = manager.get_mut(id) {
        system.activate();
    }

    for tick in 0..ticks {
        manager
            .update(TICK_DURATION * tick)
            .with_context(|| format!("Simulation of '{name}' failed at tick {}", tick + 1))?;
        let status = manager
            .get(id)
            .map(|system| (system.state(), system.particle_count()));
        on_tick(tick + 1, status);
        if status.is_none() {
            break;
        }
    }
    Ok((manager, id))
}

fn execute_simulate(
    template: FxParticleSystemTemplate,
    config: ParticleSystemManagerConfig,
    ticks: u32,
    every: u32,
) -> Result<()> {
    println!(
        "Simulating {} for {}",
        style(&template.name).cyan(),
        format_ticks(ticks)
    );

    let mut table = create_table(&["Tick", "State", "Live particles"]);
    let mut peak = 0;
    run(template, config, ticks, |tick, status| match status {
        Some((state, count)) => {
            peak = peak.max(count);
            if tick % every == 0 || tick == ticks {
                table.add_row(row![tick, format!("{state:?}"), count]);
            }
        }
        None => {
            table.add_row(row![tick, "Disposed", 0]);
        }
    })?;

    table.printstd();
    println!("Peak live particles: {}", style(peak).green());
    Ok(())
}

fn execute_save(
    template: FxParticleSystemTemplate,
    config: ParticleSystemManagerConfig,
    ticks: u32,
    output: &Path,
) -> Result<()> {
    let (mut manager, _) = run(template, config, ticks, |_, _| {})?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create file: {}", output.display()))?;
    let mut writer = StateWriter::new(BufWriter::new(file));
    manager
        .save(&mut writer)
        .with_context(|| format!("Failed to write save block: {}", output.display()))?;
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("Failed to write save block: {}", output.display()))?;

    let size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    println!(
        "Saved {} particle systems ({} live particles) to {} ({})",
        manager.len(),
        manager.particle_count(),
        style(output.display()).cyan(),
        format_bytes(size)
    );
    Ok(())
}

fn execute_inspect(path: &Path, templates: &Path, legacy: bool, particles: bool) -> Result<()> {
    let store: ParticleTemplateSet = load_templates(templates, legacy)?.into_iter().collect();

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = StateReader::new(BufReader::new(file));
    let mut manager = ParticleSystemManager::default();
    manager
        .load(&mut reader, &store)
        .with_context(|| format!("Failed to read save block: {}", path.display()))?;

    println!("\n{}", style("Particle Save Block").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Systems: {}", style(manager.len()).green());
    println!("Live particles: {}", style(manager.particle_count()).green());

    let mut table = create_table(&["Id", "Template", "State", "Timer", "Live", "Position"]);
    for (id, system) in manager.iter() {
        table.add_row(row![
            id,
            system.name(),
            format!("{:?}", system.state()),
            format_ticks(system.timer()),
            format!("{}/{}", system.particle_count(), system.capacity()),
            format_vec3(system.header().position.to_array())
        ]);
    }
    table.printstd();

    if particles {
        for (id, system) in manager.iter() {
            println!("\n{} {}", style("System").bold(), id);
            let mut table = create_table(&["Slot", "Age", "Position", "Size", "Alpha"]);
            for (slot, particle) in system.particles().iter().enumerate() {
                if particle.dead {
                    continue;
                }
                table.add_row(row![
                    slot,
                    format!("{}/{}", particle.timer, particle.lifetime),
                    format_vec3(particle.position.to_array()),
                    format!("{:.3}", particle.size),
                    format!("{:.2}", particle.alpha)
                ]);
            }
            table.printstd();
        }
    }
    Ok(())
}

fn execute_convert_legacy(input: &Path, output: &Path) -> Result<()> {
    let converted = match read_json::<ParticleSystemTemplate>(input)? {
        TemplateFile::One(template) => serde_json::to_string_pretty(&template.to_fx_template()),
        TemplateFile::Many(templates) => {
            let templates: Vec<_> = templates
                .iter()
                .map(ParticleSystemTemplate::to_fx_template)
                .collect();
            serde_json::to_string_pretty(&templates)
        }
    }
    .context("Failed to serialize converted templates")?;

    fs::write(output, converted)
        .with_context(|| format!("Failed to write file: {}", output.display()))?;
    println!(
        "Converted {} to {}",
        style(input.display()).cyan(),
        style(output.display()).green()
    );
    Ok(())
}
