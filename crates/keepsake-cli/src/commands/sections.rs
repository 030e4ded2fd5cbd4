use anyhow::Result;

use keepsake_core::effects::EffectParams;
use keepsake_core::{AppConfig, SectionRegistry};

pub fn run(config: &AppConfig) -> Result<()> {
    let registry = SectionRegistry::standard(&config.effects);

    println!("Sections ({}):\n", registry.len());

    for (i, section) in registry.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, section.id.label(), section.id);
        if section.effects.is_empty() {
            println!("    no entry effects");
        }
        for spec in &section.effects {
            let detail = match &spec.params {
                EffectParams::Particles(p) => format!(
                    "{} units, every {} ms for {} ms, {} colours",
                    p.container,
                    p.interval_ms,
                    p.duration_ms,
                    p.palette.len()
                ),
                EffectParams::Typewriter(p) => {
                    format!("{} text, {} ms per char", p.anchor, p.char_delay_ms)
                }
                EffectParams::Stagger(p) => {
                    format!("{} children, {} ms apart", p.selector, p.stagger_ms)
                }
            };
            println!("    - {} +{} ms: {}", spec.kind(), spec.entry_delay_ms, detail);
        }
    }

    let timeline = &config.timeline;
    println!("\nOpening (ms after begin):");
    for (stage, offset) in timeline.stages() {
        println!("  {:>6}  {}", offset, stage);
    }

    Ok(())
}
