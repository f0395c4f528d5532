use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pose_coach::models::Discipline;
use serde::Serialize;

#[derive(Args)]
pub struct DisciplinesCommand {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DisciplineInfo {
    identifier: &'static str,
    name: &'static str,
    key_joints: Vec<&'static str>,
}

impl DisciplinesCommand {
    pub fn execute(self) -> Result<()> {
        let infos: Vec<DisciplineInfo> = Discipline::KNOWN
            .iter()
            .chain(std::iter::once(&Discipline::Generic))
            .map(|d| DisciplineInfo {
                identifier: d.identifier(),
                name: d.display_name(),
                key_joints: d.key_joints().iter().map(|lm| lm.name()).collect(),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&infos)?);
            return Ok(());
        }

        println!("{}", "Disciplines".bold());
        println!();
        for info in &infos {
            println!("  {} {}", format!("{:<18}", info.identifier).cyan(), info.name);
            if info.key_joints.is_empty() {
                println!("  {:<18} key joints: none", "");
            } else {
                println!("  {:<18} key joints: {}", "", info.key_joints.join(", "));
            }
        }
        println!();
        println!("Unknown identifiers fall back to {}.", "generic".cyan());

        Ok(())
    }
}
