use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pose_coach::models::Discipline;
use pose_coach::services::{
    AnalysisPipeline, AnalysisProgress, FfmpegVideoSource, FormAnalysis, OnnxPoseModelLoader,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Video file to analyze
    video: PathBuf,

    /// Discipline (football, basketball, boxing, mma, taekwondo, american-football)
    #[arg(short, long)]
    discipline: Option<String>,

    /// Number of frames to sample
    #[arg(short, long)]
    frames: Option<usize>,

    /// Path to the ONNX pose landmark model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Directory for annotated frames, report and summary
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl AnalyzeCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = Config::load(config_path)?;

        let mut analysis_config = config.analysis.clone();
        if let Some(frames) = self.frames {
            analysis_config.frame_count = frames;
        }
        if let Some(model) = self.model {
            analysis_config.model_path = model;
        }
        if analysis_config.frame_count == 0 {
            anyhow::bail!("Frame count must be at least 1");
        }
        analysis_config.validate()?;

        let discipline = Discipline::parse(
            self.discipline
                .as_deref()
                .unwrap_or(&config.output.default_discipline),
        );
        let output_dir = self.output.unwrap_or(config.output.directory);

        if !self.video.exists() {
            anyhow::bail!("Video file not found: {}", self.video.display());
        }

        let mut source = FfmpegVideoSource::open(
            &self.video,
            &analysis_config.ffmpeg_path,
            &analysis_config.ffprobe_path,
        )
        .await
        .context("Could not read video")?;
        let loader = OnnxPoseModelLoader::new(analysis_config.model_path.clone());
        let pipeline = AnalysisPipeline::new(&analysis_config);

        let cancel = CancellationToken::new();
        let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

        let bar = progress_bar();
        let result = pipeline
            .run(&mut source, &loader, discipline, &cancel, |event| {
                update_progress(&bar, event)
            })
            .await;
        bar.finish_and_clear();

        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                ctrl_c.abort();
                eprintln!("{} {}", "✗".red(), e.user_message());
                return Err(e.into());
            }
        };

        let written = write_unless_cancelled(
            &analysis,
            &output_dir,
            config.output.write_raw_frames,
            &cancel,
        );
        ctrl_c.abort();
        let written = written?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analysis.report())?);
            return Ok(());
        }

        print_analysis(&analysis);
        println!();
        println!(
            "{} Wrote {} files to {}",
            "✓".green(),
            written.len(),
            output_dir.display()
        );

        Ok(())
    }
}

/// Cancel the analysis on the first Ctrl-C and exit on the second
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!("Interrupted, cancelling analysis (press Ctrl-C again to exit)");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}

/// Write outputs unless the run was interrupted, and report an interrupt
/// that arrived while writing
fn write_unless_cancelled(
    analysis: &FormAnalysis,
    dir: &Path,
    write_raw_frames: bool,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    if cancel.is_cancelled() {
        anyhow::bail!("Analysis cancelled, no output written");
    }
    let written = write_outputs(analysis, dir, write_raw_frames)?;
    if cancel.is_cancelled() {
        anyhow::bail!("Analysis cancelled while writing to {}", dir.display());
    }
    Ok(written)
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn update_progress(bar: &ProgressBar, event: AnalysisProgress) {
    match event {
        AnalysisProgress::ExtractingFrames { count } => {
            bar.set_length(count as u64);
            bar.set_message("Extracting frames");
        }
        AnalysisProgress::LoadingModel => bar.set_message("Loading pose model"),
        AnalysisProgress::DetectingPoses { current, total } => {
            bar.set_message("Detecting poses");
            bar.set_length(total as u64);
            bar.set_position(current as u64);
        }
        AnalysisProgress::Annotating => bar.set_message("Drawing skeletons"),
        AnalysisProgress::Summarizing => bar.set_message("Summarizing"),
    }
}

fn print_analysis(analysis: &FormAnalysis) {
    println!(
        "{} {}",
        "Form analysis".bold(),
        analysis.session_id.to_string().dimmed()
    );
    println!(
        "Discipline: {}  Frames: {}  Poses: {}",
        analysis.discipline.display_name(),
        analysis.frames.len(),
        analysis.pose_data.len()
    );

    for warning in &analysis.warnings {
        println!("{} {}", "⚠".yellow(), warning.yellow());
    }

    println!();
    println!("{}", analysis.summary);
}

/// Write annotated frames, the JSON report and the summary text into `dir`
pub fn write_outputs(
    analysis: &FormAnalysis,
    dir: &Path,
    write_raw_frames: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let mut written = Vec::new();

    for frame in &analysis.annotated_frames {
        let path = dir.join(format!("frame_{:02}.png", frame.frame_number));
        frame
            .image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if write_raw_frames {
        for frame in &analysis.frames {
            let path = dir.join(format!("raw_frame_{:02}.png", frame.frame_number));
            frame
                .image
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
    }

    let report_path = dir.join("report.json");
    let report = serde_json::to_string_pretty(&analysis.report())?;
    fs::write(&report_path, report).context("Failed to write report")?;
    written.push(report_path);

    let summary_path = dir.join("summary.txt");
    fs::write(&summary_path, &analysis.summary).context("Failed to write summary")?;
    written.push(summary_path);

    tracing::info!("Wrote {} output files to {}", written.len(), dir.display());
    Ok(written)
}
