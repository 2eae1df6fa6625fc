use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "physio-coach")]
#[command(about = "Real-time form feedback and safety escalation for physiotherapy exercises")]
pub struct Args {
    /// Exercise to run (arm_raise, shoulder_rotation, elbow_flexion, or one from --profiles)
    #[arg(short, long, default_value = "arm_raise")]
    pub exercise: String,

    /// Number of frames to simulate
    #[arg(short, long, default_value = "120")]
    pub frames: u64,

    /// JSON file with custom exercise profiles
    #[arg(short, long)]
    pub profiles: Option<PathBuf>,

    /// Seed for the simulated angle stream
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Jitter multiplier for simulated angles (0 for a clean trajectory)
    #[arg(short, long, default_value = "1.0")]
    pub noise: f64,

    /// Delay between frames in milliseconds
    #[arg(long, default_value = "100")]
    pub delay_ms: u64,

    /// Clear violation streaks whenever an angle reads safe
    #[arg(long)]
    pub reset_on_safe: bool,

    /// Poll the keyboard between frames (q or Esc ends the session)
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the session summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide per-frame feedback lines
    #[arg(short, long)]
    pub quiet: bool,

    /// List available exercises and exit
    #[arg(short, long)]
    pub list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
