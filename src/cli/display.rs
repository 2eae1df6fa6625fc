//! Terminal display
//!
//! Features:
//! - One line per frame: phase, angles, warning level
//! - Feedback messages colored by warning level
//! - Escalation alerts and the end-of-session summary

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{stdout, Write};

use crate::error::Result;
use crate::exercise::{ExerciseCatalog, ExerciseProfile};
use crate::session::{FrameReport, SessionSummary, WarningLevel};

fn level_color(level: WarningLevel) -> Color {
    match level.value() {
        0 => Color::Green,
        1 => Color::Yellow,
        2 => Color::DarkYellow,
        3 => Color::Red,
        _ => Color::Magenta,
    }
}

fn score_color(score: f64) -> Color {
    if score > 80.0 {
        Color::Green
    } else if score > 60.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Terminal display manager
pub struct Display {
    /// Print feedback lines under each frame
    show_feedback: bool,
    /// Line ending; raw mode needs an explicit carriage return
    eol: &'static str,
}

impl Display {
    pub fn new(show_feedback: bool) -> Self {
        Display {
            show_feedback,
            eol: "\n",
        }
    }

    /// Switch line endings for a terminal in raw mode
    pub fn raw_mode(mut self, raw: bool) -> Self {
        self.eol = if raw { "\r\n" } else { "\n" };
        self
    }

    /// List the exercises a catalog offers
    pub fn show_exercises(&self, catalog: &ExerciseCatalog) -> Result<()> {
        let mut stdout = stdout();
        for id in catalog.ids() {
            let profile = catalog.get(id)?;
            execute!(
                stdout,
                SetForegroundColor(Color::Cyan),
                Print(format!("{:<20}", profile.id)),
                ResetColor,
                Print(format!("{} - {}{}", profile.name, profile.description, self.eol)),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Session banner with the safe ranges in use
    pub fn show_header(&self, profile: &ExerciseProfile, interactive: bool) -> Result<()> {
        let mut stdout = stdout();

        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("Starting session: {}{}", profile.name, self.eol)),
            ResetColor,
        )?;

        for (angle, range) in profile.angle_ranges.iter() {
            execute!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print(format!(
                    "  {:<28} safe {:.0}-{:.0}°{}",
                    angle, range.min, range.max, self.eol
                )),
                ResetColor,
            )?;
        }

        if interactive {
            execute!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print("Press q or Esc to end the session"),
                Print(self.eol),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Render one processed frame
    pub fn show_frame(&self, report: &FrameReport) -> Result<()> {
        let mut stdout = stdout();

        let angles = report
            .angles
            .iter()
            .map(|(angle, value)| format!("{} {:.1}", angle, value))
            .collect::<Vec<_>>()
            .join("  ");

        execute!(
            stdout,
            Print(format!("Frame {:>4} ", report.frame_number)),
            SetForegroundColor(Color::Blue),
            Print(format!(
                "{:<7} hold {:>3}  ",
                report.phase.phase, report.phase.hold_frame_count
            )),
            ResetColor,
            Print(angles),
            Print("  "),
            SetForegroundColor(level_color(report.warning_level)),
            Print(format!("[{}]{}", report.warning_level.text(), self.eol)),
            ResetColor,
        )?;

        if self.show_feedback {
            for message in &report.feedback {
                execute!(stdout, Print(format!("      - {}{}", message, self.eol)))?;
            }
        }

        for violation in &report.new_violations {
            execute!(
                stdout,
                SetForegroundColor(level_color(violation.escalation_level)),
                Print(format!("      ! {}{}", violation, self.eol)),
                ResetColor,
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// End-of-session report
    pub fn show_summary(&self, summary: &SessionSummary) -> Result<()> {
        let mut stdout = stdout();
        let safety = &summary.safety;

        execute!(
            stdout,
            SetForegroundColor(Color::Blue),
            Print("─".repeat(50)),
            Print(self.eol),
            ResetColor,
            Print(format!("Session Summary: {}{}", summary.exercise, self.eol)),
            Print(format!(
                "Frames: {}  |  Safe frames: {}  |  Score: ",
                summary.total_frames, summary.safe_frames
            )),
            SetForegroundColor(score_color(summary.score)),
            Print(format!("{:.2}{}", summary.score, self.eol)),
            ResetColor,
            Print(format!(
                "Violations: {} (low {}, medium {}, high {}, critical {}){}",
                safety.total_violations,
                safety.by_severity.low,
                safety.by_severity.medium,
                safety.by_severity.high,
                safety.by_severity.critical,
                self.eol
            )),
        )?;

        for (angle, count) in safety.by_angle.iter() {
            execute!(
                stdout,
                Print(format!("  {:<28} {}{}", angle, count, self.eol))
            )?;
        }

        execute!(
            stdout,
            Print("Highest warning: "),
            SetForegroundColor(level_color(safety.highest_warning_level)),
            Print(format!(
                "{} ({}){}",
                safety.highest_warning_level,
                safety.highest_warning_level.text(),
                self.eol
            )),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Summary as pretty JSON for other tools
    pub fn show_summary_json(&self, summary: &SessionSummary) -> Result<()> {
        let mut stdout = stdout();
        writeln!(stdout, "{}", serde_json::to_string_pretty(summary)?)?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_colors_escalate() {
        assert_eq!(level_color(WarningLevel::SAFE), Color::Green);
        assert_eq!(level_color(WarningLevel::HIGH), Color::Red);
        assert_eq!(level_color(WarningLevel::CRITICAL), Color::Magenta);
        assert_eq!(score_color(92.5), Color::Green);
        assert_eq!(score_color(40.0), Color::Red);
    }
}
