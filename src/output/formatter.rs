//! Console and JSON rendering of score and ranking reports

use crate::error::Result;
use crate::output::report::{RankingReport, ReportMetadata, ScoreReport};
use crate::processing::feedback::RecommendationPriority;
use crate::processing::grade::Grade;
use crate::processing::scorer::ScoreComponent;
use clap::ValueEnum;
use colored::{Color, Colorize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
}

pub trait OutputFormatter {
    fn format_score(&self, report: &ScoreReport) -> Result<String>;
    fn format_ranking(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON output for piping into other tools
pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_grade_badge(&self, grade: Grade) -> String {
        let color = match grade {
            Grade::APlus | Grade::A => Color::Green,
            Grade::B => Color::BrightGreen,
            Grade::C => Color::Yellow,
            Grade::D => Color::Red,
            Grade::F => Color::BrightRed,
        };

        let badge = format!("[{}]", grade);
        if self.use_colors {
            badge.color(color).bold().to_string()
        } else {
            badge
        }
    }

    fn format_priority_icon(&self, priority: RecommendationPriority) -> &'static str {
        match priority {
            RecommendationPriority::High => "[*]",
            RecommendationPriority::Medium => "[-]",
            RecommendationPriority::Low => "[+]",
        }
    }

    fn score_color(score: f64) -> Color {
        if score >= 70.0 {
            Color::Green
        } else if score >= 50.0 {
            Color::Yellow
        } else {
            Color::Red
        }
    }

    fn format_metadata(&self, metadata: &ReportMetadata) -> String {
        format!(
            "Job: {} | Generated: {} | Processing time: {}ms\nSemantic model: {}\n",
            self.colorize(&metadata.job_title, Color::Cyan),
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            metadata.processing_time_ms,
            metadata.embedder.as_deref().unwrap_or("none (lexical fallback)")
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_score(&self, report: &ScoreReport) -> Result<String> {
        let score = &report.score;
        let breakdown = &score.breakdown;
        let mut output = String::new();

        output.push_str(&self.format_header("ATS SCORE REPORT", 1));
        output.push_str(&self.format_metadata(&report.metadata));
        output.push_str(&format!("Candidate: {} ({})\n", report.candidate_name, score.candidate_id));

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Overall Score: {} {}\n",
            self.colorize(&format!("{:.1}/100", breakdown.total), Self::score_color(breakdown.total)),
            self.format_grade_badge(breakdown.grade)
        ));
        output.push_str(&format!(
            "Status: {} ({})\n",
            self.colorize(&breakdown.status.to_string(), Color::Cyan),
            breakdown.status.advice()
        ));

        output.push_str(&self.format_header("Score Breakdown", 3));
        for component in ScoreComponent::ALL {
            let value = breakdown.component(component);
            let marker = if breakdown.is_degraded(component) { " (approximate)" } else { "" };
            output.push_str(&format!(
                "  {:<11} {} (weight: {:.0}%){}\n",
                component.to_string(),
                self.colorize(&format!("{:>5.1}", value), Self::score_color(value)),
                component.weight(&report.weights) * 100.0,
                marker
            ));
        }

        output.push_str(&self.format_header("Skills", 3));
        let skills = &score.skill_match;
        output.push_str(&format!(
            "  Matched {}/{} required skills\n",
            skills.matched.len(),
            skills.required_count
        ));
        if !skills.matched.is_empty() {
            output.push_str(&format!("  Matched: {}\n", self.colorize(&skills.matched.join(", "), Color::Green)));
        }
        if !skills.missing.is_empty() {
            output.push_str(&format!("  Missing: {}\n", self.colorize(&skills.missing.join(", "), Color::Red)));
        }
        if self.detailed {
            for (category, missing) in &skills.missing_by_category {
                output.push_str(&format!("    {}: {}\n", category, missing.join(", ")));
            }
            if !skills.additional.is_empty() {
                output.push_str(&format!("  Additional: {}\n", skills.additional.join(", ")));
            }
        }

        if let Some(keywords) = &score.keyword_match {
            output.push_str(&self.format_header("Keywords", 3));
            output.push_str(&format!(
                "  Coverage: {:.0}% | Density: {:.1}%\n",
                keywords.coverage * 100.0,
                keywords.keyword_density
            ));
            let limit = if self.detailed { 15 } else { 5 };
            let missing: Vec<&str> = keywords
                .missing_terms
                .iter()
                .take(limit)
                .map(|t| t.term.as_str())
                .collect();
            if !missing.is_empty() {
                output.push_str(&format!("  Top missing terms: {}\n", missing.join(", ")));
            }
        }

        if let Some(experience) = &score.experience {
            output.push_str(&self.format_header("Experience", 3));
            output.push_str(&format!(
                "  {:.1} years against {:.1} required\n",
                experience.years, experience.required_years
            ));
            if let Some(role) = &experience.best_matching_role {
                output.push_str(&format!("  Closest role: {}\n", role));
            }
            if experience.title_adjustment != 0.0 {
                output.push_str(&format!("  Title adjustment: {:+.1}\n", experience.title_adjustment));
            }
        }

        let failed: Vec<_> = score.format.failed_checks().collect();
        if !failed.is_empty() {
            output.push_str(&self.format_header("Format Issues", 3));
            for check in failed {
                output.push_str(&format!("  • {}\n", self.colorize(&check.detail, Color::Yellow)));
            }
        }

        if !report.recommendations.is_empty() {
            output.push_str(&self.format_header("Recommendations", 2));
            let shown = if self.detailed { report.recommendations.len() } else { 5 };
            for (i, rec) in report.recommendations.iter().take(shown).enumerate() {
                output.push_str(&format!(
                    "{}. {} {} {}\n",
                    i + 1,
                    self.format_priority_icon(rec.priority),
                    rec.title,
                    self.colorize(&format!("({})", rec.component), Color::BrightBlack)
                ));
                output.push_str(&format!("   {}\n", rec.detail));
            }
        }

        Ok(output)
    }

    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CANDIDATE RANKING", 1));
        output.push_str(&self.format_metadata(&report.metadata));
        output.push_str(&format!(
            "Showing {} of {} ranked candidates\n",
            report.candidates.len(),
            report.total_ranked
        ));

        output.push_str(&self.format_header("Ranking", 2));
        output.push_str(&format!(
            "  {:>4}  {:<24} {:>9} {:>7}  {}\n",
            "Rank", "Candidate", "Composite", "ATS", "Status"
        ));
        for candidate in &report.candidates {
            let breakdown = &candidate.breakdown;
            output.push_str(&format!(
                "  {:>4}  {:<24} {} {:>7.1}  {} {}\n",
                candidate.rank,
                truncate(candidate.record.display_name(), 24),
                self.colorize(&format!("{:>9.2}", candidate.composite), Self::score_color(candidate.composite)),
                breakdown.total,
                self.format_grade_badge(breakdown.grade),
                breakdown.status
            ));
            if self.detailed {
                let sub = &candidate.sub_scores;
                output.push_str(&format!(
                    "        skills {:.0} | experience {:.0} ({:.1}y) | education {:.0} ({}) | projects {:.0}\n",
                    sub.skills,
                    sub.experience,
                    candidate.experience_years,
                    sub.education,
                    candidate.education,
                    sub.projects
                ));
            }
        }

        if !report.unscored.is_empty() {
            output.push_str(&self.format_header("Unscored Candidates", 3));
            for unscored in &report.unscored {
                let id = if unscored.candidate_id.is_empty() { "<no id>" } else { unscored.candidate_id.as_str() };
                output.push_str(&format!("  • {}: {}\n", id, self.colorize(&unscored.reason, Color::Red)));
            }
        }

        if report.was_cancelled() {
            output.push_str(&format!(
                "\n{} Cancelled before scoring {} candidates\n",
                self.colorize("!", Color::Yellow),
                report.cancelled.len()
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_score(&self, report: &ScoreReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        self.to_json(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Picks the formatter for the requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
        }
    }

    pub fn score_report(&self, report: &ScoreReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_score(report)
    }

    pub fn ranking_report(&self, report: &RankingReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_ranking(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(file_path, content).await?;
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        truncated.push_str("...");
        truncated
    }
}
