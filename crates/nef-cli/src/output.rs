//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use nef_domain::sequence::{count_residues, frame_to_chains, NEF_MOLECULAR_SYSTEM};
use nef_domain::{Entry, SaveFrame};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Summary of one save frame for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    /// Frame name
    pub name: String,
    /// Frame category
    pub category: String,
    /// Categories of the frame's loops
    pub loops: Vec<String>,
    /// Total rows across all loops
    pub rows: usize,
    /// Chains of a molecular system frame, empty for other frames
    pub chains: Vec<ChainSummary>,
}

/// Residue count of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    /// Chain code
    pub chain_code: String,
    /// Residues in the chain
    pub residues: usize,
}

impl FrameSummary {
    /// Summarize a frame.
    pub fn of(frame: &SaveFrame) -> Self {
        Self {
            name: frame.name().to_string(),
            category: frame.category().to_string(),
            loops: frame.loops().iter().map(|lp| lp.category().to_string()).collect(),
            rows: frame.loops().iter().map(|lp| lp.len()).sum(),
            chains: Self::chains_of(frame),
        }
    }

    fn chains_of(frame: &SaveFrame) -> Vec<ChainSummary> {
        if frame.category() != NEF_MOLECULAR_SYSTEM {
            return Vec::new();
        }
        frame_to_chains(frame)
            .into_iter()
            .map(|chain_code| ChainSummary {
                residues: count_residues(frame, &chain_code).values().sum(),
                chain_code,
            })
            .collect()
    }

    /// Summarize every frame of an entry in document order.
    pub fn of_entry(entry: &Entry) -> Vec<Self> {
        entry.frames().iter().map(Self::of).collect()
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Format a frame listing.
    pub fn format_frames(&self, entry_id: &str, frames: &[FrameSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_frames_json(entry_id, frames),
            OutputFormat::Table => Ok(self.format_frames_table(entry_id, frames)),
            OutputFormat::Quiet => Ok(Self::format_frames_quiet(frames)),
        }
    }

    fn format_frames_json(&self, entry_id: &str, frames: &[FrameSummary]) -> Result<String> {
        let listing = serde_json::json!({
            "entry": entry_id,
            "frames": frames,
        });
        Ok(serde_json::to_string_pretty(&listing)?)
    }

    fn format_frames_table(&self, entry_id: &str, frames: &[FrameSummary]) -> String {
        let title = self.colorize(&format!("entry {entry_id}"), "cyan");
        if frames.is_empty() {
            return format!("{title}\n{}", self.colorize("No frames found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Name", "Category", "Loops", "Rows", "Chains"]);

        for frame in frames {
            let chains: Vec<String> = frame
                .chains
                .iter()
                .map(|chain| format!("{} ({})", chain.chain_code, chain.residues))
                .collect();
            builder.push_record([
                frame.name.clone(),
                frame.category.clone(),
                frame.loops.join(", "),
                frame.rows.to_string(),
                chains.join(", "),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{title}\n{table}")
    }

    fn format_frames_quiet(frames: &[FrameSummary]) -> String {
        let names: Vec<&str> = frames.iter().map(|f| f.name.as_str()).collect();
        names.join("\n")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "cyan" => text.cyan().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nef_domain::Loop;

    fn create_test_frames() -> Vec<FrameSummary> {
        let mut frame = SaveFrame::from_scratch("nef_molecular_system", "nef_molecular_system");
        let mut lp = Loop::from_scratch("nef_sequence");
        lp.add_tags(["index", "chain_code", "residue_name"]).unwrap();
        lp.add_row(vec!["1".into(), "A".into(), "ALA".into()]).unwrap();
        lp.add_row(vec!["2".into(), "A".into(), "GLY".into()]).unwrap();
        lp.add_row(vec!["3".into(), "B".into(), "GLY".into()]).unwrap();
        frame.add_loop(lp);
        vec![FrameSummary::of(&frame)]
    }

    #[test]
    fn test_summary() {
        let frames = create_test_frames();
        assert_eq!(frames[0].name, "nef_molecular_system");
        assert_eq!(frames[0].loops, vec!["nef_sequence"]);
        assert_eq!(frames[0].rows, 3);
        assert_eq!(
            frames[0].chains,
            vec![
                ChainSummary {
                    chain_code: "A".to_string(),
                    residues: 2
                },
                ChainSummary {
                    chain_code: "B".to_string(),
                    residues: 1
                },
            ]
        );
    }

    #[test]
    fn test_other_frames_have_no_chains() {
        let frame = SaveFrame::from_scratch("nef_nmr_meta_data", "nef_nmr_meta_data");
        assert!(FrameSummary::of(&frame).chains.is_empty());
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_frames("test", &create_test_frames()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["entry"], "test");
        assert_eq!(value["frames"][0]["category"], "nef_molecular_system");
        assert_eq!(value["frames"][0]["rows"], 3);
        assert_eq!(value["frames"][0]["chains"][1]["chain_code"], "B");
        assert_eq!(value["frames"][0]["chains"][1]["residues"], 1);
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_frames("test", &create_test_frames()).unwrap();
        assert_eq!(output, "nef_molecular_system");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_frames("test", &create_test_frames()).unwrap();
        assert!(output.starts_with("entry test\n"));
        assert!(output.contains("Category"));
        assert!(output.contains("nef_sequence"));
        assert!(output.contains("A (2), B (1)"));
    }

    #[test]
    fn test_empty_frames() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_frames("test", &[]).unwrap();
        assert!(output.contains("No frames found"));
    }
}
