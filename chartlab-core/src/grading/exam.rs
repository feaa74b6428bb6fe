//! Exam catalog: exam types, their sections, and what each section grades.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    #[error("unknown exam type '{0}'")]
    UnknownExamType(String),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("section '{section}' does not belong to exam type '{exam_type}'")]
    SectionMismatch { exam_type: ExamType, section: Section },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    #[serde(alias = "swing-analysis")]
    SwingAnalysis,
    #[serde(alias = "fibonacci-retracement")]
    FibonacciRetracement,
    #[serde(alias = "gap-analysis")]
    GapAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[serde(alias = "swing-points")]
    SwingPoints,
    #[serde(alias = "equal-levels")]
    EqualLevels,
    #[serde(alias = "impulse-waves")]
    ImpulseWaves,
    #[serde(alias = "retracement-levels")]
    RetracementLevels,
    #[serde(alias = "fair-value-gaps")]
    FairValueGaps,
    #[serde(alias = "price-gaps")]
    PriceGaps,
}

/// Which annotation kind a section grades and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Swing points: domain-space detection, or pixel-space answer key.
    SwingPoints,
    /// Lines against an answer key.
    Lines,
    /// Boxes against an answer key.
    Boxes,
    /// Retracement drawings against a detected trend anchor.
    Fibonacci,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Static description of an exam type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExamInfo {
    pub exam_type: ExamType,
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub sections: &'static [Section],
    pub tools_required: &'static [&'static str],
}

const CATALOG: [ExamInfo; 3] = [
    ExamInfo {
        exam_type: ExamType::SwingAnalysis,
        title: "Swing Analysis Exam",
        description: "Learn to identify swing highs and lows, and mark equal price levels.",
        difficulty: Difficulty::Beginner,
        sections: &[Section::SwingPoints, Section::EqualLevels],
        tools_required: &["line tool", "pointer tool"],
    },
    ExamInfo {
        exam_type: ExamType::FibonacciRetracement,
        title: "Fibonacci Retracement Exam",
        description: "Practice applying Fibonacci retracement tools to identify support/resistance.",
        difficulty: Difficulty::Intermediate,
        sections: &[Section::ImpulseWaves, Section::RetracementLevels],
        tools_required: &["fibonacci tool", "line tool"],
    },
    ExamInfo {
        exam_type: ExamType::GapAnalysis,
        title: "Gap Analysis & FVG Exam",
        description: "Learn to identify gaps and fair value gaps in price charts.",
        difficulty: Difficulty::Advanced,
        sections: &[Section::PriceGaps, Section::FairValueGaps],
        tools_required: &["box tool", "line tool"],
    },
];

/// Every exam type, in presentation order.
pub fn catalog() -> &'static [ExamInfo] {
    &CATALOG
}

impl ExamType {
    pub fn all() -> [ExamType; 3] {
        [ExamType::SwingAnalysis, ExamType::FibonacciRetracement, ExamType::GapAnalysis]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ExamType::SwingAnalysis => "swing_analysis",
            ExamType::FibonacciRetracement => "fibonacci_retracement",
            ExamType::GapAnalysis => "gap_analysis",
        }
    }

    pub fn info(&self) -> &'static ExamInfo {
        match self {
            ExamType::SwingAnalysis => &CATALOG[0],
            ExamType::FibonacciRetracement => &CATALOG[1],
            ExamType::GapAnalysis => &CATALOG[2],
        }
    }

    pub fn sections(&self) -> &'static [Section] {
        self.info().sections
    }

    /// Rejects a section that belongs to a different exam type.
    pub fn check_section(&self, section: Section) -> Result<(), ExamError> {
        if section.exam_type() == *self {
            Ok(())
        } else {
            Err(ExamError::SectionMismatch {
                exam_type: *self,
                section,
            })
        }
    }
}

impl Section {
    pub fn tag(&self) -> &'static str {
        match self {
            Section::SwingPoints => "swing_points",
            Section::EqualLevels => "equal_levels",
            Section::ImpulseWaves => "impulse_waves",
            Section::RetracementLevels => "retracement_levels",
            Section::FairValueGaps => "fair_value_gaps",
            Section::PriceGaps => "price_gaps",
        }
    }

    pub fn exam_type(&self) -> ExamType {
        match self {
            Section::SwingPoints | Section::EqualLevels => ExamType::SwingAnalysis,
            Section::ImpulseWaves | Section::RetracementLevels => ExamType::FibonacciRetracement,
            Section::FairValueGaps | Section::PriceGaps => ExamType::GapAnalysis,
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Section::SwingPoints => SectionKind::SwingPoints,
            Section::EqualLevels => SectionKind::Lines,
            Section::ImpulseWaves | Section::RetracementLevels => SectionKind::Fibonacci,
            Section::FairValueGaps | Section::PriceGaps => SectionKind::Boxes,
        }
    }

    /// Default instruction shown with a practice chart.
    pub fn instruction(&self) -> String {
        format!("Identify the {} in this chart.", self.tag().replace('_', " "))
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for ExamType {
    type Err = ExamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize(s);
        ExamType::all()
            .into_iter()
            .find(|t| t.tag() == tag)
            .ok_or_else(|| ExamError::UnknownExamType(s.to_string()))
    }
}

impl FromStr for Section {
    type Err = ExamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize(s);
        CATALOG
            .iter()
            .flat_map(|info| info.sections.iter().copied())
            .find(|section| section.tag() == tag)
            .ok_or_else(|| ExamError::UnknownSection(s.to_string()))
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
