use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use opentell_types::{Area, Classification};

/// A single regex-backed extraction rule, mirroring the teacher's `Lens`
/// closure-table idiom: a fixed matcher plus an extractor closure, scored
/// with static metadata rather than a computed score.
pub struct PatternRule {
    pub family: &'static str,
    regex: Regex,
    extractor: Box<dyn Fn(&Captures) -> Option<String> + Send + Sync>,
    pub classification: Classification,
    pub area: Area,
    pub confidence: f64,
}

impl PatternRule {
    fn new(
        family: &'static str,
        pattern: &str,
        classification: Classification,
        area: Area,
        confidence: f64,
        extractor: impl Fn(&Captures) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            family,
            regex: Regex::new(pattern).expect("pattern rule regex must compile"),
            extractor: Box::new(extractor),
            classification,
            area,
            confidence,
        }
    }

    /// Try the rule against `text`, returning the extracted learning text.
    pub fn apply(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let extracted = (self.extractor)(&caps)?;
        let trimmed = extracted.trim().trim_end_matches(['.', ',', '!', ';']);
        if trimmed.len() < 2 || trimmed.len() > 150 {
            return None;
        }
        Some(trimmed.to_string())
    }
}

fn capture(caps: &Captures, group: usize) -> Option<String> {
    caps.get(group).map(|m| m.as_str().trim().to_string())
}

fn prefers(caps: &Captures, group: usize) -> Option<String> {
    Some(format!("Prefers {}", capture(caps, group)?))
}

fn avoids(caps: &Captures, group: usize) -> Option<String> {
    Some(format!("Avoids {}", capture(caps, group)?))
}

fn uses(caps: &Captures, group: usize) -> Option<String> {
    Some(format!("Uses {}", capture(caps, group)?))
}

/// Corrections (starting 0.35, PREFERENCE): direct developer corrections
/// to something the assistant just did or proposed.
pub static CORRECTIONS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "corrections",
            r"(?i)no,?\s+use\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| prefers(c, 1),
        ),
        PatternRule::new(
            "corrections",
            r"(?i)actually,?\s+use\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| prefers(c, 1),
        ),
        PatternRule::new(
            "corrections",
            r"(?i)use\s+(.+?)\s+instead",
            Classification::Preference,
            Area::General,
            0.35,
            |c| prefers(c, 1),
        ),
        PatternRule::new(
            "corrections",
            r"(?i)^(.{2,40})\s+not\s+(.{2,40})$",
            Classification::Preference,
            Area::General,
            0.35,
            |c| prefers(c, 1),
        ),
        PatternRule::new(
            "corrections",
            r"(?i)don'?t\s+use\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| avoids(c, 1),
        ),
        PatternRule::new(
            "corrections",
            r"(?i)change\s+(?:it\s+)?to\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| prefers(c, 1),
        ),
        PatternRule::new(
            "corrections",
            r"(?i)(?:it\s+)?should\s+be\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| prefers(c, 1),
        ),
    ]
});

/// Conventions (0.35): declared team/project norms.
pub static CONVENTIONS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "conventions",
            r"(?i)(?:we|our team)\s+use\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| uses(c, 1),
        ),
        PatternRule::new(
            "conventions",
            r"(?i)I\s+(?:always|usually)\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| Some(format!("Usually {}", capture(c, 1)?)),
        ),
        PatternRule::new(
            "conventions",
            r"(?i)in\s+this\s+project,?\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| uses(c, 1),
        ),
        PatternRule::new(
            "conventions",
            r"(?i)put\s+(.+?)\s+in\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| Some(format!("Puts {} in {}", capture(c, 1)?, capture(c, 2)?)),
        ),
        PatternRule::new(
            "conventions",
            r"(?i)follow(?:s)?\s+convention\s+(.+)",
            Classification::Preference,
            Area::General,
            0.35,
            |c| uses(c, 1),
        ),
    ]
});

/// Style (0.35): stylistic preferences about the assistant's own output.
pub static STYLE: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "style",
            r"(?i)\b(?:be|keep it|keep things)\s+concise\b",
            Classification::Preference,
            Area::General,
            0.35,
            |_| Some("Prefers concise responses".to_string()),
        ),
        PatternRule::new(
            "style",
            r"(?i)\bcode[- ]first\b",
            Classification::Preference,
            Area::General,
            0.35,
            |_| Some("Prefers code-first responses".to_string()),
        ),
        PatternRule::new(
            "style",
            r"(?i)\b(?:more|explain)\s+(?:explanation|context)\b",
            Classification::Preference,
            Area::General,
            0.35,
            |_| Some("Prefers more explanation".to_string()),
        ),
        PatternRule::new(
            "style",
            r"(?i)\b(?:no|stop|fewer)\s+comments\b",
            Classification::Preference,
            Area::General,
            0.35,
            |_| Some("Avoids code comments".to_string()),
        ),
        PatternRule::new(
            "style",
            r"(?i)\b(?:more|add)\s+comments\b",
            Classification::Preference,
            Area::General,
            0.35,
            |_| Some("Prefers more code comments".to_string()),
        ),
        PatternRule::new(
            "style",
            r"(?i)\bstrict(?:ly)?\s+typ(?:ed|ing)\b",
            Classification::Preference,
            Area::General,
            0.35,
            |_| Some("Prefers strict typing".to_string()),
        ),
    ]
});

/// Thinking (0.38, THINKING_PATTERN): how the developer wants problems
/// approached.
pub static THINKING: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "thinking",
            r"(?i)keep\s+(?:it|things)\s+simple",
            Classification::ThinkingPattern,
            Area::General,
            0.38,
            |_| Some("Keeps things simple".to_string()),
        ),
        PatternRule::new(
            "thinking",
            r"(?i)think\s+about\s+scale",
            Classification::ThinkingPattern,
            Area::Architecture,
            0.38,
            |_| Some("Thinks about scale upfront".to_string()),
        ),
        PatternRule::new(
            "thinking",
            r"(?i)prototype\s+first",
            Classification::ThinkingPattern,
            Area::General,
            0.38,
            |_| Some("Prototypes first".to_string()),
        ),
        PatternRule::new(
            "thinking",
            r"(?i)(?:start|think)\s+(?:with|about)\s+(?:the\s+)?data",
            Classification::ThinkingPattern,
            Area::Data,
            0.38,
            |_| Some("Thinks data-first".to_string()),
        ),
        PatternRule::new(
            "thinking",
            r"(?i)(?:from\s+)?(?:the\s+)?user'?s?\s+perspective",
            Classification::ThinkingPattern,
            Area::Ux,
            0.38,
            |_| Some("Thinks from the user's perspective".to_string()),
        ),
    ]
});

/// Design (0.38, DESIGN_PRINCIPLE): architectural stances.
pub static DESIGN: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "design",
            r"(?i)separate(?:s)?\s+concerns",
            Classification::DesignPrinciple,
            Area::Architecture,
            0.38,
            |_| Some("Separates concerns".to_string()),
        ),
        PatternRule::new(
            "design",
            r"(?i)single\s+responsibilit",
            Classification::DesignPrinciple,
            Area::Architecture,
            0.38,
            |_| Some("Favors single responsibility".to_string()),
        ),
        PatternRule::new(
            "design",
            r"(?i)don'?t\s+hardcode",
            Classification::DesignPrinciple,
            Area::General,
            0.38,
            |_| Some("Avoids hardcoding".to_string()),
        ),
        PatternRule::new(
            "design",
            r"(?i)\bDRY\b|don'?t\s+repeat\s+yourself",
            Classification::DesignPrinciple,
            Area::General,
            0.38,
            |_| Some("Avoids repeating code".to_string()),
        ),
    ]
});

/// Quality (0.35, QUALITY_STANDARD): expected engineering rigor.
pub static QUALITY: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "quality",
            r"(?i)(?:handle|check)\s+errors?",
            Classification::QualityStandard,
            Area::General,
            0.35,
            |_| Some("Expects errors to be handled".to_string()),
        ),
        PatternRule::new(
            "quality",
            r"(?i)(?:add|needs?|write)\s+tests?",
            Classification::QualityStandard,
            Area::Testing,
            0.35,
            |_| Some("Expects tests".to_string()),
        ),
        PatternRule::new(
            "quality",
            r"(?i)accessib(?:le|ility)",
            Classification::QualityStandard,
            Area::Ux,
            0.35,
            |_| Some("Expects accessible UI".to_string()),
        ),
        PatternRule::new(
            "quality",
            r"(?i)(?:add|needs?)\s+logging",
            Classification::QualityStandard,
            Area::Devops,
            0.35,
            |_| Some("Expects logging".to_string()),
        ),
        PatternRule::new(
            "quality",
            r"(?i)validate\s+input",
            Classification::QualityStandard,
            Area::Backend,
            0.35,
            |_| Some("Expects input validation".to_string()),
        ),
    ]
});

/// Tool (0.35, PREFERENCE): named tool-category preferences, with the
/// canonical tool name extracted from the match.
pub static TOOL: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            "tool",
            r"(?i)\b(?:use|prefers?)\s+(pnpm|npm|yarn|bun)\b",
            Classification::Preference,
            Area::General,
            0.35,
            |c| uses(c, 1),
        ),
        PatternRule::new(
            "tool",
            r"(?i)\b(?:use|prefers?)\s+(vitest|jest|mocha|pytest)\b",
            Classification::Preference,
            Area::Testing,
            0.35,
            |c| uses(c, 1),
        ),
        PatternRule::new(
            "tool",
            r"(?i)\b(?:use|prefers?)\s+(eslint|prettier|ruff|clippy|rustfmt)\b",
            Classification::Preference,
            Area::General,
            0.35,
            |c| uses(c, 1),
        ),
        PatternRule::new(
            "tool",
            r"(?i)\b(?:use|prefers?)\s+(react|vue|svelte|next\.?js|tailwind)\b",
            Classification::Preference,
            Area::Frontend,
            0.35,
            |c| uses(c, 1),
        ),
        PatternRule::new(
            "tool",
            r"(?i)\b(?:use|prefers?)\s+(postgres(?:ql)?|sqlite|mysql|mongodb|redis)\b",
            Classification::Preference,
            Area::Data,
            0.35,
            |c| uses(c, 1),
        ),
    ]
});

/// All families, in the order spec.md lists them.
pub fn all_rules() -> Vec<&'static Lazy<Vec<PatternRule>>> {
    vec![
        &CORRECTIONS,
        &CONVENTIONS,
        &STYLE,
        &THINKING,
        &DESIGN,
        &QUALITY,
        &TOOL,
    ]
}
