use opentell_core::StatePaths;
use opentell_store::Store;
use opentell_types::{Classification, Learning};

const FENCE_START: &str = "<!-- opentell:start -->";
const FENCE_END: &str = "<!-- opentell:end -->";

fn section(title: &str, members: &[&Learning]) -> String {
    if members.is_empty() {
        return String::new();
    }
    let mut out = format!("### {title}\n");
    for l in members {
        out.push_str(&format!("- {}\n", l.text));
    }
    out.push('\n');
    out
}

/// Render the fenced promotion block (spec.md §6 "Host-persistent
/// promotion format"): header, disclaimer, then the five fixed
/// sub-headings, one bullet per promotable learning.
fn render_block(learnings: &[&Learning]) -> String {
    let thinking: Vec<&Learning> =
        learnings.iter().copied().filter(|l| l.classification == Classification::ThinkingPattern).collect();
    let design: Vec<&Learning> =
        learnings.iter().copied().filter(|l| l.classification == Classification::DesignPrinciple).collect();
    let quality: Vec<&Learning> =
        learnings.iter().copied().filter(|l| l.classification == Classification::QualityStandard).collect();
    let gaps: Vec<&Learning> =
        learnings.iter().copied().filter(|l| l.classification == Classification::BehavioralGap).collect();
    let conventions: Vec<&Learning> =
        learnings.iter().copied().filter(|l| l.classification == Classification::Preference).collect();

    let mut out = String::new();
    out.push_str(FENCE_START);
    out.push('\n');
    out.push_str("# opentell\n\n");
    out.push_str("_Learned from this project's AI coding sessions. Edits here are overwritten on the next promotion._\n\n");
    out.push_str(&section("How We Build", &thinking));
    out.push_str(&section("Architecture", &design));
    out.push_str(&section("Quality Standards", &quality));
    out.push_str(&section("Conventions", &conventions));
    out.push_str(&section("Common Gaps to Watch", &gaps));
    out.push_str(FENCE_END);
    out.push('\n');
    out
}

/// Replace any existing fenced section in `contents`, or append a new one
/// if none exists.
fn splice(contents: &str, block: &str) -> String {
    if let (Some(start), Some(end)) = (contents.find(FENCE_START), contents.find(FENCE_END)) {
        let end = end + FENCE_END.len();
        let mut out = String::new();
        out.push_str(&contents[..start]);
        out.push_str(block);
        out.push_str(contents[end..].trim_start_matches('\n'));
        out
    } else {
        let mut out = contents.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(block);
        out
    }
}

/// `promote` (spec.md §3 Lifecycles, §6): write the promotable learnings
/// into the host's project instruction file and mark them promoted.
pub fn run(paths: &StatePaths, instruction_file: &std::path::Path) -> usize {
    let mut store = Store::load(paths.clone());
    let promotable = store.get_promotable();
    if promotable.is_empty() {
        return 0;
    }

    let block = render_block(&promotable);
    let ids: Vec<_> = promotable.iter().map(|l| l.id).collect();
    let count = ids.len();

    let existing = std::fs::read_to_string(instruction_file).unwrap_or_default();
    let updated = splice(&existing, &block);

    match opentell_core::atomic::write_atomic(instruction_file, updated.as_bytes()) {
        Ok(()) => {
            store.mark_promoted(&ids);
            store.save();
            count
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to write promotion block");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_replaces_existing_fence() {
        let existing = format!("# Project\n\n{FENCE_START}\nold\n{FENCE_END}\n\nrest");
        let updated = splice(&existing, &format!("{FENCE_START}\nnew\n{FENCE_END}\n"));
        assert!(updated.contains("new"));
        assert!(!updated.contains("old"));
        assert!(updated.contains("rest"));
    }

    #[test]
    fn splice_appends_when_no_fence_present() {
        let existing = "# Project\n";
        let updated = splice(existing, &format!("{FENCE_START}\nnew\n{FENCE_END}\n"));
        assert!(updated.starts_with("# Project"));
        assert!(updated.contains("new"));
    }
}
