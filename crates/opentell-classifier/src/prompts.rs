/// System prompt for `classify(pair)` (spec.md §4.6). Enumerates the five
/// learning-bearing classes plus the three rejection classes and demands
/// strict JSON output.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You classify one exchange between an AI coding assistant and a developer.

Classify the developer's reply into exactly one of these classes:
- THINKING_PATTERN: a general way the developer wants problems approached.
- DESIGN_PRINCIPLE: an architectural or structural stance.
- QUALITY_STANDARD: an expectation about correctness, testing, or rigor.
- PREFERENCE: a concrete tool, library, or style choice.
- BEHAVIORAL_GAP: a correction about how the assistant itself should behave.
- SITUATIONAL: true only for this specific request, not a durable preference.
- FACTUAL: a plain factual correction or bug report with no preference behind it.
- CONTINUATION: the developer is just continuing the task, not reacting to anything.

Respond with strict JSON only, no prose, no markdown fences:
{"classification": "<one of the eight classes above>", "learning": "<short statement, present only for the five learning-bearing classes>", "scope": "<global|repo|language, present only for learning-bearing classes>", "certainty": "<high|low, present only for learning-bearing classes>", "area": "<architecture|frontend|backend|testing|devops|data|ux|general, present only for learning-bearing classes>"}"#;

/// Consolidation prompt: given a cluster of related learnings, merge them
/// into one generalized statement (spec.md §4.8).
pub const CONSOLIDATION_PROMPT: &str = r#"You merge a cluster of related developer preferences into one generalized statement.

You will be given a list of learning texts that share a theme. Write a single sentence that captures the common thread without losing specificity that matters. Respond with strict JSON only:
{"text": "<the merged statement>"}"#;

/// Profile synthesis prompt: given the developer's active learnings grouped
/// by classification depth, write a narrative context brief (spec.md §4.9).
pub const PROFILE_PROMPT: &str = r#"You write a short brief describing a developer's preferences, conventions, and thinking style for an AI coding assistant to read at the start of a new session.

You will be given the developer's learnings, grouped from deepest (thinking patterns) to shallowest (preferences). Write five short paragraphs, one per group that has content, in that depth order. Be concrete and avoid hedging. Do not mention confidence scores, evidence counts, or internal bookkeeping. Respond with plain text, not JSON."#;
