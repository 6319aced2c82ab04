//! Run-splitting text replacement.
//!
//! A match that sits inside one run is replaced by splitting that run into
//! literal and replacement pieces, each keeping the run's formatting. A match
//! that only exists across run boundaries cannot be split this way; the
//! contiguous runs holding it are then rewritten as one plain run carrying
//! the substituted text.

use super::rules::ReplacementRule;
use crate::model::RunSequence;

/// Replace every occurrence of `old` with `new` in a paragraph.
///
/// Returns `true` if the paragraph was modified.
pub fn replace<P: RunSequence + ?Sized>(paragraph: &mut P, old: &str, new: &str) -> bool {
    replace_occurrences(paragraph, old, new) > 0
}

/// Replace every occurrence of `old` with `new` in a paragraph and return
/// how many occurrences were replaced.
///
/// Runs are scanned once, left to right. Runs created by a split are never
/// re-scanned, so a replacement text containing `old` does not loop.
pub fn replace_occurrences<P: RunSequence + ?Sized>(
    paragraph: &mut P,
    old: &str,
    new: &str,
) -> usize {
    if old.is_empty() {
        return 0;
    }

    let mut replaced = 0;
    let mut index = 0;
    while index < paragraph.run_count() {
        let text = paragraph.run_text(index);
        if !text.contains(old) {
            index += 1;
            continue;
        }

        let style = paragraph.run_style(index);
        let mut literals = text.split(old);
        paragraph.set_run_text(index, literals.next().unwrap_or_default());

        let mut next = index + 1;
        for literal in literals {
            replaced += 1;
            for segment in [new, literal] {
                if !segment.is_empty() {
                    paragraph.insert_run(next, segment, &style);
                    next += 1;
                }
            }
        }
        index = next;
    }

    if replaced == 0 {
        // A match may only straddle runs that are contiguous text. Groups are
        // rewritten last to first so earlier run indices stay valid.
        for group in paragraph.run_groups().into_iter().rev() {
            let text: String = group.clone().map(|i| paragraph.run_text(i)).collect();
            let occurrences = text.matches(old).count();
            if occurrences == 0 {
                continue;
            }
            log::debug!(
                "{:?} spans {} runs; rewriting them without run formatting",
                old,
                group.len()
            );
            paragraph.replace_runs(group, &text.replace(old, new));
            replaced += occurrences;
        }
    }

    replaced
}

/// Apply rules to a paragraph, in order. Each rule sees the result of the
/// previous one. Returns the total number of occurrences replaced.
pub fn apply_rules<P: RunSequence + ?Sized>(paragraph: &mut P, rules: &[ReplacementRule]) -> usize {
    rules
        .iter()
        .map(|rule| replace_occurrences(paragraph, rule.old(), rule.new_text()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Run, RunStyle, Underline};

    fn bold() -> RunStyle {
        RunStyle::new().with_bold(true).with_font("Arial", 11.0)
    }

    fn italic() -> RunStyle {
        RunStyle::new()
            .with_italic(true)
            .with_underline(Underline::Double)
            .with_color("FF0000")
    }

    #[test]
    fn test_absent_text_is_noop() {
        let mut p = Paragraph::from_runs(vec![
            Run::styled("Hello ", bold()),
            Run::styled("world", italic()),
        ]);
        let before = p.clone();

        assert!(!replace(&mut p, "xyz", "abc"));
        assert_eq!(p, before);
    }

    #[test]
    fn test_single_run_match_keeps_styles() {
        let mut p = Paragraph::from_runs(vec![
            Run::styled("Hello old world", bold()),
            Run::styled(" and more", italic()),
        ]);

        assert!(replace(&mut p, "old", "new"));
        assert_eq!(p.plain_text(), "Hello new world and more");

        let texts: Vec<_> = p.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello ", "new", " world", " and more"]);
        assert!(p.runs[..3].iter().all(|r| r.style == bold()));
        assert_eq!(p.runs[3].style, italic());
    }

    #[test]
    fn test_match_at_run_start() {
        let mut p = Paragraph::from_runs(vec![Run::styled("Draft report", bold())]);
        replace(&mut p, "Draft", "Final");

        assert_eq!(p.plain_text(), "Final report");
        assert_eq!(p.runs[0].text, "");
        assert!(p.runs.iter().all(|r| r.style == bold()));
    }

    #[test]
    fn test_empty_trailing_segment_not_materialized() {
        let mut p = Paragraph::from_runs(vec![Run::styled("to old", bold())]);
        replace(&mut p, "old", "");

        assert_eq!(p.plain_text(), "to ");
        assert_eq!(p.run_count(), 1);
    }

    #[test]
    fn test_straddling_match_falls_back() {
        let mut p = Paragraph::from_runs(vec![
            Run::styled("foo", bold()),
            Run::styled("bar", italic()),
        ]);

        assert_eq!(replace_occurrences(&mut p, "ooba", "X"), 1);
        assert_eq!(p.plain_text(), "fXr");
        assert_eq!(p.run_count(), 1);
        assert_eq!(p.runs[0].style, RunStyle::default());
    }

    #[test]
    fn test_non_overlapping_left_to_right() {
        let mut p = Paragraph::with_text("aaaa");
        assert_eq!(replace_occurrences(&mut p, "aa", "b"), 2);
        assert_eq!(p.plain_text(), "bb");

        let mut p = Paragraph::with_text("aaa");
        replace(&mut p, "aa", "b");
        assert_eq!(p.plain_text(), "ba");
    }

    #[test]
    fn test_replacement_containing_old_is_not_rescanned() {
        let mut p = Paragraph::with_text("a-a");
        assert_eq!(replace_occurrences(&mut p, "a", "aa"), 2);
        assert_eq!(p.plain_text(), "aa-aa");
    }

    #[test]
    fn test_same_old_and_new_splits_but_keeps_text() {
        let mut p = Paragraph::from_runs(vec![Run::styled("x cat y", bold())]);
        assert!(replace(&mut p, "cat", "cat"));
        assert_eq!(p.plain_text(), "x cat y");
        assert_eq!(p.run_count(), 3);
    }

    #[test]
    fn test_empty_old_never_matches() {
        let mut p = Paragraph::with_text("abc");
        assert!(!replace(&mut p, "", "x"));
        assert_eq!(p.plain_text(), "abc");
    }

    #[test]
    fn test_match_in_one_run_skips_fallback() {
        // "ab" occurs inside the second run and across the boundary.
        let mut p = Paragraph::from_runs(vec![
            Run::styled("xa", bold()),
            Run::styled("bab", italic()),
        ]);
        assert_eq!(replace_occurrences(&mut p, "ab", "Z"), 1);
        assert_eq!(p.plain_text(), "xabZ");
        assert_eq!(p.runs[0].style, bold());
    }

    /// Paragraph whose runs are split into fixed groups, as a backend does
    /// when other content sits between runs.
    struct Grouped {
        paragraph: Paragraph,
        groups: Vec<std::ops::Range<usize>>,
    }

    impl RunSequence for Grouped {
        fn run_count(&self) -> usize {
            self.paragraph.run_count()
        }
        fn run_text(&self, index: usize) -> String {
            self.paragraph.run_text(index)
        }
        fn set_run_text(&mut self, index: usize, text: &str) {
            self.paragraph.set_run_text(index, text)
        }
        fn run_style(&self, index: usize) -> RunStyle {
            self.paragraph.run_style(index)
        }
        fn set_run_style(&mut self, index: usize, style: &RunStyle) {
            self.paragraph.set_run_style(index, style)
        }
        fn insert_run(&mut self, index: usize, text: &str, style: &RunStyle) {
            self.paragraph.insert_run(index, text, style)
        }
        fn remove_run(&mut self, index: usize) {
            self.paragraph.remove_run(index)
        }
        fn push_run(&mut self, text: &str) {
            self.paragraph.push_run(text)
        }
        fn run_groups(&self) -> Vec<std::ops::Range<usize>> {
            self.groups.clone()
        }
    }

    #[test]
    fn test_fallback_never_joins_separate_groups() {
        let mut p = Grouped {
            paragraph: Paragraph::from_runs(vec![
                Run::styled("foo", bold()),
                Run::new("LINK"),
                Run::styled("bar", italic()),
            ]),
            groups: vec![0..1, 1..2, 2..3],
        };
        let before = p.paragraph.clone();

        assert_eq!(replace_occurrences(&mut p, "ooba", "X"), 0);
        assert_eq!(p.paragraph, before);
    }

    #[test]
    fn test_fallback_rewrites_only_the_matching_group() {
        let mut p = Grouped {
            paragraph: Paragraph::from_runs(vec![
                Run::styled("See ", bold()),
                Run::styled("Dr", italic()),
                Run::styled("aft", bold()),
                Run::styled(" Dr", italic()),
                Run::new("aft"),
            ]),
            groups: vec![0..1, 1..3, 3..5],
        };

        assert_eq!(replace_occurrences(&mut p, "Draft", "Final"), 2);
        let texts: Vec<_> = p.paragraph.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["See ", "Final", " Final"]);
        assert_eq!(p.paragraph.runs[0].style, bold());
        assert_eq!(p.paragraph.runs[1].style, RunStyle::default());
    }

    #[test]
    fn test_empty_paragraph() {
        let mut p = Paragraph::new();
        assert!(!replace(&mut p, "a", "b"));
        assert!(p.is_empty());
    }

    #[test]
    fn test_apply_rules_sequentially() {
        let rules = [
            ReplacementRule::new("A", "B").unwrap(),
            ReplacementRule::new("B", "C").unwrap(),
        ];
        let mut p = Paragraph::with_text("AB");
        assert_eq!(apply_rules(&mut p, &rules), 3);
        assert_eq!(p.plain_text(), "CC");
    }
}
