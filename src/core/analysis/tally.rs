//! 逐帧累加的计数器
//!
//! 每个选中帧恰好 `accumulate` 一次，所有计数只增不减。
//! `merge` 满足交换律和结合律（计数意义上）；按原顺序切分后依次合并，
//! 标签的首次出现顺序也与顺序处理一致，因此并列时的主标签不变。

use super::summary::{percent, Summary};
use super::verdict::{ScoreBasis, Verdict};
use indexmap::IndexMap;
use log::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningTally {
    total_selected: u64,
    signal_present: u64,
    passing: u64,
    by_label: IndexMap<String, u64>,
    by_reason: IndexMap<String, u64>,
}

impl RunningTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先放入计数为 0 的标签，固定直方图顺序
    pub fn with_labels(labels: &[&str]) -> Self {
        let mut tally = Self::new();
        for label in labels {
            tally.by_label.entry((*label).to_string()).or_insert(0);
        }
        tally
    }

    pub fn accumulate(&mut self, verdict: Verdict) {
        self.total_selected += 1;
        if verdict.signal_present {
            self.signal_present += 1;
        }
        if verdict.passed {
            self.passing += 1;
        }
        *self.by_label.entry(verdict.label.into_owned()).or_insert(0) += 1;
        for reason in verdict.reasons {
            *self.by_reason.entry(reason.to_string()).or_insert(0) += 1;
        }
    }

    pub fn merge(&mut self, other: RunningTally) {
        self.total_selected += other.total_selected;
        self.signal_present += other.signal_present;
        self.passing += other.passing;
        for (label, count) in other.by_label {
            *self.by_label.entry(label).or_insert(0) += count;
        }
        for (reason, count) in other.by_reason {
            *self.by_reason.entry(reason).or_insert(0) += count;
        }
    }

    pub fn total_selected(&self) -> u64 {
        self.total_selected
    }

    pub fn signal_present(&self) -> u64 {
        self.signal_present
    }

    pub fn passing(&self) -> u64 {
        self.passing
    }

    pub fn label_count(&self, label: &str) -> u64 {
        self.by_label.get(label).copied().unwrap_or(0)
    }

    /// 计数最多的标签，并列时取最先出现的
    pub fn dominant_label(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (label, &count) in &self.by_label {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label.as_str(), count)),
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn summarize(&self, basis: ScoreBasis) -> Summary {
        let score_percent = match basis {
            ScoreBasis::SignalPresent => percent(self.passing, self.signal_present),
            ScoreBasis::AllSelected => percent(self.passing, self.total_selected),
            ScoreBasis::NotScored => None,
        };

        let label_breakdown_percent = self
            .by_label
            .iter()
            .map(|(label, &count)| {
                let pct = percent(count, self.total_selected).unwrap_or(0.0);
                (label.clone(), pct)
            })
            .collect();

        let reason_breakdown_percent = self
            .by_reason
            .iter()
            .map(|(reason, &count)| {
                let pct = percent(count, self.signal_present).unwrap_or(0.0);
                (reason.clone(), pct)
            })
            .collect();

        let summary = Summary {
            score_basis: basis,
            score_percent,
            dominant_label: self.dominant_label().map(str::to_string),
            label_counts: self.by_label.clone(),
            label_breakdown_percent,
            reason_breakdown_percent,
            coverage_percent: percent(self.signal_present, self.total_selected).unwrap_or(0.0),
            total_selected: self.total_selected,
            signal_present: self.signal_present,
            passing: self.passing,
        };
        debug!(
            "📊 Summarized {} selected frames ({} with signal, {} passing)",
            summary.total_selected, summary.signal_present, summary.passing
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(label: &'static str, passed: bool, signal: bool, reasons: Vec<&'static str>) -> Verdict {
        Verdict::new(label, passed, signal).with_reasons(reasons)
    }

    fn create_test_verdicts() -> Vec<Verdict> {
        vec![
            verdict("good", true, true, vec![]),
            verdict("not good", false, true, vec!["Head Tilt", "Spine Bend"]),
            verdict("No Pose Detected", false, false, vec![]),
            verdict("good", true, true, vec!["Shoulder Misalignment"]),
            verdict("not good", false, true, vec!["Head Tilt"]),
            verdict("No Pose Detected", false, false, vec![]),
            verdict("good", true, true, vec![]),
        ]
    }

    #[test]
    fn test_no_data_summary() {
        let summary = RunningTally::new().summarize(ScoreBasis::SignalPresent);
        assert_eq!(summary.score_percent, None);
        assert_eq!(summary.coverage_percent, 0.0);
        assert_eq!(summary.dominant_label, None);
        assert!(!summary.has_data());
        assert!(summary.rating().is_none());
    }

    #[test]
    fn test_only_absent_frames() {
        let mut tally = RunningTally::new();
        for _ in 0..4 {
            tally.accumulate(verdict("No Pose Detected", false, false, vec![]));
        }
        let summary = tally.summarize(ScoreBasis::SignalPresent);
        assert_eq!(summary.total_selected, 4);
        assert_eq!(summary.score_percent, None);
        assert_eq!(summary.coverage_percent, 0.0);

        let all_selected = tally.summarize(ScoreBasis::AllSelected);
        assert_eq!(all_selected.score_percent, Some(0.0));
    }

    #[test]
    fn test_score_and_reason_breakdown() {
        let mut tally = RunningTally::new();
        for v in create_test_verdicts() {
            tally.accumulate(v);
        }

        let summary = tally.summarize(ScoreBasis::SignalPresent);
        assert_eq!(summary.total_selected, 7);
        assert_eq!(summary.signal_present, 5);
        assert_eq!(summary.passing, 3);
        assert_eq!(summary.score_percent, Some(60.0));
        assert!((summary.coverage_percent - 500.0 / 7.0).abs() < 1e-9);
        assert_eq!(summary.reason_breakdown_percent["Head Tilt"], 40.0);
        assert_eq!(summary.reason_breakdown_percent["Spine Bend"], 20.0);
        assert_eq!(summary.dominant_label.as_deref(), Some("good"));
    }

    #[test]
    fn test_reasons_may_exceed_hundred_percent() {
        let mut tally = RunningTally::new();
        tally.accumulate(verdict(
            "not good",
            false,
            true,
            vec!["Shoulder Misalignment", "Head Tilt", "Spine Bend"],
        ));
        let summary = tally.summarize(ScoreBasis::SignalPresent);
        let total: f64 = summary.reason_breakdown_percent.values().sum();
        assert_eq!(total, 300.0);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let verdicts = create_test_verdicts();

        let mut sequential = RunningTally::new();
        for v in verdicts.clone() {
            sequential.accumulate(v);
        }

        for split in 0..=verdicts.len() {
            let mut left = RunningTally::new();
            let mut right = RunningTally::new();
            for v in verdicts[..split].iter().cloned() {
                left.accumulate(v);
            }
            for v in verdicts[split..].iter().cloned() {
                right.accumulate(v);
            }
            left.merge(right);

            assert_eq!(left, sequential, "split at {}", split);
            assert_eq!(
                left.summarize(ScoreBasis::SignalPresent),
                sequential.summarize(ScoreBasis::SignalPresent)
            );
        }
    }

    #[test]
    fn test_merge_is_commutative_on_counts() {
        let verdicts = create_test_verdicts();
        let (a, b) = verdicts.split_at(3);

        let build = |vs: &[Verdict]| {
            let mut t = RunningTally::new();
            for v in vs.iter().cloned() {
                t.accumulate(v);
            }
            t
        };

        let mut ab = build(a);
        ab.merge(build(b));
        let mut ba = build(b);
        ba.merge(build(a));

        let s_ab = ab.summarize(ScoreBasis::SignalPresent);
        let s_ba = ba.summarize(ScoreBasis::SignalPresent);
        assert_eq!(s_ab.score_percent, s_ba.score_percent);
        assert_eq!(s_ab.coverage_percent, s_ba.coverage_percent);
        assert_eq!(s_ab.label_count("good"), s_ba.label_count("good"));
        assert_eq!(s_ab.reason_breakdown_percent["Head Tilt"], s_ba.reason_breakdown_percent["Head Tilt"]);
    }

    #[test]
    fn test_dominant_label_tie_goes_to_first_seen() {
        let mut tally = RunningTally::new();
        tally.accumulate(verdict("neutral", true, true, vec![]));
        tally.accumulate(verdict("happy", true, true, vec![]));
        tally.accumulate(verdict("happy", true, true, vec![]));
        tally.accumulate(verdict("neutral", true, true, vec![]));
        assert_eq!(tally.dominant_label(), Some("neutral"));
    }

    #[test]
    fn test_seeded_labels_keep_order() {
        let mut tally = RunningTally::with_labels(&["Open Palm", "Fist", "No Hand"]);
        tally.accumulate(verdict("No Hand", false, false, vec![]));
        tally.accumulate(verdict("Fist", true, true, vec![]));

        let summary = tally.summarize(ScoreBasis::SignalPresent);
        let labels: Vec<&str> = summary.label_counts.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["Open Palm", "Fist", "No Hand"]);
        assert_eq!(summary.dominant_label.as_deref(), Some("Fist"));
        assert_eq!(summary.label_breakdown_percent["Open Palm"], 0.0);
    }
}
