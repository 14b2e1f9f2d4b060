use super::feedback::Rating;
use super::verdict::ScoreBasis;
use indexmap::IndexMap;
use serde::Serialize;

/// 一个维度在一段视频上的最终统计，由 `RunningTally::summarize` 一次性生成
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub score_basis: ScoreBasis,
    /// 没有可用帧或该维度不计分时为 `None`
    pub score_percent: Option<f64>,
    pub dominant_label: Option<String>,
    pub label_counts: IndexMap<String, u64>,
    /// 各标签占全部选中帧的百分比
    pub label_breakdown_percent: IndexMap<String, f64>,
    /// 各扣分原因占有信号帧的百分比，原因之间不互斥，总和可以超过 100
    pub reason_breakdown_percent: IndexMap<String, f64>,
    pub coverage_percent: f64,
    pub total_selected: u64,
    pub signal_present: u64,
    pub passing: u64,
}

impl Summary {
    pub fn has_data(&self) -> bool {
        self.signal_present > 0
    }

    pub fn rating(&self) -> Option<Rating> {
        self.score_percent.map(Rating::from_score)
    }

    pub fn label_count(&self, label: &str) -> u64 {
        self.label_counts.get(label).copied().unwrap_or(0)
    }
}

pub(crate) fn percent(count: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(count as f64 * 100.0 / total as f64)
    }
}
