//! # Analytics
//! Pure aggregation over stored feedback: overall counts and percentages,
//! category distribution, and per-day trends for the most recent 7 days.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::feedback::FeedbackRecord;
use crate::sentiment::Sentiment;

/// Number of distinct days kept in `daily_trends`.
pub const TREND_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    fn bump(&mut self, s: Sentiment) {
        match s {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Percentages rounded to one decimal; all zero when there is no feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentPercentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: SentimentCounts,
}

/// Wire names are camelCase, matching the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total: usize,
    pub sentiment_counts: SentimentCounts,
    pub sentiment_percentages: SentimentPercentages,
    pub category_distribution: HashMap<String, usize>,
    /// Ascending by date (UTC), last `TREND_DAYS` days that have feedback.
    pub daily_trends: Vec<DailyTrend>,
}

pub fn summarize(records: &[FeedbackRecord]) -> AnalyticsSummary {
    let mut counts = SentimentCounts::default();
    let mut categories: HashMap<String, usize> = HashMap::new();
    let mut days: BTreeMap<NaiveDate, SentimentCounts> = BTreeMap::new();

    for r in records {
        counts.bump(r.sentiment);
        if let Some(c) = &r.category {
            *categories.entry(c.clone()).or_insert(0) += 1;
        }
        days.entry(r.created_at.date_naive())
            .or_default()
            .bump(r.sentiment);
    }

    let total = counts.total();
    let pct = |n: usize| {
        if total == 0 {
            0.0
        } else {
            (n as f64 / total as f64 * 1000.0).round() / 10.0
        }
    };

    let skip = days.len().saturating_sub(TREND_DAYS);
    let daily_trends = days
        .into_iter()
        .skip(skip)
        .map(|(date, counts)| DailyTrend { date, counts })
        .collect();

    AnalyticsSummary {
        total,
        sentiment_counts: counts,
        sentiment_percentages: SentimentPercentages {
            positive: pct(counts.positive),
            neutral: pct(counts.neutral),
            negative: pct(counts.negative),
        },
        category_distribution: categories,
        daily_trends,
    }
}
