//! Submission pipeline counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

#[derive(Clone)]
pub struct SubmissionMetrics {
    received: Arc<AtomicU64>,
    delivered: Arc<AtomicU64>,
    logged: Arc<AtomicU64>,
    spam_discarded: Arc<AtomicU64>,
    validation_rejected: Arc<AtomicU64>,
    attachment_rejected: Arc<AtomicU64>,
    delivery_failed: Arc<AtomicU64>,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub delivered: u64,
    pub logged: u64,
    pub spam_discarded: u64,
    pub validation_rejected: u64,
    pub attachment_rejected: u64,
    pub delivery_failed: u64,
    pub uptime_seconds: i64,
}

impl Default for SubmissionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionMetrics {
    pub fn new() -> Self {
        Self {
            received: Arc::new(AtomicU64::new(0)),
            delivered: Arc::new(AtomicU64::new(0)),
            logged: Arc::new(AtomicU64::new(0)),
            spam_discarded: Arc::new(AtomicU64::new(0)),
            validation_rejected: Arc::new(AtomicU64::new(0)),
            attachment_rejected: Arc::new(AtomicU64::new(0)),
            delivery_failed: Arc::new(AtomicU64::new(0)),
            start_time: Utc::now(),
        }
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_logged(&self) {
        self.logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spam(&self) {
        self.spam_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejected(&self) {
        self.validation_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attachment_rejected(&self) {
        self.attachment_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failed(&self) {
        self.delivery_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            logged: self.logged.load(Ordering::Relaxed),
            spam_discarded: self.spam_discarded.load(Ordering::Relaxed),
            validation_rejected: self.validation_rejected.load(Ordering::Relaxed),
            attachment_rejected: self.attachment_rejected.load(Ordering::Relaxed),
            delivery_failed: self.delivery_failed.load(Ordering::Relaxed),
            uptime_seconds: (Utc::now() - self.start_time).num_seconds(),
        }
    }
}
