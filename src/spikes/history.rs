//! Bounded buffer of recent alerts

use std::collections::VecDeque;

use crate::core::SpikeAlert;

/// Keeps the most recent `capacity` alerts; older ones are dropped
#[derive(Debug, Clone)]
pub struct AlertHistory {
    alerts: VecDeque<SpikeAlert>,
    capacity: usize,
}

impl AlertHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, alert: SpikeAlert) {
        if self.capacity == 0 {
            return;
        }
        while self.alerts.len() >= self.capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }

    /// Up to `limit` alerts, newest first
    pub fn recent(&self, limit: usize) -> Vec<SpikeAlert> {
        self.alerts.iter().rev().take(limit).cloned().collect()
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.alerts.len() > capacity {
            self.alerts.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionContract, OptionType};
    use chrono::{NaiveDate, Utc};

    fn alert(strike: u32) -> SpikeAlert {
        let contract = OptionContract::new(
            "INFY",
            strike,
            NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
            OptionType::Call,
        );
        SpikeAlert::new(contract, 30.0, 36.0, Utc::now())
    }

    #[test]
    fn test_bounded_newest_first() {
        let mut history = AlertHistory::new(3);
        for strike in [1700, 1725, 1750, 1775] {
            history.push(alert(strike));
        }

        assert_eq!(history.len(), 3);
        let strikes: Vec<u32> = history.recent(10).iter().map(|a| a.contract.strike).collect();
        assert_eq!(strikes, vec![1775, 1750, 1725]);

        assert_eq!(history.recent(1).len(), 1);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_shrink_capacity() {
        let mut history = AlertHistory::new(5);
        for strike in [1700, 1725, 1750] {
            history.push(alert(strike));
        }
        history.set_capacity(1);
        assert_eq!(history.recent(5)[0].contract.strike, 1750);

        let mut disabled = AlertHistory::new(0);
        disabled.push(alert(1700));
        assert!(disabled.is_empty());
    }
}
