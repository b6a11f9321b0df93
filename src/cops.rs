// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Round-Robin Cop Pool
//
// Cops sit in a queue. Only the cop at the head is checked when a target
// driver passes; writing a ticket keeps that cop busy for `ticket_minutes`
// and rotates them to the back of the queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{PatrolError, Result};
use crate::simulation::DriverEvent;

// ─── Cop ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cop {
    pub id: u32,
    pub minutes_until_available: f64,
}

impl Cop {
    pub fn is_available(&self) -> bool {
        self.minutes_until_available <= 0.0
    }

    pub fn snapshot(&self) -> CopSnapshot {
        CopSnapshot {
            cop_id: self.id,
            minutes_until_available: self.minutes_until_available,
        }
    }
}

/// Copy of a cop's state taken when a ticket is written. The live cop keeps
/// counting down afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CopSnapshot {
    pub cop_id: u32,
    pub minutes_until_available: f64,
}

// ─── CopPool ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopPool {
    queue: VecDeque<Cop>,
    next_id: u32,
    ticket_minutes: f64,
    cost_per_cop_per_hour: f64,
}

impl CopPool {
    /// Pool of `size` idle cops.
    pub fn new(size: usize, ticket_minutes: f64, cost_per_cop_per_hour: f64) -> Result<Self> {
        if size < 1 {
            return Err(PatrolError::config("cop pool needs at least one cop"));
        }
        if !(ticket_minutes.is_finite() && ticket_minutes > 0.0) {
            return Err(PatrolError::param(format!(
                "ticket time must be positive, got {ticket_minutes}"
            )));
        }
        if !(cost_per_cop_per_hour.is_finite() && cost_per_cop_per_hour >= 0.0) {
            return Err(PatrolError::config(format!(
                "cost per cop must be non-negative, got {cost_per_cop_per_hour}"
            )));
        }
        let mut pool = Self {
            queue: VecDeque::with_capacity(size),
            next_id: 0,
            ticket_minutes,
            cost_per_cop_per_hour,
        };
        pool.hire(size);
        Ok(pool)
    }

    fn hire(&mut self, n: usize) {
        for _ in 0..n {
            let id = self.next_id;
            self.next_id += 1;
            self.queue.push_back(Cop { id, minutes_until_available: 0.0 });
        }
    }

    /// Grow (`delta > 0`) or shrink (`delta < 0`) the pool at the back.
    /// Shrinking below one cop fails and leaves the pool unchanged.
    pub fn resize(&mut self, delta: isize) -> Result<()> {
        if delta >= 0 {
            self.hire(delta as usize);
            return Ok(());
        }
        let remove = delta.unsigned_abs();
        if remove >= self.queue.len() {
            return Err(PatrolError::config(format!(
                "cannot retire {} of {} cops; at least one must remain",
                remove,
                self.queue.len()
            )));
        }
        self.queue.truncate(self.queue.len() - remove);
        Ok(())
    }

    /// Let `minutes` of simulated time pass for every cop.
    ///
    /// Countdowns are floored at zero. All cops are decremented: after a
    /// resize the queue is no longer sorted by countdown, so stopping at the
    /// first idle cop from the back would skip busy ones.
    pub fn elapse(&mut self, minutes: f64) -> Result<()> {
        if minutes.is_nan() || minutes < 0.0 {
            return Err(PatrolError::param(format!(
                "elapsed time must be non-negative, got {minutes}"
            )));
        }
        for cop in self.queue.iter_mut().rev() {
            cop.minutes_until_available = (cop.minutes_until_available - minutes).max(0.0);
        }
        Ok(())
    }

    pub fn is_front_available(&self) -> bool {
        self.queue.front().map_or(false, Cop::is_available)
    }

    /// Write a ticket with the cop at the head of the queue.
    ///
    /// The cop becomes busy for `ticket_minutes` and moves to the back. When
    /// a driver is given it is marked ticketed with a snapshot of that cop.
    pub fn issue_ticket(&mut self, driver: Option<&mut DriverEvent>) -> Result<CopSnapshot> {
        let mut cop = match self.queue.pop_front() {
            Some(cop) => cop,
            None => return Err(PatrolError::config("cop pool is empty")),
        };
        if !cop.is_available() {
            let err = PatrolError::CopBusy {
                cop_id: cop.id,
                minutes_until_available: cop.minutes_until_available,
            };
            self.queue.push_front(cop);
            return Err(err);
        }
        cop.minutes_until_available = self.ticket_minutes;
        let snapshot = cop.snapshot();
        self.queue.push_back(cop);
        if let Some(driver) = driver {
            driver.ticketed = true;
            driver.cop = Some(snapshot);
        }
        Ok(snapshot)
    }

    /// Hourly enforcement cost of the whole pool.
    pub fn cost_per_hour(&self) -> f64 {
        self.cost_per_cop_per_hour * self.queue.len() as f64
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn ticket_minutes(&self) -> f64 {
        self.ticket_minutes
    }

    pub fn cost_per_cop_per_hour(&self) -> f64 {
        self.cost_per_cop_per_hour
    }

    /// Cops in round-robin order, head first.
    pub fn cops(&self) -> impl Iterator<Item = &Cop> {
        self.queue.iter()
    }

    pub fn snapshots(&self) -> Vec<CopSnapshot> {
        self.queue.iter().map(Cop::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pool: &CopPool) -> Vec<u32> {
        pool.cops().map(|c| c.id).collect()
    }

    #[test]
    fn test_new_pool_is_idle() {
        let pool = CopPool::new(3, 15.0, 300.0).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(ids(&pool), vec![0, 1, 2]);
        assert!(pool.is_front_available());
        assert_eq!(pool.cost_per_hour(), 900.0);
    }

    #[test]
    fn test_new_rejects_bad_inputs() {
        assert!(matches!(CopPool::new(0, 15.0, 300.0), Err(PatrolError::InvalidConfiguration(_))));
        assert!(matches!(CopPool::new(1, 0.0, 300.0), Err(PatrolError::InvalidParameter(_))));
        assert!(matches!(CopPool::new(1, 15.0, -1.0), Err(PatrolError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_ticket_rotates_head_to_back() {
        let mut pool = CopPool::new(3, 15.0, 300.0).unwrap();
        let snap = pool.issue_ticket(None).unwrap();
        assert_eq!(snap.cop_id, 0);
        assert_eq!(snap.minutes_until_available, 15.0);
        assert_eq!(ids(&pool), vec![1, 2, 0]);
    }

    #[test]
    fn test_busy_head_blocks_ticket() {
        let mut pool = CopPool::new(1, 15.0, 300.0).unwrap();
        pool.issue_ticket(None).unwrap();
        pool.elapse(5.0).unwrap();
        assert!(!pool.is_front_available());
        let err = pool.issue_ticket(None).unwrap_err();
        assert!(matches!(err, PatrolError::CopBusy { cop_id: 0, .. }));
        assert_eq!(pool.len(), 1);
        pool.elapse(10.0).unwrap();
        assert!(pool.is_front_available());
    }

    #[test]
    fn test_elapse_floors_at_zero() {
        let mut pool = CopPool::new(2, 15.0, 300.0).unwrap();
        pool.issue_ticket(None).unwrap();
        pool.elapse(1e9).unwrap();
        assert!(pool.cops().all(|c| c.minutes_until_available == 0.0));
        assert!(pool.elapse(-1.0).is_err());
    }

    #[test]
    fn test_resize_up_and_down() {
        let mut pool = CopPool::new(2, 15.0, 300.0).unwrap();
        pool.resize(2).unwrap();
        assert_eq!(ids(&pool), vec![0, 1, 2, 3]);
        pool.resize(-3).unwrap();
        assert_eq!(ids(&pool), vec![0]);
        // Ids are never reused.
        pool.resize(1).unwrap();
        assert_eq!(ids(&pool), vec![0, 4]);
    }

    #[test]
    fn test_resize_below_one_is_rejected_unchanged() {
        let mut pool = CopPool::new(2, 15.0, 300.0).unwrap();
        pool.issue_ticket(None).unwrap();
        let before = pool.snapshots();
        let err = pool.resize(-2).unwrap_err();
        assert!(matches!(err, PatrolError::InvalidConfiguration(_)));
        assert_eq!(pool.snapshots(), before);
        assert!(pool.resize(-5).is_err());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_elapse_reaches_busy_cops_behind_new_hires() {
        let mut pool = CopPool::new(1, 15.0, 300.0).unwrap();
        pool.issue_ticket(None).unwrap();
        pool.resize(1).unwrap(); // idle cop 1 now sits behind busy cop 0
        pool.elapse(15.0).unwrap();
        assert!(pool.is_front_available());
    }

    #[test]
    fn test_ticket_marks_driver_with_snapshot() {
        let mut pool = CopPool::new(1, 15.0, 300.0).unwrap();
        let mut driver = DriverEvent::new(0, 0, 20.0, 200.0, 3.0, true);
        pool.issue_ticket(Some(&mut driver)).unwrap();
        pool.elapse(5.0).unwrap();
        assert!(driver.ticketed);
        let cop = driver.cop.unwrap();
        assert_eq!(cop.cop_id, 0);
        assert_eq!(cop.minutes_until_available, 15.0);
    }
}
