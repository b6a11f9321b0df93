// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Offense Profiles
//
// An offense profile is a homogeneous class of drivers: how far over the
// limit they go, how often one passes the trap, and what the fine is.
// Profiles merge into the profile of their union, weighted by arrival rate,
// so any subset of classes reduces to one effective profile.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{PatrolError, Result};
use crate::money::Dollars;

/// Dollars fined per mph over the limit when no explicit fine is given.
pub const FINE_PER_MPH: f64 = 10.0;

const MINUTES_PER_HOUR: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileFields")]
pub struct OffenseProfile {
    severity: f64,
    mean_gap_minutes: f64,
    arrival_rate_per_min: f64,
    fine_amount: f64,
    revenue_opportunity_per_hour: f64,
}

/// Inputs read back on deserialize; derived rates are recomputed.
#[derive(Deserialize)]
struct ProfileFields {
    severity: f64,
    mean_gap_minutes: f64,
    fine_amount: f64,
}

impl TryFrom<ProfileFields> for OffenseProfile {
    type Error = PatrolError;

    fn try_from(fields: ProfileFields) -> Result<Self> {
        Self::new(fields.severity, fields.mean_gap_minutes, fields.fine_amount)
    }
}

impl OffenseProfile {
    /// Build a profile from raw inputs.
    ///
    /// Fails with `InvalidConfiguration` unless `mean_gap_minutes` and
    /// `fine_amount` are finite and strictly positive, and the derived
    /// arrival rate and revenue opportunity are finite.
    pub fn new(severity: f64, mean_gap_minutes: f64, fine_amount: f64) -> Result<Self> {
        if !severity.is_finite() {
            return Err(PatrolError::config(format!("severity must be finite, got {severity}")));
        }
        if !(mean_gap_minutes.is_finite() && mean_gap_minutes > 0.0) {
            return Err(PatrolError::config(format!(
                "mean gap must be positive, got {mean_gap_minutes}"
            )));
        }
        if !(fine_amount.is_finite() && fine_amount > 0.0) {
            return Err(PatrolError::config(format!(
                "fine must be positive, got {fine_amount}"
            )));
        }
        let arrival_rate_per_min = 1.0 / mean_gap_minutes;
        let revenue_opportunity_per_hour = fine_amount * arrival_rate_per_min * MINUTES_PER_HOUR;
        if !revenue_opportunity_per_hour.is_finite() {
            return Err(PatrolError::config(format!(
                "mean gap {mean_gap_minutes} with fine {fine_amount} overflows the revenue rate"
            )));
        }
        Ok(Self {
            severity,
            mean_gap_minutes,
            arrival_rate_per_min,
            fine_amount,
            revenue_opportunity_per_hour,
        })
    }

    /// Profile whose fine follows the ten-dollars-per-mph schedule.
    pub fn with_default_fine(severity: f64, mean_gap_minutes: f64) -> Result<Self> {
        Self::new(severity, mean_gap_minutes, severity * FINE_PER_MPH)
    }

    /// "No drivers": zero arrival rate, infinite mean gap.
    pub fn null() -> Self {
        Self {
            severity: 0.0,
            mean_gap_minutes: f64::INFINITY,
            arrival_rate_per_min: 0.0,
            fine_amount: 0.0,
            revenue_opportunity_per_hour: 0.0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.arrival_rate_per_min == 0.0
    }

    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn mean_gap_minutes(&self) -> f64 {
        self.mean_gap_minutes
    }

    pub fn arrival_rate_per_min(&self) -> f64 {
        self.arrival_rate_per_min
    }

    pub fn fine_amount(&self) -> f64 {
        self.fine_amount
    }

    /// Revenue per hour if every driver of this profile were ticketed.
    pub fn revenue_opportunity_per_hour(&self) -> f64 {
        self.revenue_opportunity_per_hour
    }

    /// Merge two profiles into the profile of their union.
    ///
    /// Rates add; severity and fine are rate-weighted means; revenue
    /// opportunity adds. Combining with the null profile is the identity.
    pub fn combine(&self, other: &Self) -> Self {
        let rate = self.arrival_rate_per_min + other.arrival_rate_per_min;
        if rate == 0.0 {
            return Self::null();
        }
        let self_weight = self.arrival_rate_per_min / rate;
        let other_weight = other.arrival_rate_per_min / rate;
        Self {
            severity: self_weight * self.severity + other_weight * other.severity,
            mean_gap_minutes: 1.0 / rate,
            arrival_rate_per_min: rate,
            fine_amount: self_weight * self.fine_amount + other_weight * other.fine_amount,
            revenue_opportunity_per_hour: self.revenue_opportunity_per_hour
                + other.revenue_opportunity_per_hour,
        }
    }

    /// Reduce an ordered sequence of profiles to one effective profile.
    /// An empty sequence reduces to the null profile.
    pub fn aggregate<'a, I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = &'a OffenseProfile>,
    {
        let mut iter = profiles.into_iter();
        match iter.next() {
            Some(first) => iter.fold(*first, |acc, p| acc.combine(p)),
            None => Self::null(),
        }
    }

    /// Expected hourly revenue for a lone cop working only this profile:
    /// `60 / (gap + ticket_minutes) × fine`, rounded to cents.
    pub fn single_cop_revenue_per_hour(&self, ticket_minutes: f64) -> Dollars {
        if self.is_null() {
            return Dollars::zero();
        }
        let stops_per_hour = MINUTES_PER_HOUR / (self.mean_gap_minutes + ticket_minutes);
        Dollars::from_f64(stops_per_hour * self.fine_amount)
    }
}

impl Add for OffenseProfile {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.combine(&rhs)
    }
}

impl Sum for OffenseProfile {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::null(), |acc, p| acc.combine(&p))
    }
}

impl<'a> Sum<&'a OffenseProfile> for OffenseProfile {
    fn sum<I: Iterator<Item = &'a OffenseProfile>>(iter: I) -> Self {
        Self::aggregate(iter)
    }
}
