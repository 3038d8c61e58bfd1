// 🏋️ Member Entity - identity, status, kind and performance history
//
// "The ID is IDENTITY (never changes), everything else is a VALUE"
//
// - Member ID is unique within the registry, compared case-insensitively
// - Regular vs Premium is a tag carrying kind-specific data (trainer fee)
// - Fees are a pure function of the member and a FeeSchedule

use crate::error::{GymError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Years outside this range are rejected as typos.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

// ============================================================================
// MEMBERSHIP STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipStatus {
    #[default]
    Active,
    Frozen,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "ACTIVE",
            MembershipStatus::Frozen => "FROZEN",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            MembershipStatus::Active => MembershipStatus::Frozen,
            MembershipStatus::Frozen => MembershipStatus::Active,
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(MembershipStatus::Active),
            "FROZEN" => Ok(MembershipStatus::Frozen),
            other => Err(GymError::invalid(
                "status",
                format!("'{}' (expected ACTIVE or FROZEN)", other),
            )),
        }
    }
}

// ============================================================================
// MEMBER KIND
// ============================================================================

/// Tag used for filtering, independent of kind-specific data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindTag {
    Regular,
    Premium,
}

impl KindTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            KindTag::Regular => "Regular",
            KindTag::Premium => "Premium",
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindTag {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Ok(KindTag::Regular),
            "premium" => Ok(KindTag::Premium),
            other => Err(GymError::invalid(
                "member type",
                format!("'{}' (expected Regular or Premium)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MemberKind {
    Regular,
    Premium { trainer_fee: f64 },
}

impl MemberKind {
    /// Build a Premium kind, validating the trainer fee
    pub fn premium(trainer_fee: f64) -> Result<Self> {
        validate_fee(trainer_fee)?;
        Ok(MemberKind::Premium { trainer_fee })
    }

    pub fn tag(&self) -> KindTag {
        match self {
            MemberKind::Regular => KindTag::Regular,
            MemberKind::Premium { .. } => KindTag::Premium,
        }
    }

    pub fn trainer_fee(&self) -> Option<f64> {
        match self {
            MemberKind::Regular => None,
            MemberKind::Premium { trainer_fee } => Some(*trainer_fee),
        }
    }
}

pub(crate) fn validate_fee(fee: f64) -> Result<()> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(GymError::invalid(
            "trainer fee",
            format!("{} (must be a non-negative number)", fee),
        ));
    }
    Ok(())
}

// ============================================================================
// PERFORMANCE RECORD
// ============================================================================

/// One month's outcome for a member. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceRecord {
    month: u32,
    year: i32,
    goal_achieved: bool,
}

impl PerformanceRecord {
    pub fn new(month: u32, year: i32, goal_achieved: bool) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(GymError::invalid(
                "month",
                format!("{} (must be between 1 and 12)", month),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(GymError::invalid(
                "year",
                format!("{} (must be between {} and {})", year, MIN_YEAR, MAX_YEAR),
            ));
        }

        Ok(PerformanceRecord {
            month,
            year,
            goal_achieved,
        })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn goal_achieved(&self) -> bool {
        self.goal_achieved
    }
}

impl fmt::Display for PerformanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{} - goal {}",
            self.month,
            self.year,
            if self.goal_achieved { "achieved" } else { "missed" }
        )
    }
}

// ============================================================================
// FEE SCHEDULE
// ============================================================================

/// Fee constants. Defaults match the gym's published prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub regular_fee: f64,
    pub premium_base_fee: f64,
    pub frozen_fee: f64,
    /// Fraction taken off a Premium fee when last month's goal was achieved
    pub goal_discount: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            regular_fee: 50.0,
            premium_base_fee: 80.0,
            frozen_fee: 10.0,
            goal_discount: 0.10,
        }
    }
}

impl FeeSchedule {
    /// Monthly fee for a member.
    ///
    /// FROZEN members pay the flat frozen fee, whatever their kind or history.
    /// Premium members get the goal discount when their most recent record
    /// shows the goal achieved.
    pub fn monthly_fee(&self, member: &Member) -> f64 {
        if member.status() == MembershipStatus::Frozen {
            return self.frozen_fee;
        }

        match member.kind {
            MemberKind::Regular => self.regular_fee,
            MemberKind::Premium { trainer_fee } => {
                let total = self.premium_base_fee + trainer_fee;
                if member.achieved_last_goal() {
                    total * (1.0 - self.goal_discount)
                } else {
                    total
                }
            }
        }
    }
}

// ============================================================================
// MEMBER ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    // ========================================================================
    // IDENTITY (never changes)
    // ========================================================================
    id: String,

    // ========================================================================
    // VALUES (can change over time)
    // ========================================================================
    name: String,
    join_date: NaiveDate,
    status: MembershipStatus,
    kind: MemberKind,

    /// Append-only; no dedup on month/year
    history: Vec<PerformanceRecord>,
}

impl Member {
    /// Create a new ACTIVE member with an empty history
    pub fn new(id: &str, name: &str, join_date: NaiveDate, kind: MemberKind) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(GymError::invalid("member ID", "cannot be empty"));
        }
        if let Some(fee) = kind.trainer_fee() {
            validate_fee(fee)?;
        }

        Ok(Member {
            id: id.to_string(),
            name: clean_name(name)?,
            join_date,
            status: MembershipStatus::Active,
            kind,
            history: Vec::new(),
        })
    }

    pub fn regular(id: &str, name: &str, join_date: NaiveDate) -> Result<Self> {
        Member::new(id, name, join_date, MemberKind::Regular)
    }

    pub fn premium(id: &str, name: &str, join_date: NaiveDate, trainer_fee: f64) -> Result<Self> {
        Member::new(id, name, join_date, MemberKind::premium(trainer_fee)?)
    }

    pub fn with_status(mut self, status: MembershipStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join_date(&self) -> NaiveDate {
        self.join_date
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn history(&self) -> &[PerformanceRecord] {
        &self.history
    }

    pub fn status(&self) -> MembershipStatus {
        self.status
    }

    pub fn set_status(&mut self, status: MembershipStatus) {
        self.status = status;
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = clean_name(name)?;
        Ok(())
    }

    /// Only Premium members carry a trainer fee
    pub fn set_trainer_fee(&mut self, fee: f64) -> Result<()> {
        validate_fee(fee)?;
        match &mut self.kind {
            MemberKind::Premium { trainer_fee } => {
                *trainer_fee = fee;
                Ok(())
            }
            MemberKind::Regular => Err(GymError::invalid(
                "trainer fee",
                format!("member {} is not a Premium member", self.id),
            )),
        }
    }

    pub fn add_performance(&mut self, record: PerformanceRecord) {
        self.history.push(record);
    }

    pub fn achieved_last_goal(&self) -> bool {
        self.history
            .last()
            .map(|record| record.goal_achieved())
            .unwrap_or(false)
    }

    pub fn had_performance(&self, month: u32, year: i32, achieved: bool) -> bool {
        self.history.iter().any(|record| {
            record.month() == month && record.year() == year && record.goal_achieved() == achieved
        })
    }

    /// Multi-line description used by the console listing
    pub fn describe(&self, fees: &FeeSchedule) -> String {
        let mut out = format!("[{} Member] Member ID: {}\n", self.kind.tag(), self.id);
        out.push_str(&format!("  Name: {}\n", self.name));
        out.push_str(&format!("  Joined: {}\n", self.join_date));
        out.push_str(&format!("  Status: {}\n", self.status));
        if let Some(fee) = self.kind.trainer_fee() {
            out.push_str(&format!("  Trainer Fee: ${:.2}\n", fee));
        }
        out.push_str(&format!("  Monthly Fee: ${:.2}\n", fees.monthly_fee(self)));

        if self.history.is_empty() {
            out.push_str("  Performance: None");
        } else {
            out.push_str(&format!("  Performance: {} record(s)", self.history.len()));
            for record in &self.history {
                out.push_str(&format!("\n    - {}", record));
            }
        }
        out
    }
}

/// Normalized form used to index and compare member IDs
pub fn id_key(id: &str) -> String {
    id.trim().to_lowercase()
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GymError::invalid("full name", "cannot be empty"));
    }
    Ok(name.to_string())
}
