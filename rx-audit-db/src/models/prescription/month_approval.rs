use rx_audit_api::{AuditError, AuditResult, MAX_REQUESTED_MONTHS};
use serde::{Deserialize, Serialize};

/// Per-line grid of monthly approvals, months `1..=requested_months`.
///
/// Stored as a bitmask: bit `m - 1` set means month `m` is approved. Bits
/// above `requested_months` are always clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthApprovalMatrix {
    requested_months: u8,
    approved: u16,
}

impl MonthApprovalMatrix {
    /// Creates an all-unapproved grid.
    pub fn new(requested_months: u8) -> AuditResult<Self> {
        if requested_months == 0 || requested_months > MAX_REQUESTED_MONTHS {
            return Err(AuditError::ValidationError(format!(
                "requested months must be between 1 and {MAX_REQUESTED_MONTHS}, got {requested_months}"
            )));
        }
        Ok(Self {
            requested_months,
            approved: 0,
        })
    }

    /// Rebuilds a grid from its stored bitmask.
    pub fn from_bits(requested_months: u8, bits: u16) -> AuditResult<Self> {
        let matrix = Self::new(requested_months)?;
        if bits & !matrix.full_mask() != 0 {
            return Err(AuditError::ValidationError(format!(
                "approval bits {bits:#b} exceed {requested_months} requested months"
            )));
        }
        Ok(Self {
            approved: bits,
            ..matrix
        })
    }

    /// Builds a grid approving exactly the listed months.
    pub fn from_months(requested_months: u8, months: &[u8]) -> AuditResult<Self> {
        let mut matrix = Self::new(requested_months)?;
        for &month in months {
            matrix.set(month, true)?;
        }
        Ok(matrix)
    }

    pub fn requested_months(&self) -> u8 {
        self.requested_months
    }

    pub fn bits(&self) -> u16 {
        self.approved
    }

    fn full_mask(&self) -> u16 {
        (1u16 << self.requested_months) - 1
    }

    fn mask_for(&self, month: u8) -> AuditResult<u16> {
        if month == 0 || month > self.requested_months {
            return Err(AuditError::ValidationError(format!(
                "month {month} is outside 1..={}",
                self.requested_months
            )));
        }
        Ok(1u16 << (month - 1))
    }

    pub fn get(&self, month: u8) -> AuditResult<bool> {
        Ok(self.approved & self.mask_for(month)? != 0)
    }

    pub fn set(&mut self, month: u8, approved: bool) -> AuditResult<()> {
        let mask = self.mask_for(month)?;
        if approved {
            self.approved |= mask;
        } else {
            self.approved &= !mask;
        }
        Ok(())
    }

    pub fn set_all(&mut self, approved: bool) {
        self.approved = if approved { self.full_mask() } else { 0 };
    }

    pub fn approved_count(&self) -> u8 {
        self.approved.count_ones() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.approved == 0
    }

    /// Every requested month approved.
    pub fn is_complete(&self) -> bool {
        self.approved == self.full_mask()
    }

    pub fn approved_months(&self) -> Vec<u8> {
        (1..=self.requested_months)
            .filter(|m| self.approved & (1u16 << (m - 1)) != 0)
            .collect()
    }
}
