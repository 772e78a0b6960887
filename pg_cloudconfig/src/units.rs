//! Unit-aware memory quantities (bytes through gigabytes).
//!
//! Every sizing calculation works on [`Quantity`] values so that unit
//! confusion cannot creep into a formula. Arithmetic and comparison
//! normalize both operands to bytes before combining them.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Memory unit with binary (1024-based) multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
}

impl Unit {
    /// Number of bytes in one of this unit.
    pub fn bytes(self) -> f64 {
        match self {
            Unit::Byte => 1.0,
            Unit::Kilobyte => 1024.0,
            Unit::Megabyte => 1024.0 * 1024.0,
            Unit::Gigabyte => 1024.0 * 1024.0 * 1024.0,
        }
    }

    /// Suffix used in display output (e.g., "MB").
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Byte => "B",
            Unit::Kilobyte => "KB",
            Unit::Megabyte => "MB",
            Unit::Gigabyte => "GB",
        }
    }
}

/// A numeric value tagged with its memory unit.
///
/// Negative magnitudes can occur as intermediate results of subtraction;
/// the tuning rules treat a negative final result as a defect and report
/// it instead of carrying it forward.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    pub fn from_bytes(bytes: f64) -> Self {
        Self::new(bytes, Unit::Byte)
    }

    pub fn from_kb(kilobytes: f64) -> Self {
        Self::new(kilobytes, Unit::Kilobyte)
    }

    pub fn from_mb(megabytes: f64) -> Self {
        Self::new(megabytes, Unit::Megabyte)
    }

    pub fn from_gb(gigabytes: f64) -> Self {
        Self::new(gigabytes, Unit::Gigabyte)
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn to_bytes(self) -> f64 {
        self.magnitude * self.unit.bytes()
    }

    pub fn to_kb(self) -> f64 {
        self.to_bytes() / Unit::Kilobyte.bytes()
    }

    pub fn to_mb(self) -> f64 {
        self.to_bytes() / Unit::Megabyte.bytes()
    }

    pub fn to_gb(self) -> f64 {
        self.to_bytes() / Unit::Gigabyte.bytes()
    }

    /// Express the same value in a different unit.
    pub fn convert_to(self, unit: Unit) -> Self {
        Self::new(self.to_bytes() / unit.bytes(), unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.to_bytes().partial_cmp(&other.to_bytes())
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        let bytes = self.to_bytes() + rhs.to_bytes();
        Quantity::new(bytes / self.unit.bytes(), self.unit)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        let bytes = self.to_bytes() - rhs.to_bytes();
        Quantity::new(bytes / self.unit.bytes(), self.unit)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude * rhs, self.unit)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude / rhs, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let q = Quantity::from_gb(2.0);
        assert_eq!(q.to_mb(), 2048.0);
        assert_eq!(q.to_kb(), 2048.0 * 1024.0);
        assert_eq!(q.to_bytes(), 2.0 * 1024.0 * 1024.0 * 1024.0);

        let q = Quantity::from_kb(1536.0);
        assert_eq!(q.to_mb(), 1.5);
    }

    #[test]
    fn test_equality_across_units() {
        assert_eq!(Quantity::from_gb(1.0), Quantity::from_mb(1024.0));
        assert_eq!(Quantity::from_mb(1.0), Quantity::from_kb(1024.0));
        assert_eq!(Quantity::from_kb(1.0), Quantity::from_bytes(1024.0));
        assert_ne!(Quantity::from_gb(1.0), Quantity::from_mb(1000.0));
    }

    #[test]
    fn test_ordering_across_units() {
        assert!(Quantity::from_mb(1025.0) > Quantity::from_gb(1.0));
        assert!(Quantity::from_kb(500.0) < Quantity::from_mb(1.0));
        assert!(Quantity::from_bytes(0.0) < Quantity::from_mb(1.0));
    }

    #[test]
    fn test_addition_mixed_units() {
        let sum = Quantity::from_mb(512.0) + Quantity::from_gb(1.0);
        assert_eq!(sum.to_mb(), 1536.0);
        // Result keeps the left operand's unit
        assert_eq!(sum.unit(), Unit::Megabyte);
    }

    #[test]
    fn test_subtraction_can_go_negative() {
        let diff = Quantity::from_mb(100.0) - Quantity::from_mb(300.0);
        assert_eq!(diff.to_mb(), -200.0);
    }

    #[test]
    fn test_scalar_mul_div() {
        let q = Quantity::from_mb(100.0) * 1.5;
        assert_eq!(q.to_mb(), 150.0);

        let q = Quantity::from_gb(1.0) / 8.0;
        assert_eq!(q.to_mb(), 128.0);
    }

    #[test]
    fn test_convert_to() {
        let q = Quantity::from_mb(4096.0).convert_to(Unit::Gigabyte);
        assert_eq!(q.magnitude(), 4.0);
        assert_eq!(q.unit(), Unit::Gigabyte);
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_mb(128.0).to_string(), "128MB");
        assert_eq!(Quantity::from_gb(4.0).to_string(), "4GB");
    }
}
