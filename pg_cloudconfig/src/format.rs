//! Rendering of computed values into `postgresql.conf` strings.
//!
//! This is the single place where unit semantics collapse into the
//! on-disk textual convention: memory quantities always come out as
//! whole megabytes with an `MB` suffix, whatever unit they carry.

use crate::tuning::SettingValue;

/// Render a setting value in its `postgresql.conf` form.
pub fn format_setting(value: &SettingValue) -> String {
    match value {
        SettingValue::Size(quantity) => format!("{}MB", quantity.to_mb().round() as i64),
        SettingValue::Integer(i) => i.to_string(),
        SettingValue::Float(f) => f.to_string(),
        SettingValue::Text(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Quantity;

    #[test]
    fn test_size_renders_as_whole_megabytes() {
        assert_eq!(
            format_setting(&SettingValue::Size(Quantity::from_mb(128.0))),
            "128MB"
        );
        assert_eq!(
            format_setting(&SettingValue::Size(Quantity::from_gb(4.0))),
            "4096MB"
        );
        assert_eq!(
            format_setting(&SettingValue::Size(Quantity::from_kb(2048.0))),
            "2MB"
        );
        assert_eq!(
            format_setting(&SettingValue::Size(Quantity::from_bytes(1024.0 * 1024.0))),
            "1MB"
        );
    }

    #[test]
    fn test_fractional_size_rounds_to_nearest() {
        assert_eq!(
            format_setting(&SettingValue::Size(Quantity::from_mb(2.4))),
            "2MB"
        );
        assert_eq!(
            format_setting(&SettingValue::Size(Quantity::from_mb(2.6))),
            "3MB"
        );
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(format_setting(&SettingValue::Integer(600)), "600");
        assert_eq!(format_setting(&SettingValue::Float(0.8)), "0.8");
        assert_eq!(
            format_setting(&SettingValue::Text("replica".into())),
            "replica"
        );
    }
}
