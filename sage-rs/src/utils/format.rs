//! Formatting utilities

use humansize::{DECIMAL, format_size};
use sage_fx::{RandomVariable, TICK_DURATION};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a tick count with its duration in game time
pub fn format_ticks(ticks: u32) -> String {
    let seconds = TICK_DURATION.as_secs_f64() * f64::from(ticks);
    format!("{ticks} ({seconds:.2} s)")
}

/// Format a position
pub fn format_vec3(value: [f32; 3]) -> String {
    format!("({:.2}, {:.2}, {:.2})", value[0], value[1], value[2])
}

/// Format a random range, collapsing constant ranges
pub fn format_range(value: &RandomVariable) -> String {
    if value.low == value.high {
        format!("{}", value.low)
    } else {
        format!("{}..{}", value.low, value.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
    }

    #[test]
    fn test_format_ticks() {
        assert_eq!(format_ticks(0), "0 (0.00 s)");
        assert_eq!(format_ticks(30), "30 (1.00 s)");
    }

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(&RandomVariable::new(3.0, 3.0)), "3");
        assert_eq!(format_range(&RandomVariable::new(0.5, 2.0)), "0.5..2");
    }

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3([1.0, -0.5, 0.125]), "(1.00, -0.50, 0.13)");
    }
}
