//! Fixed-point helpers for deterministic combat arithmetic.
//!
//! Damage scaling (beam dissipation, torpedo splits) must come out identical
//! on every client, so fractional math never touches `f32`/`f64`.

use fixed::types::I32F32;

/// Fixed-point number type for all fractional battle math.
///
/// 32 integer bits, 32 fractional bits.
pub type Fixed = I32F32;

/// Convert a whole percentage (0-100) into a fixed-point fraction.
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Scale an integer amount by a fixed-point factor, rounding down.
///
/// Negative factors clamp to zero.
#[must_use]
pub fn scale_floor(amount: u32, factor: Fixed) -> u32 {
    if factor <= Fixed::ZERO {
        return 0;
    }
    let scaled = Fixed::from_num(amount).saturating_mul(factor);
    scaled.floor().to_num::<i64>().clamp(0, i64::from(u32::MAX)) as u32
}

/// Fraction of beam power that survives travelling `distance` squares.
///
/// Beams lose `dissipation_percent` of their power linearly between range 0
/// and their maximum range. A weapon with range 0 never dissipates.
#[must_use]
pub fn beam_falloff(dissipation_percent: u32, distance: u32, range: u32) -> Fixed {
    if range == 0 || distance == 0 {
        return Fixed::ONE;
    }
    let travelled = Fixed::from_num(distance.min(range)) / Fixed::from_num(range);
    Fixed::ONE - percent(dissipation_percent) * travelled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(100), Fixed::ONE);
        assert_eq!(percent(50), Fixed::from_num(1) / Fixed::from_num(2));
        assert_eq!(percent(0), Fixed::ZERO);
    }

    #[test]
    fn test_scale_floor() {
        assert_eq!(scale_floor(100, percent(50)), 50);
        assert_eq!(scale_floor(100, percent(25)), 25);
        assert_eq!(scale_floor(15, percent(50)), 7);
        assert_eq!(scale_floor(15, Fixed::ZERO), 0);
        assert_eq!(scale_floor(15, -Fixed::ONE), 0);
    }

    #[test]
    fn test_beam_falloff() {
        // No loss point blank
        assert_eq!(beam_falloff(10, 0, 3), Fixed::ONE);
        // Full 10% loss at max range
        assert_eq!(scale_floor(100, beam_falloff(10, 3, 3)), 90);
        // Partial loss in between
        assert_eq!(scale_floor(300, beam_falloff(10, 1, 3)), 290);
        // Range 0 weapons never dissipate
        assert_eq!(beam_falloff(10, 0, 0), Fixed::ONE);
    }
}
