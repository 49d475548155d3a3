//! Prime-form string codec: one character per pitch class, `T` = 10, `E` = 11

use crate::error::{PcSetError, Result};
use crate::pcset::PitchClass;

/// Values outside 0..=11 are reduced mod 12
pub fn pc_to_char(pc: PitchClass) -> char {
    match pc % 12 {
        10 => 'T',
        11 => 'E',
        digit => char::from(b'0' + digit),
    }
}

pub fn char_to_pc(ch: char) -> Result<PitchClass> {
    match ch {
        'T' | 't' | 'A' | 'a' => Ok(10),
        'E' | 'e' | 'B' | 'b' => Ok(11),
        _ => ch
            .to_digit(10)
            .map(|d| d as PitchClass)
            .ok_or(PcSetError::InvalidPrimeFormChar(ch)),
    }
}

/// Encode a pitch-class sequence. Values outside 0..=11 are reduced mod 12.
pub fn to_pf_str(pcs: &[PitchClass]) -> String {
    pcs.iter().map(|&pc| pc_to_char(pc)).collect()
}

pub fn from_pf_str(s: &str) -> Result<Vec<PitchClass>> {
    s.chars().map(char_to_pc).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcset::PcSet;

    #[test]
    fn test_encode() {
        assert_eq!(to_pf_str(&[0, 1, 4, 6]), "0146");
        assert_eq!(to_pf_str(&[0, 2, 4, 6, 8, 10]), "02468T");
        assert_eq!(to_pf_str(&(0..12).collect::<Vec<u8>>()), "0123456789TE");
        assert_eq!(to_pf_str(&[]), "");
    }

    #[test]
    fn test_every_byte_maps_to_a_pitch_class_char() {
        for pc in 0..=u8::MAX {
            let ch = pc_to_char(pc);
            assert_eq!(char_to_pc(ch).unwrap(), pc % 12);
        }
        assert_eq!(pc_to_char(22), 'T');
        assert_eq!(pc_to_char(23), 'E');
    }

    #[test]
    fn test_decode() {
        assert_eq!(from_pf_str("0146").unwrap(), vec![0, 1, 4, 6]);
        assert_eq!(from_pf_str("013568T").unwrap(), vec![0, 1, 3, 5, 6, 8, 10]);
        assert_eq!(from_pf_str("9te").unwrap(), vec![9, 10, 11]);
        assert_eq!(from_pf_str("AB").unwrap(), vec![10, 11]);
        assert!(matches!(from_pf_str("01X"), Err(PcSetError::InvalidPrimeFormChar('X'))));
    }

    #[test]
    fn test_round_trip_over_all_prime_forms() {
        for mask in 0..=0x0FFFu16 {
            let pf = PcSet::from_mask(mask).prime_form();
            assert_eq!(from_pf_str(&to_pf_str(&pf)).unwrap(), pf);
        }
    }
}
