//! Node activity values and the alphabets reversible rules work over.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

/// Anything a node can hold: a symbol, a number, or a composite value.
///
/// The engine only needs to copy activities and compare them between steps.
pub trait Activity: Clone + PartialEq + fmt::Debug {}

impl<T: Clone + PartialEq + fmt::Debug> Activity for T {}

/// Value set used to undo the effect of the state two steps back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "k")]
pub enum Alphabet {
    /// `{0, 1}`, combined by XOR.
    Binary,
    /// `{0, .., k-1}`, combined by subtraction modulo `k`.
    Cyclic(u32),
    /// `{-1, +1}`, combined by multiplication.
    Bipolar,
}

impl Alphabet {
    /// Modulus for the additive alphabets.
    fn modulus(self) -> RuleResult<i64> {
        match self {
            Alphabet::Binary => Ok(2),
            Alphabet::Cyclic(0) => Err(RuleError::msg("cyclic alphabet needs k >= 1")),
            Alphabet::Cyclic(k) => Ok(i64::from(k)),
            Alphabet::Bipolar => Err(RuleError::msg("bipolar alphabet has no modulus")),
        }
    }
}

/// Activities that can be combined with their value two steps back.
///
/// For a candidate `c` and prior `p`, the combination is invertible in `c`,
/// so running the same rule with the two last states swapped retraces the
/// trajectory.
pub trait ReversibleActivity: Activity + Sized {
    fn reverse_combine(candidate: &Self, prior: &Self, alphabet: Alphabet) -> RuleResult<Self>;
}

macro_rules! impl_reversible_int {
    ($($ty:ty),*) => {$(
        impl ReversibleActivity for $ty {
            fn reverse_combine(candidate: &Self, prior: &Self, alphabet: Alphabet) -> RuleResult<Self> {
                let (c, p) = (*candidate as i64, *prior as i64);
                let combined = match alphabet {
                    Alphabet::Bipolar => {
                        if !is_bipolar(c) || !is_bipolar(p) {
                            return Err(RuleError::msg(format!(
                                "bipolar alphabet expects -1 or 1, got {c} and {p}"
                            )));
                        }
                        c * p
                    }
                    _ => (c - p).rem_euclid(alphabet.modulus()?),
                };
                <$ty>::try_from(combined).map_err(|_| {
                    RuleError::msg(format!(
                        "{combined} is not representable as {}",
                        stringify!($ty)
                    ))
                })
            }
        }
    )*};
}

impl_reversible_int!(u8, u16, u32, i8, i16, i32, i64);

impl ReversibleActivity for f64 {
    fn reverse_combine(candidate: &Self, prior: &Self, alphabet: Alphabet) -> RuleResult<Self> {
        match alphabet {
            Alphabet::Bipolar => Ok(candidate * prior),
            _ => Ok((candidate - prior).rem_euclid(alphabet.modulus()? as f64)),
        }
    }
}

fn is_bipolar(v: i64) -> bool {
    v == 1 || v == -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_is_xor() {
        for (c, p) in [(0u8, 0u8), (0, 1), (1, 0), (1, 1)] {
            let got = u8::reverse_combine(&c, &p, Alphabet::Binary).unwrap();
            assert_eq!(got, c ^ p);
        }
    }

    #[test]
    fn test_cyclic_subtracts_modulo_k() {
        assert_eq!(u8::reverse_combine(&1, &2, Alphabet::Cyclic(3)).unwrap(), 2);
        assert_eq!(i32::reverse_combine(&4, &4, Alphabet::Cyclic(5)).unwrap(), 0);
        assert!(u8::reverse_combine(&1, &0, Alphabet::Cyclic(0)).is_err());
    }

    #[test]
    fn test_bipolar_multiplies() {
        assert_eq!(i8::reverse_combine(&-1, &-1, Alphabet::Bipolar).unwrap(), 1);
        assert_eq!(i8::reverse_combine(&1, &-1, Alphabet::Bipolar).unwrap(), -1);
        assert!(i8::reverse_combine(&0, &1, Alphabet::Bipolar).is_err());
        assert_eq!(f64::reverse_combine(&-1.0, &1.0, Alphabet::Bipolar).unwrap(), -1.0);
    }

    #[test]
    fn test_combination_is_invertible_in_the_candidate() {
        let k = 4;
        for c in 0..k {
            for p in 0..k {
                let x = u8::reverse_combine(&c, &p, Alphabet::Cyclic(k as u32)).unwrap();
                let back = (x + p) % k;
                assert_eq!(back, c);
            }
        }
    }

    #[test]
    fn test_alphabet_serde_shape() {
        let json = serde_json::to_string(&Alphabet::Cyclic(3)).unwrap();
        assert_eq!(json, r#"{"kind":"cyclic","k":3}"#);
        let binary: Alphabet = serde_json::from_str(r#"{"kind":"binary"}"#).unwrap();
        assert_eq!(binary, Alphabet::Binary);
    }
}
