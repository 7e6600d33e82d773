use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::AddAssign;

/// Numeric type an accumulator slot holds.
///
/// `Default` must be zero. `total_cmp` must be a total order consistent with
/// `PartialOrd` for every value a query can produce.
pub trait Rsv: Copy + Default + PartialOrd + AddAssign + Debug + Send + Sync + 'static {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Running-total addition. Integer scores saturate at their maximum so a
    /// score never decreases.
    fn accumulate(self, delta: Self) -> Self;
}

macro_rules! impl_rsv_for_integer {
    ($($t:ty),*) => {
        $(
            impl Rsv for $t {
                #[inline]
                fn total_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                #[inline]
                fn accumulate(self, delta: Self) -> Self {
                    self.saturating_add(delta)
                }
            }
        )*
    };
}

macro_rules! impl_rsv_for_float {
    ($($t:ty),*) => {
        $(
            impl Rsv for $t {
                #[inline]
                fn total_cmp(&self, other: &Self) -> Ordering {
                    <$t>::total_cmp(self, other)
                }

                #[inline]
                fn accumulate(self, delta: Self) -> Self {
                    self + delta
                }
            }
        )*
    };
}

impl_rsv_for_integer!(u8, u16, u32, u64, usize, i32, i64);
impl_rsv_for_float!(f32, f64);
