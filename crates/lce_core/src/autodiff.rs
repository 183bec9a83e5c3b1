use crate::traits::{State, TangentVector, VectorField, DIM};
use num_traits::{Num, One, Zero};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Simple Dual Number for Forward Mode AD
/// val: real part
/// eps: infinitesimal part
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dual {
    pub val: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(val: f64, eps: f64) -> Self {
        Self { val, eps }
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.eps == 0.0
    }
}

impl One for Dual {
    fn one() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let denom = rhs.val * rhs.val;
        Self::new(
            self.val / rhs.val,
            (self.eps * rhs.val - self.val * rhs.eps) / denom,
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

impl Rem for Dual {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        // Piecewise constant offset, so the derivative passes through.
        Self::new(self.val % rhs.val, self.eps)
    }
}

impl Num for Dual {
    type FromStrRadixErr = ();
    fn from_str_radix(str: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        f64::from_str_radix(str, radix)
            .map(|v| Self::new(v, 0.0))
            .map_err(|_| ())
    }
}

/// Scalar arithmetic a field needs in order to be evaluated both on plain
/// floats and on dual numbers.
pub trait FieldScalar: Num + Copy + Neg<Output = Self> + Debug {
    /// Lifts a coefficient into the scalar type with zero derivative.
    fn constant(value: f64) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn exp(self) -> Self;
}

impl FieldScalar for f64 {
    fn constant(value: f64) -> Self {
        value
    }
    fn sin(self) -> Self {
        f64::sin(self)
    }
    fn cos(self) -> Self {
        f64::cos(self)
    }
    fn exp(self) -> Self {
        f64::exp(self)
    }
}

impl FieldScalar for Dual {
    fn constant(value: f64) -> Self {
        Self::new(value, 0.0)
    }
    fn sin(self) -> Self {
        Self::new(self.val.sin(), self.eps * self.val.cos())
    }
    fn cos(self) -> Self {
        Self::new(self.val.cos(), -self.eps * self.val.sin())
    }
    fn exp(self) -> Self {
        let e = self.val.exp();
        Self::new(e, e * self.eps)
    }
}

/// A flow written once, generically over the scalar type.
pub trait GenericField {
    fn eval<T: FieldScalar>(&self, state: &[T; DIM]) -> [T; DIM];

    fn contraction_rate(&self) -> Option<f64> {
        None
    }
}

// --- Linearization Wrapper ---

/// Turns a [`GenericField`] into a [`VectorField`] whose linearization is the
/// exact Jacobian-vector product obtained by seeding the dual parts with the
/// tangent vector.
#[derive(Debug, Clone, Copy)]
pub struct Linearized<F>(pub F);

impl<F: GenericField> VectorField for Linearized<F> {
    fn derivative(&self, state: &State) -> State {
        State::from(self.0.eval(&[state.x, state.y, state.z]))
    }

    fn linearized_derivative(&self, state: &State, tangent: &TangentVector) -> TangentVector {
        let seeded = [
            Dual::new(state.x, tangent.x),
            Dual::new(state.y, tangent.y),
            Dual::new(state.z, tangent.z),
        ];
        let out = self.0.eval(&seeded);
        TangentVector::new(out[0].eps, out[1].eps, out[2].eps)
    }

    fn contraction_rate(&self) -> Option<f64> {
        self.0.contraction_rate()
    }
}
