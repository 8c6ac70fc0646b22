//! Complex-argument Bessel, Hankel and Airy functions.
//!
//! Provides J, Y, I and K of non-negative real order (negative orders through
//! the reflection formulas), Hankel functions of both kinds, and Ai, Ai', Bi,
//! Bi', all for any complex argument. Each call picks among power series,
//! asymptotic expansions for large |z|, Miller backward recurrence, Wronskian
//! normalization, and uniform asymptotic expansions for large order, and
//! guards every step against overflow and underflow.
//!
//! Every function can return the value multiplied by a compensating
//! exponential (see [`Scaling`]) so that results stay representable far into
//! the half-planes where the unscaled value would overflow or underflow.
//!
//! # Example
//! ```
//! use num_complex::Complex64;
//! use zbessel::{bessel_k, Scaling};
//!
//! let k = bessel_k(0.0, Complex64::new(1.0, 0.0), Scaling::Unscaled).unwrap();
//! assert!((k.value.re - 0.42102443824070834).abs() < 1e-15);
//! ```
//!
//! # Features
//! - `std` (default): links the standard library, implies `alloc`.
//! - `alloc`: enables the `*_seq` functions returning a `Vec`.
//! - `libm`: floating-point math through `libm` for `no_std` targets.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub(crate) mod algo;
mod complex;
pub mod error;
pub mod machine;
pub mod types;

mod airy;
mod hankel;
mod modified;
mod ordinary;

pub use error::Error;
pub use machine::MachineConstants;
#[cfg(feature = "alloc")]
pub use types::BesselSequence;
pub use types::{Accuracy, AiryKind, AiryOutput, BesselOutput, HankelKind, Scaling};

// ── Modified Bessel functions ──

pub use modified::{bessel_i, bessel_i_into, bessel_k, bessel_k_into};
#[cfg(feature = "alloc")]
pub use modified::{bessel_i_seq, bessel_k_seq};

// ── Ordinary Bessel functions ──

pub use ordinary::{bessel_j, bessel_j_into, bessel_y, bessel_y_into};
#[cfg(feature = "alloc")]
pub use ordinary::{bessel_j_seq, bessel_y_seq};

// ── Hankel functions ──

pub use hankel::{hankel, hankel1, hankel2, hankel_into};
#[cfg(feature = "alloc")]
pub use hankel::hankel_seq;

// ── Airy functions ──

pub use airy::{
    ai, ai_prime, ai_prime_scaled, ai_scaled, airy, bi, bi_prime, bi_prime_scaled, bi_scaled,
};
