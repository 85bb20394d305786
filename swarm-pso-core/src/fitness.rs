//! Benchmark fitness functions
//!
//! Lower is better. The set of functions is closed: a name is turned into a
//! [`Benchmark`] once, at the boundary, and every later evaluation dispatches
//! on the enum.

use core::f64::consts::PI;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Benchmark function to minimize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Benchmark {
    /// `(x0 + 2x1 - 7)^2 + (2x0 + x1 - 5)^2`, two dimensions
    Booth,
    /// `10d + sum(xi^2 - 10 cos(2 pi xi))`
    Rastrigin,
    /// `-|sin(x0) cos(x1) exp(|1 - sqrt(x0^2 + x1^2) / pi|)|`, two dimensions
    HolderTable,
    /// `-(x1 + 47) sin(sqrt|x0/2 + x1 + 47|) - x0 sin(sqrt|x0 - (x1 + 47)|)`
    ///
    /// Reads the first two coordinates; any further ones are ignored.
    Eggholder,
    /// `418.9829 d - sum(xi sin(sqrt|xi|))`
    Schwefel,
}

impl Benchmark {
    /// All benchmarks, in name order of the command line
    pub const ALL: [Benchmark; 5] = [
        Benchmark::Booth,
        Benchmark::Rastrigin,
        Benchmark::HolderTable,
        Benchmark::Eggholder,
        Benchmark::Schwefel,
    ];

    /// Name used on the command line and in reports
    pub const fn name(self) -> &'static str {
        match self {
            Benchmark::Booth => "booth",
            Benchmark::Rastrigin => "rastrigin",
            Benchmark::HolderTable => "holder_table",
            Benchmark::Eggholder => "eggholder",
            Benchmark::Schwefel => "schwefel",
        }
    }

    /// Dimension the function is restricted to, if any
    pub const fn fixed_dimension(self) -> Option<usize> {
        match self {
            Benchmark::Booth | Benchmark::HolderTable => Some(2),
            Benchmark::Rastrigin | Benchmark::Eggholder | Benchmark::Schwefel => None,
        }
    }

    /// Smallest dimension the function can be evaluated in
    pub const fn min_dimension(self) -> usize {
        match self {
            Benchmark::Booth | Benchmark::HolderTable | Benchmark::Eggholder => 2,
            Benchmark::Rastrigin | Benchmark::Schwefel => 1,
        }
    }

    /// Reject dimensions the function is not defined for
    pub fn check_dimension(self, dim: usize) -> Result<()> {
        if dim == 0 {
            return Err(Error::InvalidParameter("dimension must be positive"));
        }
        let (expected, accepted) = match self.fixed_dimension() {
            Some(fixed) => (fixed, dim == fixed),
            None => (self.min_dimension(), dim >= self.min_dimension()),
        };
        if accepted {
            Ok(())
        } else {
            Err(Error::InvalidDimensionForFunction {
                function: self,
                expected,
                dim,
            })
        }
    }

    /// Usual search domain `(xmin, xmax)`, applied to every coordinate
    pub const fn domain(self) -> (f64, f64) {
        match self {
            Benchmark::Booth | Benchmark::HolderTable => (-10.0, 10.0),
            Benchmark::Rastrigin => (-5.12, 5.12),
            Benchmark::Eggholder => (-512.0, 512.0),
            Benchmark::Schwefel => (-500.0, 500.0),
        }
    }

    /// Documented global minimum value
    pub const fn known_minimum(self) -> f64 {
        match self {
            Benchmark::Booth | Benchmark::Rastrigin | Benchmark::Schwefel => 0.0,
            Benchmark::HolderTable => -19.2085,
            Benchmark::Eggholder => -959.6407,
        }
    }

    /// A point where the documented minimum is reached
    ///
    /// For booth and holder table `dim` is ignored. Eggholder pads the
    /// coordinates it does not read with zeros.
    pub fn minimizer(self, dim: usize) -> Vec<f64> {
        match self {
            Benchmark::Booth => vec![1.0, 3.0],
            Benchmark::Rastrigin => vec![0.0; dim],
            Benchmark::HolderTable => vec![8.05502, 9.66459],
            Benchmark::Eggholder => {
                let mut x = vec![0.0; dim.max(2)];
                x[0] = 512.0;
                x[1] = 404.2319;
                x
            }
            Benchmark::Schwefel => vec![420.9687; dim],
        }
    }

    /// Fitness of `x`
    ///
    /// Booth, holder table and eggholder read `x[0]` and `x[1]` only; callers
    /// validate the dimension once with [`Benchmark::check_dimension`], or go
    /// through the checked [`evaluate`].
    ///
    /// # Panics
    ///
    /// Panics if `x` is shorter than [`Benchmark::min_dimension`].
    #[inline]
    pub fn evaluate(self, x: &[f64]) -> f64 {
        match self {
            Benchmark::Booth => booth(x[0], x[1]),
            Benchmark::Rastrigin => rastrigin(x),
            Benchmark::HolderTable => holder_table(x[0], x[1]),
            Benchmark::Eggholder => eggholder(x[0], x[1]),
            Benchmark::Schwefel => schwefel(x),
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Benchmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Benchmark::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| Error::UnknownFunction(s.to_string()))
    }
}

/// Evaluate the function called `name` at `position`
///
/// Checks the name and the dimension on every call; the optimizer resolves
/// both once and calls [`Benchmark::evaluate`] instead.
pub fn evaluate(name: &str, position: &[f64]) -> Result<f64> {
    let benchmark: Benchmark = name.parse()?;
    benchmark.check_dimension(position.len())?;
    Ok(benchmark.evaluate(position))
}

fn booth(x0: f64, x1: f64) -> f64 {
    (x0 + 2.0 * x1 - 7.0).powi(2) + (2.0 * x0 + x1 - 5.0).powi(2)
}

fn rastrigin(x: &[f64]) -> f64 {
    10.0 * x.len() as f64
        + x.iter()
            .map(|&xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
            .sum::<f64>()
}

fn holder_table(x0: f64, x1: f64) -> f64 {
    let radial = (1.0 - (x0 * x0 + x1 * x1).sqrt() / PI).abs();
    -(x0.sin() * x1.cos() * radial.exp()).abs()
}

fn eggholder(x0: f64, x1: f64) -> f64 {
    let y = x1 + 47.0;
    -y * (x0 / 2.0 + y).abs().sqrt().sin() - x0 * (x0 - y).abs().sqrt().sin()
}

fn schwefel(x: &[f64]) -> f64 {
    418.9829 * x.len() as f64 - x.iter().map(|&xi| xi * xi.abs().sqrt().sin()).sum::<f64>()
}
