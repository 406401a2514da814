//! Radial kernels used to turn neighbour distances into density.
//!
//! A kernel maps the distance between a point and one of its neighbours to
//! that neighbour's contribution, which is then scaled by the neighbour's
//! weight. The point itself always contributes its own weight (a unit
//! self-contribution), whatever the kernel.
//!
//! | Kernel | Parameters | Contribution at distance `d` |
//! |---|---|---|
//! | `Flat` | amplitude `a` | `a` |
//! | `Exponential` | amplitude `a`, mean `m` | `a * exp(-m * d)` |
//! | `Gaussian` | amplitude `a`, mean `m`, sigma `s` | `a * exp(-(d - m)^2 / (2 s^2))` |
//! | `Custom` | any `Fn(f32) -> f32` | `f(d)` |

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Caller-supplied distance-to-contribution function.
pub type KernelFn = Arc<dyn Fn(f32) -> f32 + Send + Sync>;

/// Density kernel for a run.
#[derive(Clone)]
pub enum Kernel {
    /// Constant contribution per in-range neighbour.
    Flat {
        /// Contribution of each neighbour.
        amplitude: f32,
    },
    /// Exponential falloff with distance.
    Exponential {
        /// Contribution at distance zero.
        amplitude: f32,
        /// Decay rate.
        mean: f32,
    },
    /// Gaussian falloff around `mean`.
    Gaussian {
        /// Peak contribution.
        amplitude: f32,
        /// Distance of the peak.
        mean: f32,
        /// Width of the bell.
        sigma: f32,
    },
    /// Arbitrary function of distance.
    Custom(KernelFn),
}

impl Kernel {
    /// Flat kernel.
    pub fn flat(amplitude: f32) -> Self {
        Kernel::Flat { amplitude }
    }

    /// Exponential kernel.
    pub fn exponential(amplitude: f32, mean: f32) -> Self {
        Kernel::Exponential { amplitude, mean }
    }

    /// Gaussian kernel.
    pub fn gaussian(amplitude: f32, mean: f32, sigma: f32) -> Self {
        Kernel::Gaussian {
            amplitude,
            mean,
            sigma,
        }
    }

    /// Kernel backed by a user function of distance.
    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Kernel::Custom(Arc::new(f))
    }

    /// Select a built-in kernel by name with a flat parameter list.
    ///
    /// Accepted names are `flat` (1 parameter), `exp` (2: amplitude, mean)
    /// and `gaus` (3: amplitude, mean, sigma). `custom` cannot be built from
    /// numbers alone; use [`Kernel::custom`].
    pub fn from_name(name: &str, params: &[f32]) -> Result<Self> {
        let expect = |kernel: &'static str, expected: usize| {
            if params.len() == expected {
                Ok(())
            } else {
                Err(Error::KernelParameterCount {
                    kernel,
                    expected,
                    found: params.len(),
                })
            }
        };

        let kernel = match name.trim().to_ascii_lowercase().as_str() {
            "flat" => {
                expect("flat", 1)?;
                Kernel::flat(params[0])
            }
            "exp" | "exponential" => {
                expect("exp", 2)?;
                Kernel::exponential(params[0], params[1])
            }
            "gaus" | "gaussian" => {
                expect("gaus", 3)?;
                Kernel::gaussian(params[0], params[1], params[2])
            }
            "custom" => {
                return Err(Error::InvalidParameter {
                    name: "kernel",
                    message: "custom kernels take a function, use Kernel::custom",
                })
            }
            other => return Err(Error::UnknownKernel(other.to_string())),
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Short kernel name.
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Flat { .. } => "flat",
            Kernel::Exponential { .. } => "exp",
            Kernel::Gaussian { .. } => "gaus",
            Kernel::Custom(_) => "custom",
        }
    }

    /// Check the kernel parameters.
    pub fn validate(&self) -> Result<()> {
        let finite = |x: f32| x.is_finite();
        match *self {
            Kernel::Flat { amplitude } if !finite(amplitude) => Err(Error::InvalidParameter {
                name: "amplitude",
                message: "must be finite",
            }),
            Kernel::Exponential { amplitude, mean } if !finite(amplitude) || !finite(mean) => {
                Err(Error::InvalidParameter {
                    name: "exp kernel",
                    message: "amplitude and mean must be finite",
                })
            }
            Kernel::Gaussian {
                amplitude,
                mean,
                sigma,
            } => {
                if !finite(amplitude) || !finite(mean) {
                    return Err(Error::InvalidParameter {
                        name: "gaus kernel",
                        message: "amplitude and mean must be finite",
                    });
                }
                if !finite(sigma) || sigma <= 0.0 {
                    return Err(Error::InvalidParameter {
                        name: "sigma",
                        message: "must be positive",
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Contribution of a neighbour at distance `distance`.
    #[inline]
    pub fn eval(&self, distance: f32) -> f32 {
        match self {
            Kernel::Flat { amplitude } => *amplitude,
            Kernel::Exponential { amplitude, mean } => amplitude * (-mean * distance).exp(),
            Kernel::Gaussian {
                amplitude,
                mean,
                sigma,
            } => {
                let z = distance - mean;
                amplitude * (-(z * z) / (2.0 * sigma * sigma)).exp()
            }
            Kernel::Custom(f) => f(distance),
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::flat(0.5)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Flat { amplitude } => {
                f.debug_struct("Flat").field("amplitude", amplitude).finish()
            }
            Kernel::Exponential { amplitude, mean } => f
                .debug_struct("Exponential")
                .field("amplitude", amplitude)
                .field("mean", mean)
                .finish(),
            Kernel::Gaussian {
                amplitude,
                mean,
                sigma,
            } => f
                .debug_struct("Gaussian")
                .field("amplitude", amplitude)
                .field("mean", mean)
                .field("sigma", sigma)
                .finish(),
            Kernel::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
