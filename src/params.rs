//! Tunable numeric parameters.
//!
//! Configuration structs declare their numeric fields through [`tunable!`],
//! which records an inclusive range, a display precision, and whether the
//! value is a distance that scales with scan resolution. Nested configs are
//! reached through dotted paths such as `segmentation.contrast_vote.radius`.

use crate::util::{FingerError, FingerResult};

/// Resolution the default parameter values are calibrated for.
pub const REFERENCE_DPI: u32 = 500;

/// One enumerated parameter with its current value.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Dotted path accepted by [`Tunable::set_parameter`].
    pub path: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    /// Decimal places that are meaningful for this value.
    pub precision: u32,
    /// Whether the value is rescaled by [`Tunable::adjust_for_dpi`].
    pub dpi_scaled: bool,
}

/// Configuration with enumerable, range-checked parameters.
pub trait Tunable {
    /// All parameters, nested ones included, in declaration order.
    fn parameters(&self) -> Vec<Parameter>;

    /// Sets the parameter at `path`, rejecting values outside its range.
    fn set_parameter(&mut self, path: &str, value: f64) -> FingerResult<()>;

    /// Checks every parameter against its declared range.
    fn validate(&self) -> FingerResult<()>;

    /// Scales resolution-dependent distances by `ratio`.
    fn adjust_for_dpi(&mut self, ratio: f64);
}

/// Ratio between `dpi` and the calibration resolution.
pub fn dpi_ratio(dpi: u32) -> FingerResult<f64> {
    if dpi == 0 {
        return Err(FingerError::InvalidDpi(dpi));
    }
    Ok(dpi as f64 / REFERENCE_DPI as f64)
}

/// Numeric field types a tunable parameter can have.
pub(crate) trait Scalar: Copy {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;

    fn scaled(self, ratio: f64) -> Self {
        Self::from_f64(self.to_f64() * ratio)
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),*) => {
        $(impl Scalar for $ty {
            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value.round() as $ty
            }
        })*
    };
}

integer_scalar!(u8, u32, usize, i32);

impl Scalar for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Scalar for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

pub(crate) fn check_range(name: &str, value: f64, lower: f64, upper: f64) -> FingerResult<()> {
    if value.is_nan() || value < lower || value > upper {
        return Err(FingerError::ParameterOutOfRange {
            name: name.to_string(),
            value,
            lower,
            upper,
        });
    }
    Ok(())
}

/// Prefixes parameter names in `err` with the nested config's name.
pub(crate) fn qualify(prefix: &str, err: FingerError) -> FingerError {
    match err {
        FingerError::ParameterOutOfRange {
            name,
            value,
            lower,
            upper,
        } => FingerError::ParameterOutOfRange {
            name: format!("{prefix}.{name}"),
            value,
            lower,
            upper,
        },
        FingerError::UnknownParameter(name) => {
            FingerError::UnknownParameter(format!("{prefix}.{name}"))
        }
        other => other,
    }
}

/// Implements [`Tunable`] for a config struct.
///
/// ```ignore
/// tunable!(VoteConfig {
///     param radius: 1 ..= 50, precision 0, dpi true;
///     param majority: 0.5 ..= 1.0, precision 2, dpi false;
/// });
/// ```
///
/// `nested field;` entries follow the `param` entries and delegate to a
/// field that itself implements [`Tunable`].
macro_rules! tunable {
    ($ty:ty {
        $(param $field:ident : $lower:literal ..= $upper:literal, precision $precision:literal, dpi $dpi:literal;)*
        $(nested $child:ident;)*
    }) => {
        impl $crate::params::Tunable for $ty {
            fn parameters(&self) -> Vec<$crate::params::Parameter> {
                #[allow(unused_mut)]
                let mut parameters = Vec::new();
                $(parameters.push($crate::params::Parameter {
                    path: stringify!($field).to_string(),
                    value: $crate::params::Scalar::to_f64(self.$field),
                    lower: $lower as f64,
                    upper: $upper as f64,
                    precision: $precision,
                    dpi_scaled: $dpi,
                });)*
                $(for mut parameter in self.$child.parameters() {
                    parameter.path = format!("{}.{}", stringify!($child), parameter.path);
                    parameters.push(parameter);
                })*
                parameters
            }

            fn set_parameter(&mut self, path: &str, value: f64) -> $crate::util::FingerResult<()> {
                $(if path == stringify!($field) {
                    $crate::params::check_range(path, value, $lower as f64, $upper as f64)?;
                    self.$field = $crate::params::Scalar::from_f64(value);
                    return Ok(());
                })*
                $(if let Some(rest) = path.strip_prefix(concat!(stringify!($child), ".")) {
                    return self
                        .$child
                        .set_parameter(rest, value)
                        .map_err(|err| $crate::params::qualify(stringify!($child), err));
                })*
                let _ = value;
                Err($crate::util::FingerError::UnknownParameter(path.to_string()))
            }

            fn validate(&self) -> $crate::util::FingerResult<()> {
                $($crate::params::check_range(
                    stringify!($field),
                    $crate::params::Scalar::to_f64(self.$field),
                    $lower as f64,
                    $upper as f64,
                )?;)*
                $(self
                    .$child
                    .validate()
                    .map_err(|err| $crate::params::qualify(stringify!($child), err))?;)*
                Ok(())
            }

            fn adjust_for_dpi(&mut self, ratio: f64) {
                $(if $dpi {
                    self.$field = $crate::params::Scalar::scaled(self.$field, ratio);
                })*
                $(self.$child.adjust_for_dpi(ratio);)*
                let _ = ratio;
            }
        }
    };
}

pub(crate) use tunable;

#[cfg(test)]
mod tests {
    use super::{dpi_ratio, Tunable};
    use crate::util::FingerError;

    #[derive(Clone, Debug, Default)]
    struct Inner {
        radius: usize,
    }

    tunable!(Inner {
        param radius: 1 ..= 20, precision 0, dpi true;
    });

    #[derive(Clone, Debug, Default)]
    struct Outer {
        weight: f64,
        inner: Inner,
    }

    tunable!(Outer {
        param weight: 0.0 ..= 1.0, precision 2, dpi false;
        nested inner;
    });

    #[test]
    fn nested_paths_are_enumerated_and_settable() {
        let mut config = Outer::default();
        let paths: Vec<_> = config.parameters().into_iter().map(|p| p.path).collect();
        assert_eq!(paths, vec!["weight", "inner.radius"]);

        config.set_parameter("inner.radius", 7.0).unwrap();
        assert_eq!(config.inner.radius, 7);
        config.set_parameter("weight", 0.25).unwrap();
        assert_eq!(config.weight, 0.25);
    }

    #[test]
    fn out_of_range_names_full_path() {
        let mut config = Outer::default();
        match config.set_parameter("inner.radius", 30.0) {
            Err(FingerError::ParameterOutOfRange { name, .. }) => assert_eq!(name, "inner.radius"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            config.set_parameter("inner.missing", 1.0),
            Err(FingerError::UnknownParameter(name)) if name == "inner.missing"
        ));
        assert!(config.validate().is_err(), "radius 0 is below range");
    }

    #[test]
    fn dpi_scaling_touches_tagged_fields_only() {
        let mut config = Outer {
            weight: 0.5,
            inner: Inner { radius: 10 },
        };
        config.adjust_for_dpi(dpi_ratio(1000).unwrap());
        assert_eq!(config.inner.radius, 20);
        assert_eq!(config.weight, 0.5);
        assert!(matches!(dpi_ratio(0), Err(FingerError::InvalidDpi(0))));
    }
}
