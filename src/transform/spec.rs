use std::collections::BTreeSet;

use crate::foundation::core::Affine;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::transform::chain::TransformChain;
use crate::transform::coordinate::{CoordinateTransform, Polynomial2D};

/// Serializable description of one step in a tile's transform chain.
///
/// `Reference` entries point into a shared pool (see [`crate::ResolvedTileCollection`]) and must
/// be resolved before a chain can be built for rendering.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformSpec {
    /// Affine map `x' = a*x + c*y + e`, `y' = b*x + d*y + f` with `coeffs = [a, b, c, d, e, f]`.
    Affine {
        /// Optional pool identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Affine coefficients in `[a, b, c, d, e, f]` order.
        coeffs: [f64; 6],
    },
    /// 2D polynomial map; see [`Polynomial2D`] for the monomial order.
    Polynomial {
        /// Optional pool identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Coefficients producing `x'`.
        x_coeffs: Vec<f64>,
        /// Coefficients producing `y'`.
        y_coeffs: Vec<f64>,
    },
    /// Pointer to a named spec in a shared transform pool.
    Reference {
        /// Identifier of the referenced pool entry.
        ref_id: String,
    },
    /// Nested sequential list, applied in order.
    List {
        /// Optional pool identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Child specs applied left to right.
        specs: Vec<TransformSpec>,
    },
}

impl TransformSpec {
    /// Anonymous affine spec.
    pub fn affine(a: Affine) -> Self {
        Self::Affine {
            id: None,
            coeffs: a.as_coeffs(),
        }
    }

    /// Anonymous translation spec.
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::Affine {
            id: None,
            coeffs: [1.0, 0.0, 0.0, 1.0, dx, dy],
        }
    }

    /// Reference to pool entry `ref_id`.
    pub fn reference(ref_id: impl Into<String>) -> Self {
        Self::Reference {
            ref_id: ref_id.into(),
        }
    }

    /// Return a copy of this spec carrying pool identifier `id`.
    ///
    /// References cannot carry an identifier of their own and are returned unchanged.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        let id = Some(id.into());
        match self {
            Self::Affine { coeffs, .. } => Self::Affine { id, coeffs },
            Self::Polynomial {
                x_coeffs, y_coeffs, ..
            } => Self::Polynomial {
                id,
                x_coeffs,
                y_coeffs,
            },
            Self::List { specs, .. } => Self::List { id, specs },
            r @ Self::Reference { .. } => r,
        }
    }

    /// Pool identifier, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Affine { id, .. } | Self::Polynomial { id, .. } | Self::List { id, .. } => {
                id.as_deref()
            }
            Self::Reference { .. } => None,
        }
    }

    /// Collect the ids of every reference reachable inside this spec (not following the pool).
    pub fn collect_references(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Reference { ref_id } => {
                out.insert(ref_id.clone());
            }
            Self::List { specs, .. } => {
                for s in specs {
                    s.collect_references(out);
                }
            }
            Self::Affine { .. } | Self::Polynomial { .. } => {}
        }
    }

    /// Return `true` when no reference remains anywhere inside this spec.
    pub fn is_fully_resolved(&self) -> bool {
        match self {
            Self::Reference { .. } => false,
            Self::List { specs, .. } => specs.iter().all(Self::is_fully_resolved),
            Self::Affine { .. } | Self::Polynomial { .. } => true,
        }
    }

    /// Flatten this spec into `chain`.
    ///
    /// Fails on any unresolved reference or malformed coefficients.
    pub fn append_to(&self, chain: &mut TransformChain) -> MosaicResult<()> {
        match self {
            Self::Affine { coeffs, .. } => {
                if coeffs.iter().any(|c| !c.is_finite()) {
                    return Err(MosaicError::transform(
                        "affine coefficients must be finite",
                    ));
                }
                chain.push(CoordinateTransform::Affine(Affine::new(*coeffs)));
            }
            Self::Polynomial {
                x_coeffs, y_coeffs, ..
            } => {
                let poly = Polynomial2D::new(x_coeffs.clone(), y_coeffs.clone())?;
                chain.push(CoordinateTransform::Polynomial(poly));
            }
            Self::Reference { ref_id } => {
                return Err(MosaicError::transform(format!(
                    "unresolved transform reference '{ref_id}'"
                )));
            }
            Self::List { specs, .. } => {
                for s in specs {
                    s.append_to(chain)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/spec.rs"]
mod tests;
