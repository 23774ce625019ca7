//! Manifest loading: discovering a unit's initializers.

use ori_machine::Procedure;

use crate::errors::ManifestError;
use crate::unit::Unit;

/// Initializers declared by `unit`, in declaration order.
///
/// Runs the unit's debug-info procedure when it has one. Every error is
/// reported here; callers only decide whether to continue without
/// initializers.
pub fn load_manifest(unit: &dyn Unit) -> Result<Vec<Procedure>, ManifestError> {
    let Some(manifest) = unit.manifest() else {
        tracing::debug!(unit = unit.name(), "unit has no manifest");
        return Err(ManifestError::Missing {
            unit: unit.name().to_string(),
        });
    };

    match manifest.debug_info() {
        Some(debug_info) => debug_info(),
        None => tracing::warn!(unit = unit.name(), "module does not provide debug info"),
    }

    let Some(top_level) = manifest.top_level() else {
        tracing::error!(unit = unit.name(), "cannot get top-level procedures");
        return Err(ManifestError::MissingTopLevel {
            unit: unit.name().to_string(),
        });
    };

    let procedures = top_level();
    tracing::debug!(unit = unit.name(), count = procedures.len(), "loaded manifest");
    Ok(procedures)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
