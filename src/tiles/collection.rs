use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::error::{MosaicError, MosaicResult};
use crate::tiles::tile_spec::TileSpec;
use crate::transform::spec::TransformSpec;

/// Tiles plus a pool of named transforms they may reference.
///
/// Tile order is significant: it is the paint order when the collection is rendered.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedTileCollection {
    /// Shared transform pool keyed by spec id.
    #[serde(default)]
    pub transform_specs: BTreeMap<String, TransformSpec>,
    /// Tiles in paint order.
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
}

impl ResolvedTileCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding `tiles` and no shared transforms.
    pub fn from_tiles(tiles: Vec<TileSpec>) -> Self {
        Self {
            transform_specs: BTreeMap::new(),
            tiles,
        }
    }

    /// Number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tile with the given id.
    pub fn tile(&self, tile_id: &str) -> Option<&TileSpec> {
        self.tiles.iter().find(|t| t.tile_id == tile_id)
    }

    /// Append a tile, or replace the tile with the same id in place.
    pub fn add_tile(&mut self, tile: TileSpec) {
        match self.tiles.iter_mut().find(|t| t.tile_id == tile.tile_id) {
            Some(slot) => *slot = tile,
            None => self.tiles.push(tile),
        }
    }

    /// Add or replace a shared transform. The transform must carry an id.
    pub fn add_transform_spec(&mut self, spec: TransformSpec) -> MosaicResult<()> {
        let Some(id) = spec.id().map(str::to_owned) else {
            return Err(MosaicError::validation(
                "shared transform specs must carry an id",
            ));
        };
        self.transform_specs.insert(id, spec);
        Ok(())
    }

    /// Append a reference to shared transform `ref_id` to every tile's chain.
    ///
    /// With `replace_last`, the last transform of each non-empty chain is replaced instead.
    pub fn add_reference_transform_to_all_tiles(
        &mut self,
        ref_id: &str,
        replace_last: bool,
    ) -> MosaicResult<()> {
        if !self.transform_specs.contains_key(ref_id) {
            return Err(MosaicError::validation(format!(
                "unknown shared transform '{ref_id}'"
            )));
        }
        for tile in &mut self.tiles {
            if replace_last {
                tile.transforms.pop();
            }
            tile.transforms.push(TransformSpec::reference(ref_id));
        }
        Ok(())
    }

    /// Drop shared transforms no tile reaches, directly or through other shared transforms.
    ///
    /// Returns the number of removed specs.
    pub fn remove_unreferenced_transforms(&mut self) -> usize {
        let mut pending = BTreeSet::new();
        for tile in &self.tiles {
            for s in &tile.transforms {
                s.collect_references(&mut pending);
            }
        }

        let mut reachable = BTreeSet::new();
        while let Some(id) = pending.pop_first() {
            if !reachable.insert(id.clone()) {
                continue;
            }
            if let Some(spec) = self.transform_specs.get(&id) {
                let mut next = BTreeSet::new();
                spec.collect_references(&mut next);
                pending.extend(next.into_iter().filter(|r| !reachable.contains(r)));
            }
        }

        let before = self.transform_specs.len();
        self.transform_specs.retain(|id, _| reachable.contains(id));
        before - self.transform_specs.len()
    }

    /// Check every tile and that every reference resolves without cycles.
    pub fn validate(&self) -> MosaicResult<()> {
        for tile in &self.tiles {
            tile.validate()?;
        }
        for spec in self.transform_specs.values() {
            self.resolve_spec(spec, &mut Vec::new())?;
        }
        for tile in &self.tiles {
            for spec in &tile.transforms {
                self.resolve_spec(spec, &mut Vec::new())?;
            }
        }
        Ok(())
    }

    /// Tiles with every reference replaced by the pool entry it names, in paint order.
    pub fn resolve(&self) -> MosaicResult<Vec<TileSpec>> {
        self.tiles
            .iter()
            .map(|tile| {
                let transforms = tile
                    .transforms
                    .iter()
                    .map(|s| self.resolve_spec(s, &mut Vec::new()))
                    .collect::<MosaicResult<Vec<_>>>()
                    .map_err(|e| match e {
                        MosaicError::Transform(msg) => {
                            MosaicError::transform(format!("tile '{}': {msg}", tile.tile_id))
                        }
                        other => other,
                    })?;
                Ok(TileSpec {
                    transforms,
                    ..tile.clone()
                })
            })
            .collect()
    }

    fn resolve_spec(
        &self,
        spec: &TransformSpec,
        visiting: &mut Vec<String>,
    ) -> MosaicResult<TransformSpec> {
        match spec {
            TransformSpec::Reference { ref_id } => {
                if visiting.iter().any(|v| v == ref_id) {
                    return Err(MosaicError::transform(format!(
                        "transform reference cycle through '{ref_id}'"
                    )));
                }
                let target = self.transform_specs.get(ref_id).ok_or_else(|| {
                    MosaicError::transform(format!("unresolved transform reference '{ref_id}'"))
                })?;
                visiting.push(ref_id.clone());
                let out = self.resolve_spec(target, visiting);
                visiting.pop();
                out
            }
            TransformSpec::List { id, specs } => {
                let specs = specs
                    .iter()
                    .map(|s| self.resolve_spec(s, visiting))
                    .collect::<MosaicResult<Vec<_>>>()?;
                Ok(TransformSpec::List {
                    id: id.clone(),
                    specs,
                })
            }
            leaf @ (TransformSpec::Affine { .. } | TransformSpec::Polynomial { .. }) => {
                Ok(leaf.clone())
            }
        }
    }
}

/// Append `spec` as a shared transform to every tile of `collection`, then prune shared transforms
/// that are no longer reachable.
///
/// Returns the number of tiles updated.
#[tracing::instrument(skip_all, fields(tiles = collection.tile_count()))]
pub fn apply_stack_transform(
    collection: &mut ResolvedTileCollection,
    spec: TransformSpec,
) -> MosaicResult<usize> {
    let Some(ref_id) = spec.id().map(str::to_owned) else {
        return Err(MosaicError::validation(
            "stack transform must carry an id",
        ));
    };
    collection.add_transform_spec(spec)?;
    collection.add_reference_transform_to_all_tiles(&ref_id, false)?;
    let removed = collection.remove_unreferenced_transforms();
    tracing::debug!(ref_id = %ref_id, removed, "applied stack transform");
    Ok(collection.tile_count())
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/collection.rs"]
mod tests;
