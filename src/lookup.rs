use crate::types::BlockArea;
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Point;
use rstar::{RTree, RTreeObject, AABB};

// Wrapper for RTree indexing
struct IndexedArea {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedArea {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Bounding-box index over block polygons, answering "which block is here".
pub struct AreaIndex {
    tree: RTree<IndexedArea>,
}

impl AreaIndex {
    pub fn build(areas: &[BlockArea]) -> Self {
        let items: Vec<IndexedArea> = areas
            .iter()
            .enumerate()
            .filter_map(|(index, area)| {
                // empty geometries have no bounding box
                let rect = area.geometry.bounding_rect()?;
                Some(IndexedArea {
                    index,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();
        Self { tree: RTree::bulk_load(items) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// First block (in load order) whose polygon contains the coordinate.
    pub fn locate<'a>(&self, areas: &'a [BlockArea], lat: f64, lon: f64) -> Option<&'a BlockArea> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.index)
            .filter(|&index| areas.get(index).is_some_and(|a| a.geometry.contains(&point)))
            .min()
            .and_then(|index| areas.get(index))
    }
}
