use crate::roi::{PlaneTag, Region};

/// A catalog of regions owned and edited by someone else.
///
/// Implementations must not change while a query is running; the volume
/// operations read a catalog from several plane workers at once.
pub trait RoiCatalog: Sync {
    /// Every region, in catalog order
    fn all_rois(&self) -> &[Region];

    fn count(&self) -> usize {
        self.all_rois().len()
    }

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Regions active on `plane` (1-based).
    ///
    /// Regions tagged with `plane` come first, followed by regions active on
    /// every plane, each group in catalog order. Plane 0 yields nothing.
    fn rois_on_plane(&self, plane: usize) -> Vec<&Region> {
        if plane < 1 {
            return Vec::new();
        }
        let rois = self.all_rois();
        let tagged = rois
            .iter()
            .filter(|roi| matches!(roi.plane, PlaneTag::Plane(_)) && roi.plane.is_on(plane));
        let everywhere = rois
            .iter()
            .filter(|roi| roi.plane == PlaneTag::AllPlanes);
        tagged.chain(everywhere).collect()
    }
}

/// [`RoiCatalog::rois_on_plane`] for a catalog that may be absent.
pub fn rois_on_plane(catalog: Option<&dyn RoiCatalog>, plane: usize) -> Vec<&Region> {
    match catalog {
        Some(catalog) => catalog.rois_on_plane(plane),
        None => Vec::new(),
    }
}

impl RoiCatalog for [Region] {
    fn all_rois(&self) -> &[Region] {
        self
    }
}

impl RoiCatalog for Vec<Region> {
    fn all_rois(&self) -> &[Region] {
        self
    }
}

/// An owned catalog, for hosts that don't keep their own.
#[derive(Debug, Clone, Default)]
pub struct RoiList {
    rois: Vec<Region>,
}

impl RoiList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a region, returning its position in the catalog
    pub fn add(&mut self, region: Region) -> usize {
        self.rois.push(region);
        self.rois.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Region> {
        (index < self.rois.len()).then(|| self.rois.remove(index))
    }

    pub fn clear(&mut self) {
        self.rois.clear();
    }
}

impl FromIterator<Region> for RoiList {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self {
            rois: iter.into_iter().collect(),
        }
    }
}

impl RoiCatalog for RoiList {
    fn all_rois(&self) -> &[Region] {
        &self.rois
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::Rect;

    fn named(name: &str) -> Region {
        Region::from_name(name, Rect::new(0, 0, 1, 1))
    }

    #[test]
    fn tagged_rois_come_before_shared_ones() {
        let catalog: RoiList = [
            named("everywhere"),
            named("0002-0000-0000"),
            named("0003-0000-0000"),
            named("0002-0001-0001"),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = catalog
            .rois_on_plane(2)
            .iter()
            .map(|roi| roi.name.as_str())
            .collect();
        assert_eq!(names, ["0002-0000-0000", "0002-0001-0001", "everywhere"]);

        let names: Vec<_> = catalog
            .rois_on_plane(5)
            .iter()
            .map(|roi| roi.name.as_str())
            .collect();
        assert_eq!(names, ["everywhere"]);
    }

    #[test]
    fn plane_zero_and_absent_catalog_are_empty() {
        let catalog = vec![named("everywhere")];
        assert!(catalog.rois_on_plane(0).is_empty());
        assert!(rois_on_plane(None, 1).is_empty());
        assert_eq!(rois_on_plane(Some(&catalog), 1).len(), 1);
    }

    #[test]
    fn zero_tag_never_matches() {
        let catalog = vec![named("0000-0000-0000")];
        assert!(catalog.rois_on_plane(0).is_empty());
        assert!(catalog.rois_on_plane(1).is_empty());
    }

    #[test]
    fn list_admits_and_removes() {
        let mut list = RoiList::new();
        assert!(list.is_empty());
        assert_eq!(list.add(named("a")), 0);
        assert_eq!(list.add(named("b")), 1);
        assert_eq!(list.count(), 2);
        assert_eq!(list.remove(0).map(|r| r.name), Some("a".to_string()));
        assert!(list.remove(5).is_none());
        list.clear();
        assert_eq!(list.count(), 0);
    }
}
