mod node;

use crate::config::QuadtreeConfig;
use crate::error::{QuadtreeError, Result};
use crate::{Rect, Scalar};
use node::Node;
use std::fmt;
use tracing::debug;

/// Region quadtree over values with an axis-aligned bounding box.
///
/// `get_box` extracts the bounds of a value, `equal` locates a stored value on removal.
/// Values are stored by copy. Mutating the bounds of a stored value through
/// [`access`](Quadtree::access) leaves it in a node that might no longer be correct for it; use
/// [`update`](Quadtree::update) to move a value.
#[derive(Clone)]
pub struct Quadtree<T, F, G, E = fn(&T, &T) -> bool> {
    region: Rect<F>,
    root: Node<T>,
    config: QuadtreeConfig,
    len: usize,
    get_box: G,
    equal: E,
}

impl<T, F, G, E> fmt::Debug for Quadtree<T, F, G, E>
where
    T: fmt::Debug,
    F: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quadtree")
            .field("region", &self.region)
            .field("config", &self.config)
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

impl<T, F, G> Quadtree<T, F, G>
where
    T: PartialEq,
    F: Scalar,
    G: Fn(&T) -> Rect<F>,
{
    /// Values are compared with `PartialEq` on removal.
    ///
    /// # Panics
    /// If `region` has a negative extent.
    pub fn new(region: Rect<F>, get_box: G) -> Self {
        Self::with_equality(region, get_box, <T as PartialEq>::eq)
    }
}

impl<T, F, G, E> Quadtree<T, F, G, E>
where
    F: Scalar,
    G: Fn(&T) -> Rect<F>,
    E: Fn(&T, &T) -> bool,
{
    /// # Panics
    /// If `region` has a negative extent.
    pub fn with_equality(region: Rect<F>, get_box: G, equal: E) -> Self {
        assert!(region.is_valid(), "region must have non-negative extents");
        Self {
            region,
            root: Node::default(),
            config: QuadtreeConfig::default(),
            len: 0,
            get_box,
            equal,
        }
    }

    /// Change the shape parameters. Takes effect on subsequent insertions and removals.
    pub fn with_config(mut self, config: QuadtreeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn region(&self) -> &Rect<F> {
        &self.region
    }

    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = Node::default();
        self.len = 0;
    }

    /// Insert `value`, returning a reference to the stored copy.
    /// Fails if the bounds of `value` are not contained in the region of the tree.
    pub fn add(&mut self, value: T) -> Result<&mut T> {
        let bounds = (self.get_box)(&value);
        if !self.region.contains(&bounds) {
            debug!(?bounds, region = ?self.region, "rejected out of region insertion");
            return Err(QuadtreeError::OutOfRegion);
        }
        Ok(self.add_unchecked(value))
    }

    /// Insert `value` without checking it against the region of the tree.
    ///
    /// The caller must guarantee that the region contains the bounds of `value`, a violation is
    /// only caught in debug builds.
    pub fn add_unchecked(&mut self, value: T) -> &mut T {
        self.len += 1;
        self.root
            .insert(&self.config, &self.get_box, 0, &self.region, value)
    }

    /// Insert every value of `it`.
    /// Fails without modifying the tree if any of the values lies outside of the region.
    pub fn try_extend<It>(&mut self, it: It) -> Result<()>
    where
        It: IntoIterator<Item = T>,
    {
        let values = it.into_iter().collect::<Vec<_>>();
        if let Some(bounds) = values
            .iter()
            .map(|value| (self.get_box)(value))
            .find(|bounds| !self.region.contains(bounds))
        {
            debug!(?bounds, region = ?self.region, "rejected out of region bulk insertion");
            return Err(QuadtreeError::OutOfRegion);
        }
        for value in values {
            self.add_unchecked(value);
        }
        Ok(())
    }

    /// Remove the stored value equal to `value` and return it.
    ///
    /// Removing a value out of a leaf attempts to merge its parent back into a single leaf.
    pub fn remove(&mut self, value: &T) -> Result<T> {
        let bounds = (self.get_box)(value);
        if !self.region.contains(&bounds) {
            debug!(?bounds, region = ?self.region, "rejected out of region removal");
            return Err(QuadtreeError::OutOfRegion);
        }
        let (removed, _) = self
            .root
            .remove(
                &self.config,
                &self.get_box,
                &self.equal,
                &self.region,
                &bounds,
                value,
            )
            .map_err(|err| {
                debug!(?bounds, "value to remove is not stored");
                err
            })?;
        self.len -= 1;
        Ok(removed)
    }

    /// Replace the stored value equal to `old` by `new`, which may have moved.
    /// Fails without modifying the tree if `new` lies outside of the region or `old` is missing.
    pub fn update(&mut self, old: &T, new: T) -> Result<&mut T> {
        let bounds = (self.get_box)(&new);
        if !self.region.contains(&bounds) {
            debug!(?bounds, region = ?self.region, "rejected out of region update");
            return Err(QuadtreeError::OutOfRegion);
        }
        self.remove(old)?;
        Ok(self.add_unchecked(new))
    }

    /// Copies of the values whose bounds intersect `query`.
    pub fn query(&self, query: &Rect<F>) -> Vec<T>
    where
        T: Clone,
    {
        self.query_ref(query).into_iter().cloned().collect()
    }

    /// References to the values whose bounds intersect `query`.
    pub fn query_ref(&self, query: &Rect<F>) -> Vec<&T> {
        let mut out = Vec::new();
        if query.intersects(&self.region) {
            self.root
                .query(&self.get_box, &self.region, query, &mut out);
        }
        out
    }

    /// Mutable references to the values whose bounds intersect `query`.
    ///
    /// The bounds of the referenced values must not be changed, see
    /// [`update`](Quadtree::update).
    pub fn access(&mut self, query: &Rect<F>) -> Vec<&mut T> {
        let mut out = Vec::new();
        if query.intersects(&self.region) {
            self.root
                .access(&self.get_box, &self.region, query, &mut out);
        }
        out
    }

    /// Every unordered pair of distinct stored values whose bounds intersect, each reported once.
    pub fn intersecting_pairs(&self) -> Vec<(&T, &T)> {
        let mut out = Vec::new();
        self.root
            .intersections(&self.get_box, &self.region, &mut out);
        out
    }

    pub fn find_all_intersections(&self) -> Vec<(T, T)>
    where
        T: Clone,
    {
        self.intersecting_pairs()
            .into_iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect()
    }

    /// [`find_all_intersections`](Quadtree::find_all_intersections), searching the subtrees in
    /// parallel.
    pub fn par_find_all_intersections(&self) -> Vec<(T, T)>
    where
        T: Clone + Sync,
        G: Sync,
    {
        self.root
            .par_intersections(&self.get_box, &self.region)
            .into_iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect()
    }

    /// Iterate over every stored value, in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: vec![&self.root],
            current: Default::default(),
        }
    }

    /// Level of the deepest node, the root being level 0.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    current: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.current.next() {
                return Some(value);
            }
            let node = self.stack.pop()?;
            self.current = node.values.iter();
            if let Some(ref children) = node.children {
                self.stack.extend(children.iter());
            }
        }
    }
}

impl<'a, T, F, G, E> IntoIterator for &'a Quadtree<T, F, G, E>
where
    F: Scalar,
    G: Fn(&T) -> Rect<F>,
    E: Fn(&T, &T) -> bool,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
