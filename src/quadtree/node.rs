use crate::config::QuadtreeConfig;
use crate::error::{QuadtreeError, Result};
use crate::{Point, Rect, Scalar};
use tracing::trace;

type Children<T> = Option<Box<[Node<T>; 4]>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Classify `bounds` against the center of `region`.
    /// Returns `None` if `bounds` straddles either center line.
    pub fn of<F: Scalar>(region: &Rect<F>, bounds: &Rect<F>) -> Option<Self> {
        let center = region.center();
        let west = if bounds.right() < center.x {
            true
        } else if bounds.left >= center.x {
            false
        } else {
            return None;
        };
        let north = if bounds.bottom() < center.y {
            true
        } else if bounds.top >= center.y {
            false
        } else {
            return None;
        };
        let quadrant = match (west, north) {
            (true, true) => Quadrant::NorthWest,
            (false, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthWest,
            (false, false) => Quadrant::SouthEast,
        };
        Some(quadrant)
    }

    /// Sub-region of `region` covered by this quadrant.
    pub fn region<F: Scalar>(self, region: &Rect<F>) -> Rect<F> {
        let half = region.size() / F::TWO;
        // the east and south halves absorb the remainder of odd integer extents
        let rest = Point::new(region.width - half.x, region.height - half.y);
        let origin = region.top_left();
        match self {
            Quadrant::NorthWest => Rect::from_corners(origin, half),
            Quadrant::NorthEast => Rect::new(origin.x + half.x, origin.y, rest.x, half.y),
            Quadrant::SouthWest => Rect::new(origin.x, origin.y + half.y, half.x, rest.y),
            Quadrant::SouthEast => Rect::from_corners(origin + half, rest),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub children: Children<T>,
    /// Values straddling the center of this node, or every value of a leaf.
    pub values: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: None,
            values: Vec::new(),
        }
    }
}

impl<T> Node<T> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn insert<F, G>(
        &mut self,
        config: &QuadtreeConfig,
        get_box: &G,
        depth: usize,
        region: &Rect<F>,
        value: T,
    ) -> &mut T
    where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        debug_assert!(region.contains(&get_box(&value)));

        if self.is_leaf() {
            if depth >= config.max_depth || self.values.len() < config.threshold {
                return push(&mut self.values, value);
            }
            self.split(get_box, depth, region);
        }

        let quadrant = Quadrant::of(region, &get_box(&value));
        match (quadrant, self.children.as_deref_mut()) {
            (Some(q), Some(children)) => children[q.index()].insert(
                config,
                get_box,
                depth + 1,
                &q.region(region),
                value,
            ),
            _ => push(&mut self.values, value),
        }
    }

    fn split<F, G>(&mut self, get_box: &G, depth: usize, region: &Rect<F>)
    where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        debug_assert!(self.is_leaf(), "Only leaves can be split");

        let mut children: Box<[Node<T>; 4]> = Box::default();
        let values = std::mem::take(&mut self.values);
        let total = values.len();
        for value in values {
            match Quadrant::of(region, &get_box(&value)) {
                Some(q) => children[q.index()].values.push(value),
                None => self.values.push(value),
            }
        }
        trace!(depth, total, kept = self.values.len(), "split quadtree leaf");
        self.children = Some(children);
    }

    /// Remove the value equal to `value`.
    /// The flag is set if the value was taken out of a leaf, so that the caller, the parent of
    /// that leaf, attempts a merge.
    pub fn remove<F, G, E>(
        &mut self,
        config: &QuadtreeConfig,
        get_box: &G,
        equal: &E,
        region: &Rect<F>,
        bounds: &Rect<F>,
        value: &T,
    ) -> Result<(T, bool)>
    where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
        E: Fn(&T, &T) -> bool,
    {
        let children = match self.children.as_deref_mut() {
            Some(children) => children,
            None => return self.take(equal, value).map(|removed| (removed, true)),
        };
        let q = match Quadrant::of(region, bounds) {
            Some(q) => q,
            None => return self.take(equal, value).map(|removed| (removed, false)),
        };
        let child_region = q.region(region);
        let (removed, from_leaf) =
            children[q.index()].remove(config, get_box, equal, &child_region, bounds, value)?;
        if from_leaf {
            self.try_merge(config.threshold);
        }
        Ok((removed, false))
    }

    /// Swap-remove, so the order of the remaining values changes.
    fn take<E>(&mut self, equal: &E, value: &T) -> Result<T>
    where
        E: Fn(&T, &T) -> bool,
    {
        let index = self
            .values
            .iter()
            .position(|stored| equal(value, stored))
            .ok_or(QuadtreeError::NotFound)?;
        Ok(self.values.swap_remove(index))
    }

    /// Collapse the children into this node if all of them are leaves and the values fit into
    /// a single leaf. Does not cascade upwards.
    pub fn try_merge(&mut self, threshold: usize) {
        let children = match self.children.as_deref() {
            Some(children) => children,
            None => return,
        };
        if !children.iter().all(Node::is_leaf) {
            return;
        }
        let total =
            self.values.len() + children.iter().map(|c| c.values.len()).sum::<usize>();
        if total > threshold {
            return;
        }

        if let Some(children) = self.children.take() {
            self.values.reserve(total - self.values.len());
            let children = *children;
            for child in children {
                self.values.extend(child.values);
            }
        }
        trace!(total, "merged quadtree children into leaf");
    }

    pub fn query<'a, F, G>(
        &'a self,
        get_box: &G,
        region: &Rect<F>,
        query: &Rect<F>,
        out: &mut Vec<&'a T>,
    ) where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        debug_assert!(query.intersects(region));

        out.extend(
            self.values
                .iter()
                .filter(|value| query.intersects(&get_box(*value))),
        );

        if let Some(ref children) = self.children {
            for (q, child) in Quadrant::ALL.iter().zip(children.iter()) {
                let child_region = q.region(region);
                if query.intersects(&child_region) {
                    child.query(get_box, &child_region, query, out);
                }
            }
        }
    }

    pub fn access<'a, F, G>(
        &'a mut self,
        get_box: &G,
        region: &Rect<F>,
        query: &Rect<F>,
        out: &mut Vec<&'a mut T>,
    ) where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        debug_assert!(query.intersects(region));

        for value in self.values.iter_mut() {
            if query.intersects(&get_box(&*value)) {
                out.push(value);
            }
        }

        if let Some(ref mut children) = self.children {
            for (q, child) in Quadrant::ALL.iter().zip(children.iter_mut()) {
                let child_region = q.region(region);
                if query.intersects(&child_region) {
                    child.access(get_box, &child_region, query, out);
                }
            }
        }
    }

    /// Pairs found at this node: among its own values, and between its values and every value
    /// stored below it. Pairs inside the children are left to the children.
    pub fn local_intersections<'a, F, G>(
        &'a self,
        get_box: &G,
        region: &Rect<F>,
        out: &mut Vec<(&'a T, &'a T)>,
    ) where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        for (i, a) in self.values.iter().enumerate() {
            let a_box = get_box(a);
            for b in &self.values[i + 1..] {
                if a_box.intersects(&get_box(b)) {
                    out.push((a, b));
                }
            }
        }

        if let Some(ref children) = self.children {
            for value in self.values.iter() {
                let bounds = get_box(value);
                for (q, child) in Quadrant::ALL.iter().zip(children.iter()) {
                    let child_region = q.region(region);
                    if bounds.intersects(&child_region) {
                        child.intersections_with(get_box, &child_region, value, &bounds, out);
                    }
                }
            }
        }
    }

    /// Every value of this subtree intersecting `bounds`, paired with `value`.
    fn intersections_with<'a, F, G>(
        &'a self,
        get_box: &G,
        region: &Rect<F>,
        value: &'a T,
        bounds: &Rect<F>,
        out: &mut Vec<(&'a T, &'a T)>,
    ) where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        for other in self.values.iter() {
            if bounds.intersects(&get_box(other)) {
                out.push((value, other));
            }
        }

        if let Some(ref children) = self.children {
            for (q, child) in Quadrant::ALL.iter().zip(children.iter()) {
                let child_region = q.region(region);
                if bounds.intersects(&child_region) {
                    child.intersections_with(get_box, &child_region, value, bounds, out);
                }
            }
        }
    }

    pub fn intersections<'a, F, G>(
        &'a self,
        get_box: &G,
        region: &Rect<F>,
        out: &mut Vec<(&'a T, &'a T)>,
    ) where
        F: Scalar,
        G: Fn(&T) -> Rect<F>,
    {
        self.local_intersections(get_box, region, out);

        if let Some(ref children) = self.children {
            for (q, child) in Quadrant::ALL.iter().zip(children.iter()) {
                child.intersections(get_box, &q.region(region), out);
            }
        }
    }

    /// Same pairs as `intersections`, the four subtrees are searched in parallel.
    pub fn par_intersections<'a, F, G>(
        &'a self,
        get_box: &G,
        region: &Rect<F>,
    ) -> Vec<(&'a T, &'a T)>
    where
        T: Sync,
        F: Scalar,
        G: Fn(&T) -> Rect<F> + Sync,
    {
        let mut out = Vec::new();
        self.local_intersections(get_box, region, &mut out);

        if let Some(ref children) = self.children {
            let [nw, ne, sw, se] = &**children;
            let search = |node: &'a Node<T>, q: Quadrant| {
                node.par_intersections(get_box, &q.region(region))
            };
            let ((a, b), (c, d)) = rayon::join(
                || {
                    rayon::join(
                        || search(nw, Quadrant::NorthWest),
                        || search(ne, Quadrant::NorthEast),
                    )
                },
                || {
                    rayon::join(
                        || search(sw, Quadrant::SouthWest),
                        || search(se, Quadrant::SouthEast),
                    )
                },
            );
            out.reserve(a.len() + b.len() + c.len() + d.len());
            for pairs in [a, b, c, d] {
                out.extend(pairs);
            }
        }
        out
    }

    /// Deepest level below this node, this node being level 0.
    pub fn depth(&self) -> usize {
        match self.children {
            Some(ref children) => 1 + children.iter().map(Node::depth).max().unwrap_or(0),
            None => 0,
        }
    }

    pub fn node_count(&self) -> usize {
        match self.children {
            Some(ref children) => 1 + children.iter().map(Node::node_count).sum::<usize>(),
            None => 1,
        }
    }
}

fn push<T>(values: &mut Vec<T>, value: T) -> &mut T {
    let index = values.len();
    values.push(value);
    &mut values[index]
}
