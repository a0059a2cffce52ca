//! Outermost connected components of a binary mask.
//!
//! Foreground uses 8-connectivity and background uses 4-connectivity, so a
//! diagonal chain of foreground pixels closes a hole. Background components
//! that touch the image border are "outside"; every other background
//! component is a hole. A foreground component is outermost when the pixel
//! above its first raster pixel is outside the image or belongs to the outside
//! background; otherwise it sits inside a hole and is folded into the
//! component enclosing that hole.

use crate::geometry::Rect;
use crate::morph::Mask;

/// An outermost component of a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Component {
    /// Bounding box of the component's pixels.
    pub rect: Rect,
    /// Foreground pixels belonging to the component itself.
    pub pixels: usize,
    /// Pixels enclosed by the outer boundary: the component, its holes and
    /// everything nested in them.
    pub filled_area: usize,
}

const UNLABELED: u32 = u32::MAX;

struct Labels {
    label: Vec<u32>,
    /// First raster pixel of each label.
    seeds: Vec<(usize, usize)>,
    counts: Vec<usize>,
    /// `(min_x, min_y, max_x, max_y)` per label.
    bounds: Vec<(usize, usize, usize, usize)>,
    touches_border: Vec<bool>,
}

fn label_components(mask: &Mask, foreground: bool) -> Labels {
    let width = mask.width();
    let height = mask.height();
    let bits = mask.data();
    let wanted = |idx: usize| (bits[idx] != 0) == foreground;

    let mut labels = Labels {
        label: vec![UNLABELED; bits.len()],
        seeds: Vec::new(),
        counts: Vec::new(),
        bounds: Vec::new(),
        touches_border: Vec::new(),
    };
    let mut stack = Vec::new();

    for seed_idx in 0..bits.len() {
        if !wanted(seed_idx) || labels.label[seed_idx] != UNLABELED {
            continue;
        }
        let id = labels.seeds.len() as u32;
        let seed = (seed_idx % width, seed_idx / width);
        let mut count = 0usize;
        let mut bounds = (seed.0, seed.1, seed.0, seed.1);
        let mut touches = false;

        labels.label[seed_idx] = id;
        stack.push(seed_idx);
        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % width, idx / width);
            count += 1;
            bounds = (
                bounds.0.min(x),
                bounds.1.min(y),
                bounds.2.max(x),
                bounds.3.max(y),
            );
            touches |= x == 0 || y == 0 || x + 1 == width || y + 1 == height;

            for (dx, dy) in neighbor_offsets(foreground) {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let nidx = ny as usize * width + nx as usize;
                if wanted(nidx) && labels.label[nidx] == UNLABELED {
                    labels.label[nidx] = id;
                    stack.push(nidx);
                }
            }
        }

        labels.seeds.push(seed);
        labels.counts.push(count);
        labels.bounds.push(bounds);
        labels.touches_border.push(touches);
    }

    labels
}

fn neighbor_offsets(eight: bool) -> &'static [(isize, isize)] {
    const FOUR: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    const EIGHT: [(isize, isize); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    if eight {
        &EIGHT
    } else {
        &FOUR
    }
}

#[derive(Clone, Copy)]
enum Parent {
    Outermost,
    Hole(u32),
    Foreground(u32),
}

/// Extracts outermost components in raster order of their first pixel.
pub fn outermost_components(mask: &Mask) -> Vec<Component> {
    let width = mask.width();
    let fg = label_components(mask, true);
    if fg.seeds.is_empty() {
        return Vec::new();
    }
    let bg = label_components(mask, false);

    // The pixel above a component's first raster pixel is always of the other
    // kind, and it belongs to the region directly enclosing the component.
    let fg_parent: Vec<Parent> = fg
        .seeds
        .iter()
        .map(|&(x, y)| {
            if y == 0 {
                return Parent::Outermost;
            }
            let above = bg.label[(y - 1) * width + x];
            if above == UNLABELED || bg.touches_border[above as usize] {
                Parent::Outermost
            } else {
                Parent::Hole(above)
            }
        })
        .collect();
    let hole_parent: Vec<Parent> = bg
        .seeds
        .iter()
        .zip(bg.touches_border.iter())
        .map(|(&(x, y), &outside)| {
            if outside || y == 0 {
                return Parent::Outermost;
            }
            match fg.label[(y - 1) * width + x] {
                UNLABELED => Parent::Outermost,
                id => Parent::Foreground(id),
            }
        })
        .collect();

    let root_of_fg = |mut id: u32| -> u32 {
        loop {
            match fg_parent[id as usize] {
                Parent::Outermost => return id,
                Parent::Hole(hole) => match hole_parent[hole as usize] {
                    Parent::Foreground(enclosing) => id = enclosing,
                    _ => return id,
                },
                Parent::Foreground(enclosing) => id = enclosing,
            }
        }
    };

    let mut filled = vec![0usize; fg.seeds.len()];
    for id in 0..fg.seeds.len() as u32 {
        filled[root_of_fg(id) as usize] += fg.counts[id as usize];
    }
    for (hole, parent) in hole_parent.iter().enumerate() {
        if let Parent::Foreground(enclosing) = *parent {
            filled[root_of_fg(enclosing) as usize] += bg.counts[hole];
        }
    }

    fg_parent
        .iter()
        .enumerate()
        .filter(|(_, parent)| matches!(parent, Parent::Outermost))
        .map(|(id, _)| {
            let (min_x, min_y, max_x, max_y) = fg.bounds[id];
            Component {
                rect: Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
                pixels: fg.counts[id],
                filled_area: filled[id],
            }
        })
        .collect()
}
