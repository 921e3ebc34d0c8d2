//! Leaf-wise regression trees fitted to gradient statistics.

use super::BoosterParams;

#[derive(Clone, Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A regression tree. Rows with `x[feature] <= threshold` go left.
#[derive(Clone, Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

#[derive(Clone, Debug)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct OpenLeaf {
    node: usize,
    rows: Vec<usize>,
    depth: usize,
    best: Option<SplitCandidate>,
}

/// Per-node statistics shared by every split evaluation of one tree.
struct GrowContext<'a> {
    x: &'a [Vec<f64>],
    grad: &'a [f64],
    hess: &'a [f64],
    features: &'a [usize],
    params: &'a BoosterParams,
}

/// L1 soft-thresholding.
fn threshold_l1(g: f64, alpha: f64) -> f64 {
    g.signum() * (g.abs() - alpha).max(0.0)
}

fn leaf_score(g: f64, h: f64, params: &BoosterParams) -> f64 {
    let t = threshold_l1(g, params.reg_alpha);
    t * t / (h + params.reg_lambda)
}

fn leaf_output(g: f64, h: f64, params: &BoosterParams) -> f64 {
    -threshold_l1(g, params.reg_alpha) / (h + params.reg_lambda) * params.learning_rate
}

impl GrowContext<'_> {
    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter()
            .fold((0.0, 0.0), |(g, h), &r| (g + self.grad[r], h + self.hess[r]))
    }

    /// Exact greedy search over every feature and every gap between
    /// distinct sorted values. The first candidate wins ties.
    fn best_split(&self, rows: &[usize], depth: usize) -> Option<SplitCandidate> {
        let params = self.params;
        if let Ok(limit) = usize::try_from(params.max_depth)
            && limit > 0
            && depth >= limit
        {
            return None;
        }
        let min_samples = params.min_child_samples.max(1);
        if rows.len() < 2 * min_samples {
            return None;
        }

        let (g_total, h_total) = self.sums(rows);
        let parent = leaf_score(g_total, h_total, params);
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();

        for &feature in self.features {
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let (mut g_left, mut h_left) = (0.0, 0.0);
            for i in 0..sorted.len() - 1 {
                let r = sorted[i];
                g_left += self.grad[r];
                h_left += self.hess[r];

                let n_left = i + 1;
                let n_right = sorted.len() - n_left;
                if n_left < min_samples {
                    continue;
                }
                if n_right < min_samples {
                    break;
                }

                let here = self.x[r][feature];
                let next = self.x[sorted[i + 1]][feature];
                if here >= next {
                    continue;
                }

                let g_right = g_total - g_left;
                let h_right = h_total - h_left;
                if h_left < params.min_child_weight || h_right < params.min_child_weight {
                    continue;
                }

                let gain = leaf_score(g_left, h_left, params) + leaf_score(g_right, h_right, params)
                    - parent;
                if gain > 0.0 && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: f64::midpoint(here, next),
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl Tree {
    /// Grows one tree best-first until it has `num_leaves` leaves or no leaf
    /// has a positive-gain split.
    ///
    /// Returns `None` when not even the root can be split.
    pub(crate) fn grow(
        x: &[Vec<f64>],
        grad: &[f64],
        hess: &[f64],
        features: &[usize],
        params: &BoosterParams,
    ) -> Option<Self> {
        let ctx = GrowContext {
            x,
            grad,
            hess,
            features,
            params,
        };

        let rows: Vec<usize> = (0..grad.len()).collect();
        let best = ctx.best_split(&rows, 0);
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut leaves = vec![OpenLeaf {
            node: 0,
            rows,
            depth: 0,
            best,
        }];

        while leaves.len() < params.num_leaves {
            let mut pick: Option<(usize, f64)> = None;
            for (i, leaf) in leaves.iter().enumerate() {
                if let Some(split) = &leaf.best
                    && pick.is_none_or(|(_, gain)| split.gain > gain)
                {
                    pick = Some((i, split.gain));
                }
            }
            let Some((index, _)) = pick else {
                break;
            };

            let leaf = leaves.remove(index);
            let Some(split) = leaf.best else {
                break;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
                .rows
                .iter()
                .partition(|&&r| x[r][split.feature] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[leaf.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            let depth = leaf.depth + 1;
            for (node, rows) in [(left, left_rows), (right, right_rows)] {
                let best = ctx.best_split(&rows, depth);
                leaves.push(OpenLeaf {
                    node,
                    rows,
                    depth,
                    best,
                });
            }
        }

        if leaves.len() == 1 {
            return None;
        }

        for leaf in &leaves {
            let (g, h) = ctx.sums(&leaf.rows);
            nodes[leaf.node] = Node::Leaf {
                value: leaf_output(g, h, params),
            };
        }

        Some(Self { nodes })
    }

    /// Raw score contribution of this tree for one row.
    pub(crate) fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub(crate) fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BoosterParams {
        BoosterParams {
            learning_rate: 1.0,
            min_child_samples: 1,
            ..BoosterParams::default()
        }
    }

    /// Four separable points: gradients pull the right half up.
    fn toy() -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let grad = vec![1.0, 1.0, -1.0, -1.0];
        let hess = vec![1.0; 4];
        (x, grad, hess)
    }

    #[test]
    fn splits_at_midpoint() {
        let (x, g, h) = toy();
        let tree = Tree::grow(&x, &g, &h, &[0], &params()).unwrap();
        assert_eq!(tree.n_leaves(), 2);
        // left leaf: G = 2, H = 2 -> -1
        assert!((tree.predict(&[1.4]) + 1.0).abs() < 1e-12);
        assert!((tree.predict(&[1.6]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn l1_and_l2_shrink_outputs() {
        let (x, g, h) = toy();
        let p = BoosterParams {
            reg_alpha: 1.0,
            reg_lambda: 2.0,
            ..params()
        };
        let tree = Tree::grow(&x, &g, &h, &[0], &p).unwrap();
        // T(2, 1) = 1 -> -1 / (2 + 2)
        assert!((tree.predict(&[0.0]) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn min_child_samples_blocks_splits() {
        let (x, g, h) = toy();
        let p = BoosterParams {
            min_child_samples: 3,
            ..params()
        };
        assert!(Tree::grow(&x, &g, &h, &[0], &p).is_none());
    }

    #[test]
    fn max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..16).map(|i| vec![f64::from(i)]).collect();
        let grad: Vec<f64> = (0..16).map(|i| if i % 4 < 2 { 1.0 } else { -1.0 }).collect();
        let hess = vec![1.0; 16];

        let p = BoosterParams {
            num_leaves: 16,
            max_depth: 2,
            ..params()
        };
        let tree = Tree::grow(&x, &grad, &hess, &[0], &p).unwrap();
        assert!(tree.depth() <= 2);
        assert!(tree.n_leaves() <= 4);
    }

    #[test]
    fn num_leaves_caps_leaf_count() {
        let x: Vec<Vec<f64>> = (0..16).map(|i| vec![f64::from(i)]).collect();
        let grad: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let hess = vec![1.0; 16];

        let p = BoosterParams {
            num_leaves: 3,
            ..params()
        };
        let tree = Tree::grow(&x, &grad, &hess, &[0], &p).unwrap();
        assert_eq!(tree.n_leaves(), 3);
    }
}
