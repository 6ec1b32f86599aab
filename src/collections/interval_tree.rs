use std::cmp::Ordering;

use float_ord::FloatOrd;

/// A closed scalar interval `[low, high]`. Endpoints are `f64` so the same
/// tree serves row spans and second spans; callers wanting integer rows cast
/// at the boundary. `high >= low` is a precondition enforced by the edit
/// layer, not re-checked on every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
  pub low: f64,
  pub high: f64,
}

impl Interval {
  pub fn new(low: f64, high: f64) -> Interval {
    debug_assert!(high >= low, "interval ends before it starts");
    Interval { low, high }
  }

  pub fn contains(&self, x: f64) -> bool {
    self.low <= x && x <= self.high
  }
}

fn interval_order(a: &Interval, b: &Interval) -> Ordering {
  FloatOrd(a.low)
    .cmp(&FloatOrd(b.low))
    .then(FloatOrd(a.high).cmp(&FloatOrd(b.high)))
}

struct Node<T> {
  interval: Interval,
  value: Option<T>,
  left: Option<u32>,
  right: Option<u32>,
  height: i32,
  max_high: f64,
}

/// A balanced (AVL) interval tree ordered by low endpoint, augmented with
/// the maximum high endpoint of each subtree so stabbing queries can prune.
/// Same arena/cursor scheme as `OrderedTree`; the tree is domain-blind.
pub struct IntervalTree<T> {
  nodes: Vec<Node<T>>,
  free: Vec<u32>,
  root: Option<u32>,
  len: usize,
}

impl<T> IntervalTree<T> {
  pub fn new() -> IntervalTree<T> {
    IntervalTree {
      nodes: Vec::new(),
      free: Vec::new(),
      root: None,
      len: 0,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn insert(&mut self, interval: Interval, value: T) {
    let idx = self.alloc(interval, value);
    let root = self.insert_at(self.root, idx);
    self.root = Some(root);
    self.len += 1;
  }

  /// Removes the element stored under an interval comparing equal to
  /// `interval` for which `same` answers true.
  pub fn remove_by<S>(&mut self, interval: Interval, same: S) -> Option<T>
  where
    S: Fn(&T) -> bool,
  {
    let (root, removed) = self.remove_at(self.root, &interval, &same);
    self.root = root;
    match removed {
      Some(idx) => {
        let value = self.nodes[idx as usize].value.take();
        self.free.push(idx);
        self.len -= 1;
        value
      }
      None => None,
    }
  }

  pub fn clear(&mut self) {
    self.nodes.clear();
    self.free.clear();
    self.root = None;
    self.len = 0;
  }

  /// All stored elements whose interval covers `x`, in low-endpoint order.
  pub fn find_overlapping(&self, x: f64) -> Vec<&T> {
    let mut out = Vec::new();
    self.collect_overlapping(self.root, x, &mut out);
    out
  }

  pub fn first(&self) -> IntervalCursor<T> {
    let mut path = Vec::new();
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      curr = self.nodes[n as usize].left;
    }
    IntervalCursor { tree: self, path }
  }

  pub fn last(&self) -> IntervalCursor<T> {
    let mut path = Vec::new();
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      curr = self.nodes[n as usize].right;
    }
    IntervalCursor { tree: self, path }
  }

  /// Nearest interval whose low endpoint is before `x` (at-or-before with
  /// `inclusive`). Ties carry the same caveat as the point tree.
  pub fn find_greatest_preceding(&self, x: f64, inclusive: bool) -> IntervalCursor<T> {
    let mut path = Vec::new();
    let mut found = 0;
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      let ord = FloatOrd(self.nodes[n as usize].interval.low).cmp(&FloatOrd(x));
      if ord == Ordering::Less || (inclusive && ord == Ordering::Equal) {
        found = path.len();
        curr = self.nodes[n as usize].right;
      } else {
        curr = self.nodes[n as usize].left;
      }
    }
    path.truncate(found);
    IntervalCursor { tree: self, path }
  }

  /// Nearest interval whose low endpoint is after `x` (at-or-after with
  /// `inclusive`).
  pub fn find_least_following(&self, x: f64, inclusive: bool) -> IntervalCursor<T> {
    let mut path = Vec::new();
    let mut found = 0;
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      let ord = FloatOrd(self.nodes[n as usize].interval.low).cmp(&FloatOrd(x));
      if ord == Ordering::Greater || (inclusive && ord == Ordering::Equal) {
        found = path.len();
        curr = self.nodes[n as usize].left;
      } else {
        curr = self.nodes[n as usize].right;
      }
    }
    path.truncate(found);
    IntervalCursor { tree: self, path }
  }

  fn value(&self, idx: u32) -> &T {
    self.nodes[idx as usize]
      .value
      .as_ref()
      .expect("linked node holds a value")
  }

  fn alloc(&mut self, interval: Interval, value: T) -> u32 {
    let node = Node {
      interval,
      value: Some(value),
      left: None,
      right: None,
      height: 1,
      max_high: interval.high,
    };
    match self.free.pop() {
      Some(idx) => {
        self.nodes[idx as usize] = node;
        idx
      }
      None => {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
      }
    }
  }

  fn insert_at(&mut self, node: Option<u32>, idx: u32) -> u32 {
    let n = match node {
      None => return idx,
      Some(n) => n,
    };
    let ord = interval_order(
      &self.nodes[idx as usize].interval,
      &self.nodes[n as usize].interval,
    );
    if ord == Ordering::Less {
      let left = self.insert_at(self.nodes[n as usize].left, idx);
      self.nodes[n as usize].left = Some(left);
    } else {
      let right = self.insert_at(self.nodes[n as usize].right, idx);
      self.nodes[n as usize].right = Some(right);
    }
    self.rebalance(n)
  }

  fn remove_at<S>(
    &mut self,
    node: Option<u32>,
    interval: &Interval,
    same: &S,
  ) -> (Option<u32>, Option<u32>)
  where
    S: Fn(&T) -> bool,
  {
    let n = match node {
      None => return (None, None),
      Some(n) => n,
    };
    match interval_order(&self.nodes[n as usize].interval, interval) {
      Ordering::Greater => {
        let (left, removed) = self.remove_at(self.nodes[n as usize].left, interval, same);
        if removed.is_some() {
          self.nodes[n as usize].left = left;
          return (Some(self.rebalance(n)), removed);
        }
        (Some(n), None)
      }
      Ordering::Less => {
        let (right, removed) = self.remove_at(self.nodes[n as usize].right, interval, same);
        if removed.is_some() {
          self.nodes[n as usize].right = right;
          return (Some(self.rebalance(n)), removed);
        }
        (Some(n), None)
      }
      Ordering::Equal => {
        if same(self.value(n)) {
          return self.remove_node(n);
        }
        let (right, removed) = self.remove_at(self.nodes[n as usize].right, interval, same);
        if removed.is_some() {
          self.nodes[n as usize].right = right;
          return (Some(self.rebalance(n)), removed);
        }
        let (left, removed) = self.remove_at(self.nodes[n as usize].left, interval, same);
        if removed.is_some() {
          self.nodes[n as usize].left = left;
          return (Some(self.rebalance(n)), removed);
        }
        (Some(n), None)
      }
    }
  }

  fn remove_node(&mut self, n: u32) -> (Option<u32>, Option<u32>) {
    let left = self.nodes[n as usize].left;
    let right = self.nodes[n as usize].right;
    match (left, right) {
      (None, None) => (None, Some(n)),
      (Some(l), None) => (Some(l), Some(n)),
      (None, Some(r)) => (Some(r), Some(n)),
      (Some(_), Some(r)) => {
        let (new_right, successor) = self.remove_leftmost(r);
        self.nodes[n as usize].right = new_right;
        let successor_interval = self.nodes[successor as usize].interval;
        let successor_value = self.nodes[successor as usize].value.take();
        let removed_interval =
          std::mem::replace(&mut self.nodes[n as usize].interval, successor_interval);
        let removed_value = std::mem::replace(&mut self.nodes[n as usize].value, successor_value);
        self.nodes[successor as usize].interval = removed_interval;
        self.nodes[successor as usize].value = removed_value;
        (Some(self.rebalance(n)), Some(successor))
      }
    }
  }

  fn remove_leftmost(&mut self, n: u32) -> (Option<u32>, u32) {
    match self.nodes[n as usize].left {
      None => (self.nodes[n as usize].right, n),
      Some(l) => {
        let (left, leftmost) = self.remove_leftmost(l);
        self.nodes[n as usize].left = left;
        (Some(self.rebalance(n)), leftmost)
      }
    }
  }

  fn collect_overlapping<'a>(&'a self, node: Option<u32>, x: f64, out: &mut Vec<&'a T>) {
    let n = match node {
      None => return,
      Some(n) => n,
    };
    // Nothing in this subtree reaches x.
    if self.nodes[n as usize].max_high < x {
      return;
    }
    self.collect_overlapping(self.nodes[n as usize].left, x, out);
    if self.nodes[n as usize].interval.contains(x) {
      out.push(self.value(n));
    }
    // Low endpoints only grow to the right; past x they cannot cover it.
    if self.nodes[n as usize].interval.low <= x {
      self.collect_overlapping(self.nodes[n as usize].right, x, out);
    }
  }

  fn height(&self, node: Option<u32>) -> i32 {
    match node {
      None => 0,
      Some(n) => self.nodes[n as usize].height,
    }
  }

  fn max_high(&self, node: Option<u32>) -> Option<f64> {
    node.map(|n| self.nodes[n as usize].max_high)
  }

  fn balance_of(&self, n: u32) -> i32 {
    self.height(self.nodes[n as usize].left) - self.height(self.nodes[n as usize].right)
  }

  fn update(&mut self, n: u32) {
    let left = self.nodes[n as usize].left;
    let right = self.nodes[n as usize].right;
    self.nodes[n as usize].height = 1 + self.height(left).max(self.height(right));
    let mut max_high = self.nodes[n as usize].interval.high;
    if let Some(h) = self.max_high(left) {
      if h > max_high {
        max_high = h;
      }
    }
    if let Some(h) = self.max_high(right) {
      if h > max_high {
        max_high = h;
      }
    }
    self.nodes[n as usize].max_high = max_high;
  }

  fn rebalance(&mut self, n: u32) -> u32 {
    self.update(n);
    let balance = self.balance_of(n);
    if balance > 1 {
      let l = self.nodes[n as usize].left.expect("left-heavy node has a left child");
      if self.balance_of(l) < 0 {
        let new_left = self.rotate_left(l);
        self.nodes[n as usize].left = Some(new_left);
      }
      self.rotate_right(n)
    } else if balance < -1 {
      let r = self.nodes[n as usize].right.expect("right-heavy node has a right child");
      if self.balance_of(r) > 0 {
        let new_right = self.rotate_right(r);
        self.nodes[n as usize].right = Some(new_right);
      }
      self.rotate_left(n)
    } else {
      n
    }
  }

  fn rotate_right(&mut self, n: u32) -> u32 {
    let l = self.nodes[n as usize].left.expect("rotation needs a left child");
    self.nodes[n as usize].left = self.nodes[l as usize].right;
    self.nodes[l as usize].right = Some(n);
    self.update(n);
    self.update(l);
    l
  }

  fn rotate_left(&mut self, n: u32) -> u32 {
    let r = self.nodes[n as usize].right.expect("rotation needs a right child");
    self.nodes[n as usize].right = self.nodes[r as usize].left;
    self.nodes[r as usize].left = Some(n);
    self.update(n);
    self.update(r);
    r
  }
}

impl<T> Default for IntervalTree<T> {
  fn default() -> IntervalTree<T> {
    IntervalTree::new()
  }
}

/// Bidirectional cursor over intervals in low-endpoint order; same shape as
/// the point-tree cursor.
pub struct IntervalCursor<'a, T> {
  tree: &'a IntervalTree<T>,
  path: Vec<u32>,
}

impl<'a, T> IntervalCursor<'a, T> {
  pub fn is_valid(&self) -> bool {
    !self.path.is_empty()
  }

  pub fn current(&self) -> Option<&'a T> {
    match self.path.last() {
      Some(&n) => Some(self.tree.value(n)),
      None => None,
    }
  }

  pub fn current_interval(&self) -> Option<Interval> {
    self.path.last().map(|&n| self.tree.nodes[n as usize].interval)
  }

  pub fn unset(&mut self) {
    self.path.clear();
  }

  pub fn move_next(&mut self) -> bool {
    let n = match self.path.last() {
      None => return false,
      Some(&n) => n,
    };
    if let Some(r) = self.tree.nodes[n as usize].right {
      self.path.push(r);
      let mut curr = self.tree.nodes[r as usize].left;
      while let Some(l) = curr {
        self.path.push(l);
        curr = self.tree.nodes[l as usize].left;
      }
      return true;
    }
    loop {
      let child = match self.path.pop() {
        Some(child) => child,
        None => return false,
      };
      match self.path.last() {
        Some(&parent) => {
          if self.tree.nodes[parent as usize].left == Some(child) {
            return true;
          }
        }
        None => return false,
      }
    }
  }

  pub fn move_prev(&mut self) -> bool {
    let n = match self.path.last() {
      None => return false,
      Some(&n) => n,
    };
    if let Some(l) = self.tree.nodes[n as usize].left {
      self.path.push(l);
      let mut curr = self.tree.nodes[l as usize].right;
      while let Some(r) = curr {
        self.path.push(r);
        curr = self.tree.nodes[r as usize].right;
      }
      return true;
    }
    loop {
      let child = match self.path.pop() {
        Some(child) => child,
        None => return false,
      };
      match self.path.last() {
        Some(&parent) => {
          if self.tree.nodes[parent as usize].right == Some(child) {
            return true;
          }
        }
        None => return false,
      }
    }
  }
}

impl<'a, T> Clone for IntervalCursor<'a, T> {
  fn clone(&self) -> IntervalCursor<'a, T> {
    IntervalCursor {
      tree: self.tree,
      path: self.path.clone(),
    }
  }
}

#[cfg(test)]
mod test {

  use super::{Interval, IntervalTree};

  fn tree_of(spans: &[(f64, f64)]) -> IntervalTree<usize> {
    let mut tree = IntervalTree::new();
    for (i, (low, high)) in spans.iter().enumerate() {
      tree.insert(Interval::new(*low, *high), i);
    }
    tree
  }

  #[test]
  pub fn contains_is_closed_on_both_ends() {
    let interval = Interval::new(10.0, 50.0);
    assert!(interval.contains(10.0));
    assert!(interval.contains(30.0));
    assert!(interval.contains(50.0));
    assert!(!interval.contains(9.9));
    assert!(!interval.contains(50.1));
  }

  #[test]
  pub fn stabbing_query_finds_covering_intervals() {
    let tree = tree_of(&[(0.0, 10.0), (5.0, 15.0), (12.0, 20.0), (30.0, 40.0)]);
    let hits: Vec<usize> = tree.find_overlapping(7.0).into_iter().cloned().collect();
    assert_eq!(hits, vec![0, 1]);
    let hits: Vec<usize> = tree.find_overlapping(12.0).into_iter().cloned().collect();
    assert_eq!(hits, vec![1, 2]);
    assert!(tree.find_overlapping(25.0).is_empty());
    assert!(tree.find_overlapping(41.0).is_empty());
  }

  #[test]
  pub fn stabbing_query_sees_long_interval_behind_short_ones() {
    // The long interval starts far before the query point, with unrelated
    // intervals in between.
    let tree = tree_of(&[(0.0, 100.0), (10.0, 12.0), (20.0, 22.0), (30.0, 32.0)]);
    let hits: Vec<usize> = tree.find_overlapping(50.0).into_iter().cloned().collect();
    assert_eq!(hits, vec![0]);
  }

  #[test]
  pub fn remove_keeps_augmentation_correct() {
    let mut tree = tree_of(&[(0.0, 100.0), (10.0, 12.0), (20.0, 22.0)]);
    assert_eq!(tree.remove_by(Interval::new(0.0, 100.0), |_| true), Some(0));
    assert!(tree.find_overlapping(50.0).is_empty());
    let hits: Vec<usize> = tree.find_overlapping(21.0).into_iter().cloned().collect();
    assert_eq!(hits, vec![2]);
    assert_eq!(tree.len(), 2);
  }

  #[test]
  pub fn remove_missing_returns_none() {
    let mut tree = tree_of(&[(0.0, 10.0)]);
    assert_eq!(tree.remove_by(Interval::new(0.0, 11.0), |_| true), None);
    assert_eq!(tree.len(), 1);
  }

  #[test]
  pub fn cursor_orders_by_low_endpoint() {
    let tree = tree_of(&[(30.0, 40.0), (10.0, 20.0), (20.0, 25.0)]);
    let mut cursor = tree.first();
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(10.0));
    assert!(cursor.move_next());
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(20.0));
    assert!(cursor.move_next());
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(30.0));
    assert!(!cursor.move_next());
  }

  #[test]
  pub fn boundary_searches_by_low_endpoint() {
    let tree = tree_of(&[(10.0, 20.0), (20.0, 25.0), (30.0, 40.0)]);
    let cursor = tree.find_greatest_preceding(20.0, false);
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(10.0));
    let cursor = tree.find_greatest_preceding(20.0, true);
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(20.0));
    let cursor = tree.find_least_following(20.0, false);
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(30.0));
    let cursor = tree.find_least_following(5.0, true);
    assert_eq!(cursor.current_interval().map(|i| i.low), Some(10.0));
    assert!(!tree.find_greatest_preceding(5.0, true).is_valid());
  }
}
