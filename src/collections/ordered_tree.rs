use std::cmp::Ordering;

struct Node<T> {
  value: Option<T>,
  left: Option<u32>,
  right: Option<u32>,
  height: i32,
}

/// A balanced (AVL) binary search tree ordered by a caller-provided total
/// order. The tree knows nothing about what it stores; callers search it
/// either with the stored comparator or with a probe closure that orders an
/// element against an external target, which allows lookups on any axis that
/// is monotone in the tree order.
///
/// Nodes live in a `Vec` arena and link to each other by index, with freed
/// slots recycled through a free list. `Cursor` keeps the root-to-node path
/// instead of parent links, so nodes stay three words of bookkeeping.
pub struct OrderedTree<T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  nodes: Vec<Node<T>>,
  free: Vec<u32>,
  root: Option<u32>,
  len: usize,
  comparator: C,
}

impl<T, C> OrderedTree<T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  pub fn new(comparator: C) -> OrderedTree<T, C> {
    OrderedTree {
      nodes: Vec::new(),
      free: Vec::new(),
      root: None,
      len: 0,
      comparator,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn insert(&mut self, value: T) {
    let idx = self.alloc(value);
    let root = self.insert_at(self.root, idx);
    self.root = Some(root);
    self.len += 1;
  }

  /// Removes the element for which `probe` answers `Equal` and `same`
  /// answers true. `same` disambiguates between elements the order cannot
  /// tell apart, which can transiently coexist mid-edit.
  pub fn remove_by<P, S>(&mut self, probe: P, same: S) -> Option<T>
  where
    P: Fn(&T) -> Ordering,
    S: Fn(&T) -> bool,
  {
    let (root, removed) = self.remove_at(self.root, &probe, &same);
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

  /// Empties the tree, returning the elements in sorted order. Used for
  /// full rebuilds when an input of the comparator has changed.
  pub fn drain(&mut self) -> Vec<T> {
    let mut order = Vec::with_capacity(self.len);
    self.collect_in_order(self.root, &mut order);
    let mut values = Vec::with_capacity(order.len());
    for idx in order {
      if let Some(value) = self.nodes[idx as usize].value.take() {
        values.push(value);
      }
    }
    self.clear();
    values
  }

  pub fn first(&self) -> Cursor<T, C> {
    let mut path = Vec::new();
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      curr = self.nodes[n as usize].left;
    }
    Cursor { tree: self, path }
  }

  pub fn last(&self) -> Cursor<T, C> {
    let mut path = Vec::new();
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      curr = self.nodes[n as usize].right;
    }
    Cursor { tree: self, path }
  }

  /// Nearest element ordered before the target described by `probe`
  /// (at-or-before with `inclusive`). `probe` orders an element against the
  /// target. When several elements tie, no particular member of the run is
  /// promised; callers that care use the boundary-correction walks.
  pub fn find_greatest_preceding<P>(&self, probe: P, inclusive: bool) -> Cursor<T, C>
  where
    P: Fn(&T) -> Ordering,
  {
    let mut path = Vec::new();
    let mut found = 0;
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      let ord = probe(self.value(n));
      if ord == Ordering::Less || (inclusive && ord == Ordering::Equal) {
        found = path.len();
        curr = self.nodes[n as usize].right;
      } else {
        curr = self.nodes[n as usize].left;
      }
    }
    path.truncate(found);
    Cursor { tree: self, path }
  }

  /// Nearest element ordered after the target (at-or-after with
  /// `inclusive`). Same tie caveat as `find_greatest_preceding`.
  pub fn find_least_following<P>(&self, probe: P, inclusive: bool) -> Cursor<T, C>
  where
    P: Fn(&T) -> Ordering,
  {
    let mut path = Vec::new();
    let mut found = 0;
    let mut curr = self.root;
    while let Some(n) = curr {
      path.push(n);
      let ord = probe(self.value(n));
      if ord == Ordering::Greater || (inclusive && ord == Ordering::Equal) {
        found = path.len();
        curr = self.nodes[n as usize].left;
      } else {
        curr = self.nodes[n as usize].right;
      }
    }
    path.truncate(found);
    Cursor { tree: self, path }
  }

  pub fn iter(&self) -> Iter<T, C> {
    Iter {
      cursor: self.first(),
      started: false,
    }
  }

  fn value(&self, idx: u32) -> &T {
    self.nodes[idx as usize]
      .value
      .as_ref()
      .expect("linked node holds a value")
  }

  fn alloc(&mut self, value: T) -> u32 {
    let node = Node {
      value: Some(value),
      left: None,
      right: None,
      height: 1,
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
    let ord = (self.comparator)(self.value(idx), self.value(n));
    if ord == Ordering::Less {
      let left = self.insert_at(self.nodes[n as usize].left, idx);
      self.nodes[n as usize].left = Some(left);
    } else {
      // Ties go right so a later insertion lands after its existing peers.
      let right = self.insert_at(self.nodes[n as usize].right, idx);
      self.nodes[n as usize].right = Some(right);
    }
    self.rebalance(n)
  }

  fn remove_at<P, S>(
    &mut self,
    node: Option<u32>,
    probe: &P,
    same: &S,
  ) -> (Option<u32>, Option<u32>)
  where
    P: Fn(&T) -> Ordering,
    S: Fn(&T) -> bool,
  {
    let n = match node {
      None => return (None, None),
      Some(n) => n,
    };
    match probe(self.value(n)) {
      Ordering::Greater => {
        let (left, removed) = self.remove_at(self.nodes[n as usize].left, probe, same);
        if removed.is_some() {
          self.nodes[n as usize].left = left;
          return (Some(self.rebalance(n)), removed);
        }
        (Some(n), None)
      }
      Ordering::Less => {
        let (right, removed) = self.remove_at(self.nodes[n as usize].right, probe, same);
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
        // Equal elements form a contiguous run that can spill into either
        // subtree of this node.
        let (right, removed) = self.remove_at(self.nodes[n as usize].right, probe, same);
        if removed.is_some() {
          self.nodes[n as usize].right = right;
          return (Some(self.rebalance(n)), removed);
        }
        let (left, removed) = self.remove_at(self.nodes[n as usize].left, probe, same);
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
        // The in-order successor takes this node's place; the removed value
        // rides out through the successor's vacated slot.
        let successor_value = self.nodes[successor as usize].value.take();
        let removed_value = std::mem::replace(&mut self.nodes[n as usize].value, successor_value);
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

  fn collect_in_order(&self, node: Option<u32>, out: &mut Vec<u32>) {
    if let Some(n) = node {
      self.collect_in_order(self.nodes[n as usize].left, out);
      out.push(n);
      self.collect_in_order(self.nodes[n as usize].right, out);
    }
  }

  fn height(&self, node: Option<u32>) -> i32 {
    match node {
      None => 0,
      Some(n) => self.nodes[n as usize].height,
    }
  }

  fn balance_of(&self, n: u32) -> i32 {
    self.height(self.nodes[n as usize].left) - self.height(self.nodes[n as usize].right)
  }

  fn update(&mut self, n: u32) {
    let left = self.height(self.nodes[n as usize].left);
    let right = self.height(self.nodes[n as usize].right);
    self.nodes[n as usize].height = 1 + left.max(right);
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

/// A bidirectional cursor over the tree, in the shape the index layer
/// expects: possibly unset, steppable both ways, invalidated by walking off
/// either end. Holds the root-to-node path, so a step costs at most one
/// descent edge per level.
pub struct Cursor<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  tree: &'a OrderedTree<T, C>,
  path: Vec<u32>,
}

impl<'a, T, C> Cursor<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  pub fn is_valid(&self) -> bool {
    !self.path.is_empty()
  }

  pub fn current(&self) -> Option<&'a T> {
    match self.path.last() {
      Some(&n) => Some(self.tree.value(n)),
      None => None,
    }
  }

  pub fn unset(&mut self) {
    self.path.clear();
  }

  /// Steps to the in-order successor. Returns false (and unsets) when the
  /// cursor was already unset or on the last element.
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

  /// Steps to the in-order predecessor, mirroring `move_next`.
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

impl<'a, T, C> Clone for Cursor<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  fn clone(&self) -> Cursor<'a, T, C> {
    Cursor {
      tree: self.tree,
      path: self.path.clone(),
    }
  }
}

pub struct Iter<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  cursor: Cursor<'a, T, C>,
  started: bool,
}

impl<'a, T, C> Iterator for Iter<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  type Item = &'a T;

  fn next(&mut self) -> Option<&'a T> {
    if !self.started {
      self.started = true;
      return self.cursor.current();
    }
    if self.cursor.move_next() {
      self.cursor.current()
    } else {
      None
    }
  }
}
