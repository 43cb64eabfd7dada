// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout scopes: the container rectangles that monitors measure against.
//!
//! ## Overview
//!
//! A scope is owned by an ancestor (typically a scroll view or clipping region). Whenever
//! the host lays that ancestor out, its provider writes the new rectangle into the scope's
//! [`LayoutSlot`]. Monitors underneath read the slot of their *nearest* enclosing scope.
//!
//! Scopes nest. A [`ScopeTree`] records the nesting explicitly and is passed by reference to
//! whoever needs to read it; there is no global registry.
//!
//! When no scope applies (none was given, it was removed, or it has not been laid out yet)
//! readers fall back to the display surface, see [`ScopeTree::surface`].
//!
//! ```
//! use kurbo::Rect;
//! use understory_visibility::ScopeTree;
//!
//! let mut scopes = ScopeTree::new(Rect::new(0.0, 0.0, 390.0, 844.0));
//! let list = scopes.insert(None);
//! assert_eq!(scopes.resolve(Some(list)), None);
//!
//! assert!(scopes.write(list, Rect::new(0.0, 100.0, 390.0, 844.0)));
//! // Zero-sized intermediate layouts are ignored.
//! assert!(!scopes.write(list, Rect::new(0.0, 100.0, 390.0, 100.0)));
//! assert_eq!(scopes.resolve(Some(list)), Some(Rect::new(0.0, 100.0, 390.0, 844.0)));
//! ```

use alloc::vec::Vec;

use kurbo::Rect;

/// Single-value store holding the most recent layout of one scope.
///
/// Writes overwrite unconditionally, except that degenerate rectangles (non-positive width
/// or height, or non-finite coordinates) are rejected and the previous value is kept.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LayoutSlot {
    rect: Option<Rect>,
}

impl LayoutSlot {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self { rect: None }
    }

    /// Store `rect`, returning `false` if it was rejected as degenerate.
    pub fn write(&mut self, rect: Rect) -> bool {
        if !is_usable_layout(rect) {
            tracing::debug!(?rect, "ignoring degenerate scope layout");
            return false;
        }
        self.rect = Some(rect);
        true
    }

    /// The most recent accepted layout, if any.
    pub fn read(&self) -> Option<Rect> {
        self.rect
    }

    /// Forget the stored layout.
    pub fn clear(&mut self) {
        self.rect = None;
    }
}

fn is_usable_layout(r: Rect) -> bool {
    r.x0.is_finite()
        && r.y0.is_finite()
        && r.x1.is_finite()
        && r.y1.is_finite()
        && r.width() > 0.0
        && r.height() > 0.0
}

/// Identifier for a scope in a [`ScopeTree`] (generational).
///
/// A removed scope's id stays stale forever: reusing its slot bumps the generation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScopeId(u32, u32);

impl ScopeId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Scope {
    generation: u32,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    slot: LayoutSlot,
}

/// Nested layout scopes plus the display-surface fallback.
///
/// Each scope has exactly one writer (its provider) and any number of readers.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    // Freed slots keep their last generation so the next occupant can bump it.
    scopes: Vec<(u32, Option<Scope>)>,
    free_list: Vec<usize>,
    surface: Rect,
}

impl ScopeTree {
    /// Create an empty tree that falls back to `surface` when no scope applies.
    pub fn new(surface: Rect) -> Self {
        Self {
            scopes: Vec::new(),
            free_list: Vec::new(),
            surface,
        }
    }

    /// The display-surface rectangle used as the fallback container.
    pub fn surface(&self) -> Rect {
        self.surface
    }

    /// Replace the display-surface rectangle (for example after a rotation).
    ///
    /// Monitors read the surface at every cycle, so the change applies from their next cycle.
    pub fn set_surface(&mut self, surface: Rect) {
        self.surface = surface;
    }

    /// Insert a new scope nested under `parent` (or at the top level if `None`).
    ///
    /// A stale `parent` is treated as `None`.
    pub fn insert(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let parent = parent.filter(|p| self.is_alive(*p));
        let scope = |generation| Scope {
            generation,
            parent,
            children: Vec::new(),
            slot: LayoutSlot::new(),
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.scopes[idx].0 + 1;
            self.scopes[idx] = (generation, Some(scope(generation)));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.scopes.push((generation, Some(scope(generation))));
            (self.scopes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ScopeId uses 32-bit indices by design."
        )]
        let id = ScopeId::new(idx as u32, generation);
        if let Some(p) = parent
            && let Some(node) = self.scope_mut(p)
        {
            node.children.push(id);
        }
        id
    }

    /// Remove a scope together with every scope nested inside it.
    ///
    /// Readers of removed scopes see `None` from [`ScopeTree::read`].
    pub fn remove(&mut self, id: ScopeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.parent(id)
            && let Some(p) = self.scope_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }
        let mut pending = alloc::vec![id];
        while let Some(next) = pending.pop() {
            let idx = next.idx();
            if let Some(scope) = self.scopes[idx].1.take() {
                pending.extend(scope.children);
                self.free_list.push(idx);
            }
        }
    }

    /// Record a new layout for `id`.
    ///
    /// Returns `false` if `id` is stale or the rectangle was rejected as degenerate; in both
    /// cases the previous value is kept.
    pub fn write(&mut self, id: ScopeId, rect: Rect) -> bool {
        match self.scope_mut(id) {
            Some(scope) => scope.slot.write(rect),
            None => false,
        }
    }

    /// The current layout of `id`, if it is alive and has been laid out.
    pub fn read(&self, id: ScopeId) -> Option<Rect> {
        self.scope(id)?.slot.read()
    }

    /// The layout of the nearest enclosing scope, if one applies.
    ///
    /// `None` means the caller should use its last-known container or [`ScopeTree::surface`].
    pub fn resolve(&self, scope: Option<ScopeId>) -> Option<Rect> {
        self.read(scope?)
    }

    /// The scope `id` is nested in, if any.
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id)?.parent
    }

    /// Whether `id` refers to a live scope.
    pub fn is_alive(&self, id: ScopeId) -> bool {
        self.scope(id).is_some()
    }

    /// Number of live scopes.
    pub fn len(&self) -> usize {
        self.scopes.len() - self.free_list.len()
    }

    /// True if there are no live scopes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn scope(&self, id: ScopeId) -> Option<&Scope> {
        let scope = self.scopes.get(id.idx())?.1.as_ref()?;
        (scope.generation == id.1).then_some(scope)
    }

    fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        let scope = self.scopes.get_mut(id.idx())?.1.as_mut()?;
        if scope.generation != id.1 {
            return None;
        }
        Some(scope)
    }
}
