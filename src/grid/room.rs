//! Named room rectangles
//!
//! Rooms keep their insertion order: cover placement and room-to-polygon
//! conversion iterate them in the order the layout carved them, which is
//! part of what makes a seed reproduce the same map.

use std::collections::HashMap;

/// Axis-aligned room footprint in tile coordinates (top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Room {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Center cell as (row, col).
    pub fn center(&self) -> (i32, i32) {
        (self.y + self.h / 2, self.x + self.w / 2)
    }

    /// True when the two rooms overlap after growing this one by `margin`
    /// on every side.
    pub fn overlaps(&self, other: &Room, margin: i32) -> bool {
        self.x - margin < other.x + other.w
            && self.x + self.w + margin > other.x
            && self.y - margin < other.y + other.h
            && self.y + self.h + margin > other.y
    }
}

/// Insertion-ordered map from room name to footprint.
#[derive(Debug, Clone, Default)]
pub struct RoomTable {
    entries: Vec<(String, Room)>,
    index: HashMap<String, usize>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced room keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, room: Room) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = room,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, room));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Room> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rooms in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Room)> {
        self.entries.iter().map(|(name, room)| (name.as_str(), room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut table = RoomTable::new();
        table.insert("B_SITE", Room::new(10, 10, 20, 20));
        table.insert("A_SITE", Room::new(50, 50, 20, 20));
        table.insert("B_SITE", Room::new(12, 12, 20, 20));
        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["B_SITE", "A_SITE"]);
        assert_eq!(table.get("B_SITE").unwrap().x, 12);
    }

    #[test]
    fn test_overlap_margin() {
        let a = Room::new(0, 0, 10, 10);
        let b = Room::new(12, 0, 10, 10);
        assert!(!a.overlaps(&b, 0));
        assert!(a.overlaps(&b, 3));
    }

    #[test]
    fn test_center() {
        let r = Room::new(10, 20, 8, 6);
        assert_eq!(r.center(), (23, 14));
    }
}
