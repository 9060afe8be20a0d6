//! Display lists: what an external renderer should draw, in paint order.
//!
//! Paint strategies append [`DrawCommand`]s tagged with the id of the node
//! that produced them. [`DisplayList::diff`] compares two frames node by
//! node and returns the bounds that need redrawing.

use std::collections::BTreeMap;
use std::fmt;

use crate::css::value::{Colour, Gradient};
use crate::geometry::{Point, Region};

/// How a shape is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Colour),
    Gradient(Gradient),
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fill::Solid(c) => write!(f, "{c}"),
            Fill::Gradient(g) => write!(f, "{g}"),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Centre,
    Right,
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { region: Region, radius: f32, fill: Fill },
    StrokeRect { region: Region, radius: f32, width: f32, colour: Colour },
    /// Arc of a circle; angles in radians, clockwise from twelve o'clock.
    Arc { centre: Point, radius: f32, start: f32, end: f32, width: f32, colour: Colour },
    Line { from: Point, to: Point, width: f32, colour: Colour },
    Ellipse { region: Region, colour: Colour },
    Text { region: Region, text: String, size: f32, colour: Colour, align: TextAlign },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = |r: &Region| format!("{} {} {}x{}", r.x, r.y, r.width, r.height);
        match self {
            DrawCommand::FillRect { region, radius, fill } => {
                write!(f, "fill-rect {} r={radius} {fill}", r(region))
            }
            DrawCommand::StrokeRect { region, radius, width, colour } => {
                write!(f, "stroke-rect {} r={radius} w={width} {colour}", r(region))
            }
            DrawCommand::Arc { centre, radius, start, end, width, colour } => write!(
                f,
                "arc {} {} r={radius} {start:.2}..{end:.2} w={width} {colour}",
                centre.x, centre.y
            ),
            DrawCommand::Line { from, to, width, colour } => {
                write!(f, "line {} {} -> {} {} w={width} {colour}", from.x, from.y, to.x, to.y)
            }
            DrawCommand::Ellipse { region, colour } => write!(f, "ellipse {} {colour}", r(region)),
            DrawCommand::Text { region, text, size, colour, align } => {
                write!(f, "text {} {align:?} {size} {colour} {text:?}", r(region))
            }
        }
    }
}

/// Draw commands in paint order, each tagged with its node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    items: Vec<(String, DrawCommand)>,
    /// Outer bounds of every painted node.
    bounds: BTreeMap<String, Region>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bounds of a node about to be painted.
    pub fn begin_node(&mut self, node_id: &str, bounds: Region) {
        self.bounds.insert(node_id.to_owned(), bounds);
    }

    pub fn push(&mut self, node_id: &str, command: DrawCommand) {
        self.items.push((node_id.to_owned(), command));
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.items.iter().map(|(_, c)| c)
    }

    /// Commands of one node.
    pub fn commands_for<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a DrawCommand> + 'a {
        self.items.iter().filter(move |(id, _)| id == node_id).map(|(_, c)| c)
    }

    pub fn bounds_of(&self, node_id: &str) -> Option<Region> {
        self.bounds.get(node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Regions to redraw to go from `previous` to `self`: the old and new
    /// bounds of every node whose commands or bounds changed, plus nodes that
    /// appeared or disappeared.
    pub fn diff(&self, previous: &DisplayList) -> Vec<Region> {
        let mut dirty = Vec::new();
        for (id, bounds) in &self.bounds {
            match previous.bounds.get(id) {
                Some(old) if old == bounds && self.commands_for(id).eq(previous.commands_for(id)) => {}
                Some(old) => {
                    dirty.push(*old);
                    if old != bounds {
                        dirty.push(*bounds);
                    }
                }
                None => dirty.push(*bounds),
            }
        }
        for (id, old) in &previous.bounds {
            if !self.bounds.contains_key(id) {
                dirty.push(*old);
            }
        }
        dirty.retain(|r| !r.is_empty());
        dirty
    }
}

impl fmt::Display for DisplayList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, command) in &self.items {
            writeln!(f, "{id}: {command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32) -> DrawCommand {
        DrawCommand::FillRect {
            region: Region::new(x, 0.0, 10.0, 10.0),
            radius: 0.0,
            fill: Fill::Solid(Colour::rgb(255, 0, 0)),
        }
    }

    fn list(nodes: &[(&str, f32)]) -> DisplayList {
        let mut list = DisplayList::new();
        for (id, x) in nodes {
            list.begin_node(id, Region::new(*x, 0.0, 10.0, 10.0));
            list.push(id, rect(*x));
        }
        list
    }

    #[test]
    fn identical_lists_have_no_dirty_regions() {
        let a = list(&[("a", 0.0), ("b", 20.0)]);
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn moved_added_and_removed_nodes_are_dirty() {
        let before = list(&[("a", 0.0), ("b", 20.0)]);
        let after = list(&[("a", 5.0), ("c", 40.0)]);
        let dirty = after.diff(&before);
        assert_eq!(
            dirty,
            vec![
                Region::new(0.0, 0.0, 10.0, 10.0),
                Region::new(5.0, 0.0, 10.0, 10.0),
                Region::new(40.0, 0.0, 10.0, 10.0),
                Region::new(20.0, 0.0, 10.0, 10.0),
            ]
        );
    }

    #[test]
    fn text_form() {
        let mut list = DisplayList::new();
        list.push("title", DrawCommand::Text {
            region: Region::new(0.0, 0.0, 100.0, 20.0),
            text: "Gain".into(),
            size: 12.0,
            colour: Colour::rgb(255, 255, 255),
            align: TextAlign::Centre,
        });
        insta::assert_snapshot!(list.to_string(), @r#"title: text 0 0 100x20 Centre 12 #ffffff "Gain""#);
    }
}
