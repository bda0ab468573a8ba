// Draws a binary tree as text, one line per depth:
//
//   .---B:3---.
//  R:1       R:5
//
// Each subtree gets a column band wide enough for all of its labels, so
// siblings never overlap.

use std::collections::VecDeque;

struct NodeLayout {
    label: String,
    // Width of the left subtree's band; the label starts right after it
    space_left: usize,
    space_right: usize,
    left: Option<Box<NodeLayout>>,
    right: Option<Box<NodeLayout>>,
}

impl NodeLayout {
    fn width(&self) -> usize {
        self.space_left + self.label.len() + self.space_right
    }

    fn label_center(&self) -> usize {
        self.space_left + self.label.len() / 2
    }
}

struct Printer<T, F1: Fn(&T) -> Option<T>, F2: Fn(&T) -> Option<T>, F3: Fn(&T) -> String> {
    get_left: F1,
    get_right: F2,
    to_string: F3,
    marker: std::marker::PhantomData<T>,
}

impl<T, F1, F2, F3> Printer<T, F1, F2, F3>
where
    F1: Fn(&T) -> Option<T>,
    F2: Fn(&T) -> Option<T>,
    F3: Fn(&T) -> String,
{
    fn layout(&self, node: T) -> NodeLayout {
        let left = (self.get_left)(&node).map(|left| Box::new(self.layout(left)));
        let right = (self.get_right)(&node).map(|right| Box::new(self.layout(right)));
        NodeLayout {
            label: (self.to_string)(&node),
            space_left: left.as_ref().map_or(0, |l| l.width()),
            space_right: right.as_ref().map_or(0, |r| r.width()),
            left,
            right,
        }
    }

    fn render(&self, root: T) -> String {
        let layout = self.layout(root);
        let mut rows: Vec<Vec<char>> = Vec::new();

        // Breadth first so each row is filled left to right
        let mut queue: VecDeque<(usize, usize, &NodeLayout)> = VecDeque::new();
        queue.push_back((0, 0, &layout));
        while let Some((depth, x, node)) = queue.pop_front() {
            if rows.len() <= depth {
                rows.push(Vec::new());
            }
            let row = &mut rows[depth];
            if row.len() < x + node.width() {
                row.resize(x + node.width(), ' ');
            }

            let label_start = x + node.space_left;
            let label_end = label_start + node.label.len();
            if let Some(left) = &node.left {
                let from = x + left.label_center();
                row[from] = '.';
                for c in row.iter_mut().take(label_start).skip(from + 1) {
                    *c = '-';
                }
                queue.push_back((depth + 1, x, left));
            }
            for (i, c) in node.label.chars().enumerate() {
                row[label_start + i] = c;
            }
            if let Some(right) = &node.right {
                let to = label_end + right.label_center();
                for c in row.iter_mut().take(to).skip(label_end) {
                    *c = '-';
                }
                row[to] = '.';
                queue.push_back((depth + 1, label_end, right));
            }
        }

        rows.iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn render<T, F1, F2, F3>(root: Option<T>, get_left: F1, get_right: F2, to_string: F3) -> String
where
    F1: Fn(&T) -> Option<T>,
    F2: Fn(&T) -> Option<T>,
    F3: Fn(&T) -> String,
{
    let printer = Printer {
        get_left,
        get_right,
        to_string,
        marker: std::marker::PhantomData,
    };

    match root {
        Some(root) => printer.render(root),
        None => String::new(),
    }
}
