//! Navigation tree over the dynamic sinks of a session.
//!
//! Plain sink names become top-level leaves. Names of the form
//! `Client#<id>|<sub>|...` are grouped under one `Client#<id>` node whose
//! children are the remaining path (`sub|...`), with the bare client sink
//! shown as `Master`.

/// Marker for client-scoped sinks.
pub const CLIENT_MARKER: &str = "Client#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    /// Label shown to the user.
    pub label: String,
    /// Sink this entry toggles; `None` for group nodes.
    pub sink: Option<String>,
    pub children: Vec<NavNode>,
}

impl NavNode {
    pub fn leaf(label: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sink: Some(sink.into()),
            children: Vec::new(),
        }
    }

    pub fn group(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sink: None,
            children: Vec::new(),
        }
    }

    /// Depth-first `(depth, node)` pairs.
    pub fn flatten(&self) -> Vec<(usize, &NavNode)> {
        let mut out = Vec::new();
        flatten_into(self, 0, &mut out);
        out
    }
}

fn flatten_into<'a>(node: &'a NavNode, depth: usize, out: &mut Vec<(usize, &'a NavNode)>) {
    out.push((depth, node));
    for child in &node.children {
        flatten_into(child, depth + 1, out);
    }
}

/// Build the tree from dynamic sink names in creation order.
///
/// Plain sinks come first, then one group per client in order of first
/// appearance.
pub fn build<S: AsRef<str>>(names: &[S]) -> Vec<NavNode> {
    let mut plain = Vec::new();
    let mut clients: Vec<NavNode> = Vec::new();

    for name in names.iter().map(AsRef::as_ref) {
        if !name.starts_with(CLIENT_MARKER) {
            plain.push(NavNode::leaf(name, name));
            continue;
        }

        let parts: Vec<&str> = name.split('|').filter(|p| !p.is_empty()).collect();
        let client = parts[0];
        let label = if parts.len() == 1 {
            "Master".to_string()
        } else {
            parts[1..].join("|")
        };

        let idx = match clients.iter().position(|c| c.label == client) {
            Some(idx) => idx,
            None => {
                clients.push(NavNode::group(client));
                clients.len() - 1
            }
        };
        clients[idx].children.push(NavNode::leaf(label, name));
    }

    plain.extend(clients);
    plain
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
