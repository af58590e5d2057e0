//! JSON view model of a canvas for an external renderer.
//!
//! Read-only and rebuilt on demand; this is not a storage format.

use ff_core::{Canvas, Node, NodeKind};
use serde_json::{Value, json};

/// Pan offset plus every node on the canvas, in insertion order.
pub fn snapshot(canvas: &Canvas) -> Value {
    let (pan_x, pan_y) = canvas.pan();
    let nodes: Vec<Value> = canvas
        .members()
        .into_iter()
        .filter_map(|id| canvas.get(id))
        .map(|node| node_json(canvas, node))
        .collect();

    json!({
        "pan": { "x": pan_x, "y": pan_y },
        "linkState": canvas.link_state().pending().map(|id| id.as_str().to_string()),
        "nodes": nodes,
    })
}

fn node_json(canvas: &Canvas, node: &Node) -> Value {
    let peers: Vec<&str> = node.linked_peers.iter().map(|id| id.as_str()).collect();
    let mut obj = json!({
        "id": node.id.as_str(),
        "kind": node.kind.tag(),
        "title": node.title,
        "x": node.x,
        "y": node.y,
        "width": node.width,
        "height": node.height,
        "zIndex": node.z_index,
        "editable": node.editable,
        "hasLinks": node.has_links,
        "pendingLink": node.pending_link,
        "links": peers,
    });

    if let Some(parent) = canvas.parent_grid(node.id) {
        obj["parent"] = Value::String(parent.as_str().to_string());
        obj["cell"] = json!({ "row": node.grid_row, "column": node.grid_column });
    }

    match &node.kind {
        NodeKind::Root => {}
        NodeKind::PlainText { text } => obj["text"] = json!(text),
        NodeKind::RichText { html } => obj["html"] = json!(html),
        NodeKind::Image { src } | NodeKind::Video { src } => obj["src"] = json!(src),
        NodeKind::WebEmbed { url } => obj["url"] = json!(url),
        NodeKind::Chat {
            system_prompt,
            messages,
        } => {
            obj["systemPrompt"] = json!(system_prompt);
            obj["messages"] = serde_json::to_value(messages).unwrap_or(Value::Null);
        }
        NodeKind::Collection(grid) => {
            let children: Vec<String> = canvas
                .grid_children(node.id)
                .iter()
                .map(|id| id.as_str().to_string())
                .collect();
            obj["children"] = json!(children);
            obj["columnWidths"] = grid.column_widths.values().copied().collect();
            obj["rowHeights"] = grid.row_heights.values().copied().collect();
        }
    }
    obj
}
